use serde::Serialize;
use tokio::sync::broadcast;

use crate::token::Role;

/// Session lifecycle changes views react to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A persisted token was found and decoded at startup
    Restored { role: Role },
    SignedIn { role: Role },
    SignedOut,
    /// The backend answered 401/403 and the token was dropped
    Expired,
    /// A persisted token could not be decoded and was dropped
    Invalidated { reason: String },
}

pub type EventSender = broadcast::Sender<SessionEvent>;
pub type EventReceiver = broadcast::Receiver<SessionEvent>;

#[derive(Clone, Debug)]
pub struct EventBus {
    sender: EventSender,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self { sender }
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Publishing with no subscribers is fine.
    pub fn publish(&self, event: SessionEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
