use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::{
    client::ApiClient,
    errors::{ApiError, Result},
    events::{EventBus, EventReceiver, SessionEvent},
    models::{Credentials, LoginResponse},
    request::ApiRequest,
    storage::TokenStorage,
    token::{self, Role},
};

pub const LOGIN_PATH: &str = "/auth/login";

/// Who is logged in, derived entirely from the current token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// `load()` has not settled yet
    Loading,
    Unauthenticated,
    Authenticated { token: String, role: Role },
}

impl SessionState {
    pub fn token(&self) -> Option<&str> {
        match self {
            SessionState::Authenticated { token, .. } => Some(token),
            _ => None,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            SessionState::Authenticated { role, .. } => *role,
            _ => Role::Unauthenticated,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }
}

/// Single source of truth for the session. Share it with `Arc`; the
/// request gateway reads the token from here on every call.
///
/// Writes are last-write-wins: a forced clear racing a sign-in is not
/// ordered.
pub struct SessionStore {
    storage: Arc<dyn TokenStorage>,
    state: RwLock<SessionState>,
    events: EventBus,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            storage,
            state: RwLock::new(SessionState::Loading),
            events: EventBus::new(),
        }
    }

    /// Restore the persisted session. Undecodable tokens are removed from
    /// storage rather than kept with an unknown role.
    pub async fn load(&self) -> Result<SessionState> {
        let stored = match self.storage.load_token().await {
            Ok(stored) => stored,
            Err(e) => {
                error!("Failed to load session token: {}", e);
                self.set_state(SessionState::Unauthenticated).await;
                return Err(e);
            }
        };

        let (state, event) = match stored {
            None => (SessionState::Unauthenticated, None),
            Some(token) => match token::decode_claims(&token) {
                Ok(claims) => {
                    info!("Restored session with role {}", claims.role);
                    let event = SessionEvent::Restored { role: claims.role };
                    (
                        SessionState::Authenticated {
                            token,
                            role: claims.role,
                        },
                        Some(event),
                    )
                }
                Err(e) => {
                    warn!("Discarding stored token: {}", e);
                    if let Err(clear_err) = self.storage.clear_token().await {
                        error!("Failed to remove invalid token: {}", clear_err);
                    }
                    let event = SessionEvent::Invalidated {
                        reason: e.to_string(),
                    };
                    (SessionState::Unauthenticated, Some(event))
                }
            },
        };

        self.set_state(state.clone()).await;
        if let Some(event) = event {
            self.events.publish(event);
        }
        Ok(state)
    }

    /// Exchange credentials for a token. On success the token is persisted
    /// and its role returned; on any failure nothing is persisted and the
    /// in-memory session is cleared.
    pub async fn sign_in(&self, gateway: &ApiClient, credentials: Credentials) -> Result<Role> {
        info!("Signing in as {}", credentials.email);

        match self.try_sign_in(gateway, &credentials).await {
            Ok(role) => {
                info!("Signed in as {} with role {}", credentials.email, role);
                self.events.publish(SessionEvent::SignedIn { role });
                Ok(role)
            }
            Err(e) => {
                warn!("Sign-in failed for {}: {}", credentials.email, e);
                self.set_state(SessionState::Unauthenticated).await;
                Err(e)
            }
        }
    }

    async fn try_sign_in(&self, gateway: &ApiClient, credentials: &Credentials) -> Result<Role> {
        let request = ApiRequest::post(LOGIN_PATH).json(credentials)?.anonymous();
        let body = gateway.request(request).await?.ok_or(ApiError::MissingToken)?;

        let response: LoginResponse = serde_json::from_value(body)?;
        let token = response
            .token
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::MissingToken)?;
        let role = token::decode_claims(&token)?.role;

        self.storage.save_token(&token).await?;
        self.set_state(SessionState::Authenticated { token, role })
            .await;
        Ok(role)
    }

    /// Drop the session. Safe to call when already signed out.
    ///
    /// The in-memory session is cleared even when storage fails; the storage
    /// error is still returned.
    pub async fn sign_out(&self) -> Result<()> {
        let was_authenticated = self.is_authenticated().await;
        self.set_state(SessionState::Unauthenticated).await;
        if was_authenticated {
            info!("Signed out");
            self.events.publish(SessionEvent::SignedOut);
        }

        self.storage.clear_token().await.map_err(|e| {
            error!("Failed to remove session token: {}", e);
            e
        })
    }

    /// Forced clear after the backend rejected the token.
    pub async fn expire(&self) {
        warn!("Session rejected by backend, clearing token");
        if let Err(e) = self.storage.clear_token().await {
            error!("Failed to remove expired token: {}", e);
        }
        self.set_state(SessionState::Unauthenticated).await;
        self.events.publish(SessionEvent::Expired);
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token().map(str::to_string)
    }

    pub async fn role(&self) -> Role {
        self.state.read().await.role()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    pub async fn is_loading(&self) -> bool {
        matches!(*self.state.read().await, SessionState::Loading)
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.events.subscribe()
    }

    async fn set_state(&self, state: SessionState) {
        *self.state.write().await = state;
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryTokenStorage;
    use crate::token::encode_test_token;
    use serde_json::json;

    #[test]
    fn starts_loading() {
        let store = SessionStore::new(Arc::new(MemoryTokenStorage::new()));
        assert!(tokio_test::block_on(store.is_loading()));
        assert_eq!(tokio_test::block_on(store.role()), Role::Unauthenticated);
    }

    #[test]
    fn load_restores_a_valid_token() {
        let token = encode_test_token(&json!({ "role": "DIRETOR" }));
        let store = SessionStore::new(Arc::new(MemoryTokenStorage::with_token(token.clone())));

        let state = tokio_test::block_on(store.load()).unwrap();
        assert_eq!(
            state,
            SessionState::Authenticated {
                token,
                role: Role::Diretor
            }
        );
    }

    #[test]
    fn load_discards_an_undecodable_token() {
        let storage = MemoryTokenStorage::with_token("not-a-jwt");
        let store = SessionStore::new(Arc::new(storage.clone()));
        let mut events = store.subscribe();

        let state = tokio_test::block_on(store.load()).unwrap();
        assert_eq!(state, SessionState::Unauthenticated);
        assert_eq!(tokio_test::block_on(storage.load_token()).unwrap(), None);
        assert!(matches!(
            events.try_recv(),
            Ok(SessionEvent::Invalidated { .. })
        ));
    }

    #[test]
    fn sign_out_is_idempotent() {
        let token = encode_test_token(&json!({ "role": "MONITOR" }));
        let storage = MemoryTokenStorage::with_token(token);
        let store = SessionStore::new(Arc::new(storage.clone()));
        let mut events = store.subscribe();

        tokio_test::block_on(store.load()).unwrap();
        tokio_test::block_on(store.sign_out()).unwrap();
        tokio_test::block_on(store.sign_out()).unwrap();

        assert!(!tokio_test::block_on(store.is_authenticated()));
        assert_eq!(tokio_test::block_on(storage.load_token()).unwrap(), None);

        assert_eq!(events.try_recv(), Ok(SessionEvent::Restored { role: Role::Monitor }));
        assert_eq!(events.try_recv(), Ok(SessionEvent::SignedOut));
        assert!(events.try_recv().is_err());
    }
}
