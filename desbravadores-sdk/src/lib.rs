//! Client SDK for the Desbravadores troop-management backend
//!
//! This SDK provides:
//! - A session store that persists the bearer token and decodes its role
//! - A request gateway that authenticates every call and normalizes errors
//! - Role-gated access checks for the app's screens
//! - Typed endpoint bindings and the data shaping each screen performs

pub mod access;
pub mod api;
pub mod client;
pub mod errors;
pub mod events;
pub mod models;
pub mod request;
pub mod services;
pub mod session;
pub mod storage;
pub mod token;

pub use access::{require, Feature};
pub use client::ApiClient;
pub use errors::*;
pub use events::SessionEvent;
pub use models::*;
pub use request::{ApiRequest, AuthMode, RequestBody};
pub use session::{SessionState, SessionStore};
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};
pub use token::{decode_role, Role};
