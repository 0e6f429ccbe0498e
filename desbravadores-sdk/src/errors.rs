use thiserror::Error;

use crate::{access::Feature, token::Role};

/// Errors surfaced by the session store and the request gateway
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Session expired. Please sign in again.")]
    SessionExpired,

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Could not decode response: {0}")]
    Decode(String),

    #[error("Invalid session token: {0}")]
    InvalidToken(#[from] crate::token::TokenError),

    #[error("Invalid login response: token not found")]
    MissingToken,

    #[error("Access denied: {role} cannot use {feature}")]
    AccessDenied { role: Role, feature: Feature },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// HTTP status of a backend rejection, if this error came from one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the caller has to go back to the sign-in screen
    pub fn requires_sign_in(&self) -> bool {
        matches!(
            self,
            ApiError::SessionExpired | ApiError::InvalidToken(_) | ApiError::MissingToken
        )
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, ApiError>;
