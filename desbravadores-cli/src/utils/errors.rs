use desbravadores_sdk::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not signed in. Run `desbravadores login` first.")]
    NotSignedIn,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    pub fn requires_sign_in(&self) -> bool {
        match self {
            CliError::NotSignedIn => true,
            CliError::Api(e) => e.requires_sign_in(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
