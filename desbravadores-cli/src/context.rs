use std::sync::Arc;

use desbravadores_sdk::{ApiClient, ClientConfig, FileTokenStorage, SessionStore};
use tracing::debug;

use crate::{config::AppConfig, utils::errors::Result};

/// Everything a command needs. The session is reached through
/// `client.session()`.
pub struct AppContext {
    pub config: AppConfig,
    pub client: ApiClient,
}

impl AppContext {
    /// Build the client and restore the persisted session.
    pub async fn new(config: AppConfig) -> Result<Self> {
        let storage = Arc::new(FileTokenStorage::new(&config.storage.token_path));
        let session = Arc::new(SessionStore::new(storage));

        let client_config = ClientConfig::new(config.backend.base_url.clone())?;
        let client = ApiClient::new(client_config, session)?;

        let state = client.session().load().await?;
        debug!(
            "Session loaded from {}: authenticated={}",
            config.storage.token_path.display(),
            state.is_authenticated()
        );

        Ok(Self { config, client })
    }
}
