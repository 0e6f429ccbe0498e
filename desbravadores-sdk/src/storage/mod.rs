pub mod file;
pub mod memory;

use async_trait::async_trait;

use crate::errors::Result;

pub use file::FileTokenStorage;
pub use memory::MemoryTokenStorage;

/// Key the bearer token is persisted under
pub const TOKEN_STORAGE_KEY: &str = "jwtToken";

/// Durable home of the bearer token, surviving process restarts.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    async fn load_token(&self) -> Result<Option<String>>;
    async fn save_token(&self, token: &str) -> Result<()>;
    /// Removing an absent token is not an error.
    async fn clear_token(&self) -> Result<()>;
}
