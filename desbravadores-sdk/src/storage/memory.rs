use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::{
    errors::Result,
    storage::{TokenStorage, TOKEN_STORAGE_KEY},
};

/// In-process storage. Clones share the same map, so handing a clone to a
/// second `SessionStore` behaves like a restart against the same device.
#[derive(Debug, Clone)]
pub struct MemoryTokenStorage {
    items: Arc<DashMap<String, String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self {
            items: Arc::new(DashMap::new()),
        }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let storage = Self::new();
        storage
            .items
            .insert(TOKEN_STORAGE_KEY.to_string(), token.into());
        storage
    }
}

#[async_trait]
impl TokenStorage for MemoryTokenStorage {
    async fn load_token(&self) -> Result<Option<String>> {
        Ok(self
            .items
            .get(TOKEN_STORAGE_KEY)
            .map(|entry| entry.value().clone()))
    }

    async fn save_token(&self, token: &str) -> Result<()> {
        self.items
            .insert(TOKEN_STORAGE_KEY.to_string(), token.to_string());
        Ok(())
    }

    async fn clear_token(&self) -> Result<()> {
        self.items.remove(TOKEN_STORAGE_KEY);
        Ok(())
    }
}

impl Default for MemoryTokenStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_token() {
        let storage = MemoryTokenStorage::new();
        let other = storage.clone();

        tokio_test::block_on(storage.save_token("abc")).unwrap();
        assert_eq!(
            tokio_test::block_on(other.load_token()).unwrap().as_deref(),
            Some("abc")
        );

        tokio_test::block_on(other.clear_token()).unwrap();
        tokio_test::block_on(other.clear_token()).unwrap();
        assert_eq!(tokio_test::block_on(storage.load_token()).unwrap(), None);
    }
}
