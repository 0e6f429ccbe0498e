use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    errors::{ApiError, Result},
    storage::{TokenStorage, TOKEN_STORAGE_KEY},
};

/// Token storage backed by a small JSON object file, e.g.
/// `{"jwtToken": "eyJ..."}`.
#[derive(Debug)]
pub struct FileTokenStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored items, or `None` when the file exists but is not a JSON
    /// object of strings.
    async fn read_items(&self) -> Result<Option<BTreeMap<String, String>>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(Some(BTreeMap::new())),
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(items) => Ok(Some(items)),
                Err(e) => {
                    warn!("Ignoring unparsable {}: {}", self.path.display(), e);
                    Ok(None)
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Some(BTreeMap::new())),
            Err(e) => Err(ApiError::Storage(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn write_items(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if items.is_empty() {
            return match tokio::fs::remove_file(&self.path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(ApiError::Storage(format!(
                    "Failed to remove {}: {}",
                    self.path.display(),
                    e
                ))),
            };
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    ApiError::Storage(format!(
                        "Failed to create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let contents = serde_json::to_string_pretty(items)
            .map_err(|e| ApiError::Storage(e.to_string()))?;

        // Readers see either the old file or the new one, never a partial write.
        let staging = self.staging_path();
        tokio::fs::write(&staging, contents).await.map_err(|e| {
            ApiError::Storage(format!("Failed to write {}: {}", staging.display(), e))
        })?;
        tokio::fs::rename(&staging, &self.path).await.map_err(|e| {
            ApiError::Storage(format!("Failed to replace {}: {}", self.path.display(), e))
        })
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl TokenStorage for FileTokenStorage {
    async fn load_token(&self) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        let items = self.read_items().await?.unwrap_or_default();
        Ok(items.get(TOKEN_STORAGE_KEY).cloned())
    }

    async fn save_token(&self, token: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_items().await?.unwrap_or_default();
        items.insert(TOKEN_STORAGE_KEY.to_string(), token.to_string());
        self.write_items(&items).await?;
        debug!("Persisted session token to {}", self.path.display());
        Ok(())
    }

    async fn clear_token(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        let items = match self.read_items().await? {
            Some(mut items) => {
                if items.remove(TOKEN_STORAGE_KEY).is_none() {
                    return Ok(());
                }
                items
            }
            // Nothing in an unparsable file is worth keeping.
            None => BTreeMap::new(),
        };
        self.write_items(&items).await?;
        debug!("Removed session token from {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_means_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileTokenStorage::new(dir.path().join("session.json"));
        assert_eq!(storage.load_token().await.unwrap(), None);
        storage.clear_token().await.unwrap();
    }

    #[tokio::test]
    async fn token_survives_a_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        FileTokenStorage::new(&path).save_token("abc.def.ghi").await.unwrap();

        let reopened = FileTokenStorage::new(&path);
        assert_eq!(
            reopened.load_token().await.unwrap().as_deref(),
            Some("abc.def.ghi")
        );

        reopened.clear_token().await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn keeps_unrelated_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, r#"{"theme":"dark"}"#).await.unwrap();

        let storage = FileTokenStorage::new(&path);
        storage.save_token("t.o.k").await.unwrap();
        storage.clear_token().await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(contents.contains("theme"));
        assert!(!contents.contains(TOKEN_STORAGE_KEY));
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "{{{").await.unwrap();

        let storage = FileTokenStorage::new(&path);
        assert_eq!(storage.load_token().await.unwrap(), None);

        storage.clear_token().await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn save_replaces_a_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let storage = FileTokenStorage::new(&path);
        storage.save_token("t.o.k").await.unwrap();

        assert_eq!(storage.load_token().await.unwrap().as_deref(), Some("t.o.k"));
        assert!(!storage.staging_path().exists());
    }

    #[tokio::test]
    async fn unreadable_path_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::create_dir(&path).await.unwrap();

        let storage = FileTokenStorage::new(&path);
        assert!(matches!(storage.load_token().await, Err(ApiError::Storage(_))));
        assert!(matches!(storage.clear_token().await, Err(ApiError::Storage(_))));
    }
}
