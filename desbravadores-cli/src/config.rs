use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::utils::errors::{CliError, Result};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding the persisted session token
    pub token_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            token_path: base.join("desbravadores").join("session.json"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, else `DESBRAVADORES_CONFIG`, else the user config
    /// dir. A missing file means defaults. Environment variables win over
    /// the file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => default_config_path(),
        };

        let mut config = if config_path.exists() {
            let config_str = std::fs::read_to_string(&config_path).map_err(|e| {
                CliError::Configuration(format!(
                    "Failed to read config file {}: {}",
                    config_path.display(),
                    e
                ))
            })?;
            Self::from_toml(&config_str)?
        } else {
            AppConfig::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str::<AppConfig>(contents)
            .map_err(|e| CliError::Configuration(format!("Failed to parse config file: {}", e)))
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DESBRAVADORES_API_URL") {
            self.backend.base_url = url;
        }
        if let Some(path) = lookup("DESBRAVADORES_TOKEN_PATH") {
            self.storage.token_path = PathBuf::from(path);
        }
        if let Some(level) = lookup("DESBRAVADORES_LOG") {
            self.logging.level = level;
        }
    }
}

fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var("DESBRAVADORES_CONFIG") {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("desbravadores")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [backend]
            base_url = "http://192.168.56.1:8080"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.base_url, "http://192.168.56.1:8080");
        assert_eq!(config.logging.level, "warn");
        assert!(config.storage.token_path.ends_with("desbravadores/session.json"));
    }

    #[test]
    fn environment_wins_over_file() {
        let mut config = AppConfig::from_toml(
            r#"
            [backend]
            base_url = "http://from-file:8080"

            [logging]
            level = "info"
            "#,
        )
        .unwrap();

        let env: HashMap<&str, &str> = HashMap::from([
            ("DESBRAVADORES_API_URL", "http://from-env:9090"),
            ("DESBRAVADORES_TOKEN_PATH", "/tmp/token.json"),
        ]);
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend.base_url, "http://from-env:9090");
        assert_eq!(config.storage.token_path, PathBuf::from("/tmp/token.json"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn invalid_toml_is_a_configuration_error() {
        let err = AppConfig::from_toml("[backend\nbase_url = 1").unwrap_err();
        assert!(matches!(err, CliError::Configuration(_)));
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert!(!config.backend.base_url.is_empty());
    }
}
