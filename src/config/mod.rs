//! Configuration management for provisionkit
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use provisionkit::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! let connector = config.connector();
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `PROVISIONKIT__<section>__<key>`
//!
//! Examples:
//! - `PROVISIONKIT__STORAGE__PROVIDER=blob`
//! - `PROVISIONKIT__STORAGE__CONTAINER=templates/contoso`
//! - `PROVISIONKIT__LOGGING__LEVEL=debug`
//!
//! The blob connection string is a secret and is read from
//! `PROVISIONKIT_BLOB_CONNECTION_STRING`.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/provisionkit.toml`.
//! This can be overridden using the `PROVISIONKIT_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use models::{Config, LoggingConfig, StorageConfig, StorageProvider, TemplateConfig};
pub use validation::ValidationError;

use std::sync::Arc;
use thiserror::Error;

use crate::connectors::{BlobStorageConnector, FileConnector, FileDescriptor, FileSystemConnector};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`PROVISIONKIT__*`)
    /// 2. TOML file (default: `config/provisionkit.toml`)
    /// 3. Default values
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(None)
    }

    /// Same as [`Config::load`], reading the TOML file from `path` if given
    pub fn load_with(path: Option<std::path::PathBuf>) -> Result<Self, ConfigError> {
        let config = sources::load(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path, skipping `.env` and secrets
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Connector for the configured storage backend
    ///
    /// A filesystem connector without a connection string is rooted at the
    /// working directory.
    pub fn connector(&self) -> Arc<dyn FileConnector> {
        let storage = &self.storage;
        match storage.provider {
            StorageProvider::Filesystem => Arc::new(FileSystemConnector::new(
                storage.connection_string.as_deref().unwrap_or("."),
                storage.container.as_str(),
            )),
            StorageProvider::Blob => Arc::new(BlobStorageConnector::new(
                storage.connection_string.as_deref().unwrap_or_default(),
                storage.container.as_str(),
            )),
        }
    }

    /// Copy safe to print: the blob connection string is masked
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.storage.provider == StorageProvider::Blob
            && config.storage.connection_string.is_some()
        {
            config.storage.connection_string = Some("<redacted>".to_string());
        }
        config
    }

    /// Location of the template artifact in the default container
    pub fn template_descriptor(&self) -> FileDescriptor {
        FileDescriptor::new(self.template.file_name.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = format!(
            r#"
[storage]
connection_string = "{}"
container = "site-templates"
        "#,
            temp_dir.path().display().to_string().replace('\\', "/")
        );

        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.storage.container, "site-templates");
        assert_eq!(config.template_descriptor(), FileDescriptor::new("template.json"));
    }

    #[test]
    fn test_validation_catches_blob_without_secret() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[storage]\nprovider = \"blob\"\n").unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(ValidationError::MissingBlobConnectionString)
        ));
    }

    #[test]
    fn test_redacted_masks_blob_secret() {
        let mut config = Config::default();
        config.storage.provider = StorageProvider::Blob;
        config.storage.connection_string = Some("AccountName=a;AccountKey=secret".to_string());

        let printed = toml::to_string(&config.redacted()).unwrap();
        assert!(!printed.contains("secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_configured_connector_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.connection_string = Some(temp_dir.path().to_string_lossy().into_owned());

        let connector = config.connector();
        connector.save_file("a.json", None, b"{}").await.unwrap();

        assert!(temp_dir.path().join("templates").join("a.json").exists());
        assert_eq!(connector.get_file("a.json", None).await.unwrap().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_memory_blob_connector() {
        let mut config = Config::default();
        config.storage.provider = StorageProvider::Blob;
        config.storage.connection_string = Some("memory://".to_string());

        let connector = config.connector();
        connector.save_file("a.json", None, b"{}").await.unwrap();

        assert_eq!(connector.get_files(None).await.unwrap(), vec!["a.json"]);
    }
}
