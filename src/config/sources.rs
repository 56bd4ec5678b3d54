use super::models::{Config, StorageProvider};
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "PROVISIONKIT_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/provisionkit.toml";
const ENV_PREFIX: &str = "PROVISIONKIT";
const ENV_SEPARATOR: &str = "__";
const BLOB_SECRET_ENV_VAR: &str = "PROVISIONKIT_BLOB_CONNECTION_STRING";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
///
/// An explicit `path` takes precedence over `PROVISIONKIT_CONFIG`.
pub fn load(path: Option<PathBuf>) -> Result<Config, ConfigError> {
    let _ = dotenvy::dotenv();

    let config_path = path.unwrap_or_else(|| {
        env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    });

    let mut config = load_from_sources(config_path)?;
    load_secrets(&mut config, env::var(BLOB_SECRET_ENV_VAR).ok());

    Ok(config)
}

/// Secrets are never read from TOML files, only from the environment
fn load_secrets(config: &mut Config, blob_connection_string: Option<String>) {
    if config.storage.provider == StorageProvider::Blob {
        if let Some(connection_string) = blob_connection_string {
            config.storage.connection_string = Some(connection_string);
        }
    }
}

/// Load configuration from a specific path and environment
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // PROVISIONKIT__STORAGE__CONTAINER -> storage.container
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.storage.provider, StorageProvider::Filesystem);
        assert_eq!(config.storage.container, "templates");
        assert_eq!(config.template.file_name, "template.json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[storage]
provider = "blob"
container = "provisioning/contoso"

[template]
file_name = "intranet.json"

[logging]
level = "debug"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.storage.provider, StorageProvider::Blob);
        assert_eq!(config.storage.container, "provisioning/contoso");
        assert!(config.storage.connection_string.is_none());
        assert_eq!(config.template.file_name, "intranet.json");
        assert_eq!(config.logging.level, "debug");
    }

    // Environment overrides are not exercised here: env::set_var is unsafe
    // and races with other tests.

    #[test]
    fn test_blob_secret_only_applies_to_blob_storage() {
        let mut config = Config::default();
        load_secrets(&mut config, Some("memory://".to_string()));
        assert!(config.storage.connection_string.is_none());

        config.storage.provider = StorageProvider::Blob;
        load_secrets(&mut config, Some("memory://".to_string()));
        assert_eq!(config.storage.connection_string.as_deref(), Some("memory://"));
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");
        fs::write(&config_path, "[storage]\nprovider = \"ftp\"\n").unwrap();

        assert!(load_from_sources(config_path).is_err());
    }
}
