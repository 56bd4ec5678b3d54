use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub template: TemplateConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend holding templates and their assets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    #[default]
    Filesystem,
    Blob,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub provider: StorageProvider,
    /// Root directory for `filesystem`, account connection string for `blob`
    ///
    /// Blob connection strings carry the account key and are normally
    /// supplied through `PROVISIONKIT_BLOB_CONNECTION_STRING` instead.
    pub connection_string: Option<String>,
    #[serde(default = "default_container")]
    pub container: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: StorageProvider::default(),
            connection_string: None,
            container: default_container(),
        }
    }
}

fn default_container() -> String {
    "templates".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TemplateConfig {
    /// Name of the template artifact inside the storage container
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            file_name: default_file_name(),
        }
    }
}

fn default_file_name() -> String {
    "template.json".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is not set
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
