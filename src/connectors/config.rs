use object_store::ObjectStore;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::error::{ConnectorError, Result};
use crate::site::DocumentLibrary;

/// Connection string (blob account, filesystem root, or site url)
pub const CONNECTION_STRING: &str = "ConnectionString";
/// Default container used when an operation names none
pub const CONTAINER: &str = "Container";
/// Pre-built, already-authenticated client handle
pub const CLIENT_CONTEXT: &str = "ClientContext";

/// Already-authenticated client a connector can be handed
#[derive(Clone)]
pub enum ClientHandle {
    ObjectStore(Arc<dyn ObjectStore>),
    Library(Arc<dyn DocumentLibrary>),
}

impl fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientHandle::ObjectStore(store) => write!(f, "ObjectStore({store})"),
            ClientHandle::Library(_) => f.write_str("Library(..)"),
        }
    }
}

/// Value stored under a configuration key
#[derive(Debug, Clone)]
pub enum ConfigValue {
    Text(String),
    Client(ClientHandle),
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Text(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Text(value)
    }
}

impl From<Arc<dyn ObjectStore>> for ConfigValue {
    fn from(value: Arc<dyn ObjectStore>) -> Self {
        ConfigValue::Client(ClientHandle::ObjectStore(value))
    }
}

impl From<Arc<dyn DocumentLibrary>> for ConfigValue {
    fn from(value: Arc<dyn DocumentLibrary>) -> Self {
        ConfigValue::Client(ClientHandle::Library(value))
    }
}

/// Connector configuration
///
/// Populated either through the named fields or key by key with
/// [`ConnectorConfig::set`]. Nothing is validated here; connectors check for
/// the keys they need on first use.
#[derive(Debug, Clone, Default)]
pub struct ConnectorConfig {
    pub connection_string: Option<String>,
    pub container: Option<String>,
    pub client: Option<ClientHandle>,
    /// Keys no connector understands
    pub extra: BTreeMap<String, String>,
}

impl ConnectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<ConfigValue>) -> &mut Self {
        match (key, value.into()) {
            (CONNECTION_STRING, ConfigValue::Text(text)) => self.connection_string = Some(text),
            (CONTAINER, ConfigValue::Text(text)) => self.container = Some(text),
            (CLIENT_CONTEXT, ConfigValue::Client(client)) => self.client = Some(client),
            (key, ConfigValue::Text(text)) => {
                tracing::debug!(key, "Unrecognized connector key kept as extra");
                self.extra.insert(key.to_string(), text);
            }
            (key, ConfigValue::Client(_)) => {
                tracing::warn!(key, "Client handle under unexpected key ignored");
            }
        }
        self
    }

    /// Consuming variant of [`ConnectorConfig::set`]
    pub fn with(mut self, key: &str, value: impl Into<ConfigValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn require_connection_string(&self) -> Result<&str> {
        self.connection_string
            .as_deref()
            .ok_or(ConnectorError::NotConfigured {
                key: CONNECTION_STRING,
            })
    }

    /// The override when given, otherwise the configured default container
    pub fn resolve_container<'a>(&'a self, container: Option<&'a str>) -> Result<&'a str> {
        container
            .or(self.container.as_deref())
            .ok_or(ConnectorError::NotConfigured { key: CONTAINER })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    #[test]
    fn test_set_known_and_unknown_keys() {
        let mut config = ConnectorConfig::new();
        config
            .set(CONNECTION_STRING, "memory://")
            .set(CONTAINER, "templates")
            .set("Region", "westeurope");

        assert_eq!(config.connection_string.as_deref(), Some("memory://"));
        assert_eq!(config.container.as_deref(), Some("templates"));
        assert_eq!(config.extra.get("Region").map(String::as_str), Some("westeurope"));
        assert!(config.client.is_none());
    }

    #[test]
    fn test_client_handle_key() {
        let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        let config = ConnectorConfig::new().with(CLIENT_CONTEXT, store);

        assert!(matches!(config.client, Some(ClientHandle::ObjectStore(_))));
    }

    #[test]
    fn test_client_under_wrong_key_is_ignored() {
        let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        let config = ConnectorConfig::new().with(CONTAINER, store);

        assert!(config.client.is_none());
        assert!(config.container.is_none());
    }

    #[test]
    fn test_missing_keys_reported_lazily() {
        let config = ConnectorConfig::new();

        assert!(matches!(
            config.require_connection_string(),
            Err(ConnectorError::NotConfigured { key: CONNECTION_STRING })
        ));
        assert!(matches!(
            config.resolve_container(None),
            Err(ConnectorError::NotConfigured { key: CONTAINER })
        ));
        assert_eq!(config.resolve_container(Some("other")).unwrap(), "other");
    }

    #[test]
    fn test_override_wins_over_default_container() {
        let config = ConnectorConfig::new().with(CONTAINER, "default");

        assert_eq!(config.resolve_container(None).unwrap(), "default");
        assert_eq!(config.resolve_container(Some("x")).unwrap(), "x");
    }
}
