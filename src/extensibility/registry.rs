use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::model::Template;
use crate::site::Site;

/// Error type returned by provider implementations
pub type ProviderError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ExtensibilityError {
    #[error("no extensibility provider registered as '{0}'")]
    UnknownProvider(String),
    #[error("extensibility provider '{provider}' failed: {message}")]
    CallOut { provider: String, message: String },
}

/// Custom logic a template can hook into the apply pipeline
#[async_trait]
pub trait ExtensibilityProvider: Send + Sync {
    /// Run against the site being provisioned
    ///
    /// `configuration` is the free-form string stored with the provider
    /// registration in the template.
    async fn process_request(
        &self,
        site: &dyn Site,
        template: &Template,
        configuration: &str,
    ) -> Result<(), ProviderError>;
}

pub type ProviderFactory = Arc<dyn Fn() -> Arc<dyn ExtensibilityProvider> + Send + Sync>;

/// Maps provider identifiers to factories
///
/// Lookups happen when a provider is executed, never when a template is
/// loaded.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn ExtensibilityProvider> + Send + Sync + 'static,
    {
        self.factories.insert(id.into(), Arc::new(factory));
    }

    /// Register one shared instance for every invocation
    pub fn register_instance(
        &mut self,
        id: impl Into<String>,
        provider: Arc<dyn ExtensibilityProvider>,
    ) {
        self.register(id, move || provider.clone());
    }

    pub fn resolve(&self, id: &str) -> Result<Arc<dyn ExtensibilityProvider>, ExtensibilityError> {
        self.factories
            .get(id)
            .map(|factory| factory())
            .ok_or_else(|| ExtensibilityError::UnknownProvider(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Noop;

    #[async_trait]
    impl ExtensibilityProvider for Noop {
        async fn process_request(
            &self,
            _site: &dyn Site,
            _template: &Template,
            _configuration: &str,
        ) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    #[test]
    fn test_resolve_registered_provider() {
        let mut registry = ProviderRegistry::new();
        registry.register_instance("contoso.noop", Arc::new(Noop));

        assert!(registry.contains("contoso.noop"));
        assert!(registry.resolve("contoso.noop").is_ok());
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["contoso.noop"]);
    }

    #[test]
    fn test_resolve_unknown_provider() {
        let registry = ProviderRegistry::new();

        assert!(matches!(
            registry.resolve("missing"),
            Err(ExtensibilityError::UnknownProvider(ref id)) if id == "missing"
        ));
    }

    #[test]
    fn test_factory_runs_per_resolution() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = built.clone();

        let mut registry = ProviderRegistry::new();
        registry.register("contoso.counted", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(Noop) as Arc<dyn ExtensibilityProvider>
        });

        assert_eq!(built.load(Ordering::SeqCst), 0);
        registry.resolve("contoso.counted").unwrap();
        registry.resolve("contoso.counted").unwrap();
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }
}
