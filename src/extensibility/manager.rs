use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::registry::{ExtensibilityError, ProviderRegistry};
use crate::model::{Provider, Template};
use crate::site::Site;

/// A provider that failed during [`ExtensibilityManager::execute_all`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalloutFailure {
    pub provider: String,
    pub error: String,
}

/// Outcome of running every provider of a template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalloutReport {
    pub executed: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<CalloutFailure>,
}

impl CalloutReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs the extensibility providers registered on a template
#[derive(Debug, Clone, Default)]
pub struct ExtensibilityManager {
    registry: Arc<ProviderRegistry>,
}

impl ExtensibilityManager {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Resolve one provider by identifier and invoke it
    ///
    /// A provider that panics is reported as a failed callout.
    pub async fn execute_extensibility_callout(
        &self,
        site: &dyn Site,
        provider: &Provider,
        template: &Template,
    ) -> Result<(), ExtensibilityError> {
        let callout = self.registry.resolve(&provider.id)?;

        debug!(provider = %provider.id, site = site.url(), "Invoking extensibility provider");
        let request = callout.process_request(site, template, &provider.configuration);
        let outcome = AssertUnwindSafe(request).catch_unwind().await;

        let message = match outcome {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => e.to_string(),
            Err(panic) => format!("panicked: {}", panic_message(panic.as_ref())),
        };
        Err(ExtensibilityError::CallOut {
            provider: provider.id.clone(),
            message,
        })
    }

    /// Invoke every enabled provider of the template in order
    ///
    /// A failing provider is logged and recorded in the report, and the loop
    /// moves on to the next one. This never fails.
    pub async fn execute_all(&self, site: &dyn Site, template: &Template) -> CalloutReport {
        let mut report = CalloutReport::default();

        for provider in &template.providers {
            if !provider.enabled {
                debug!(provider = %provider.id, "Skipping disabled provider");
                report.skipped.push(provider.id.clone());
                continue;
            }

            match self.execute_extensibility_callout(site, provider, template).await {
                Ok(()) => report.executed.push(provider.id.clone()),
                Err(e) => {
                    error!(
                        domain = "extensibility",
                        provider = %provider.id,
                        error = %e,
                        "Extensibility provider failed"
                    );
                    report.failed.push(CalloutFailure {
                        provider: provider.id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            executed = report.executed.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Extensibility providers finished"
        );
        report
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensibility::{ExtensibilityProvider, ProviderError};
    use crate::site::InMemorySite;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records the configuration strings it was called with
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ExtensibilityProvider for Recorder {
        async fn process_request(
            &self,
            _site: &dyn Site,
            _template: &Template,
            configuration: &str,
        ) -> Result<(), ProviderError> {
            self.calls.lock().unwrap().push(configuration.to_string());
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl ExtensibilityProvider for Failing {
        async fn process_request(
            &self,
            _site: &dyn Site,
            _template: &Template,
            _configuration: &str,
        ) -> Result<(), ProviderError> {
            Err("branding service rejected the request".into())
        }
    }

    struct Panicking;

    #[async_trait]
    impl ExtensibilityProvider for Panicking {
        async fn process_request(
            &self,
            _site: &dyn Site,
            _template: &Template,
            configuration: &str,
        ) -> Result<(), ProviderError> {
            panic!("bad configuration {configuration:?}");
        }
    }

    fn manager_with(recorder: Arc<Recorder>) -> ExtensibilityManager {
        let mut registry = ProviderRegistry::new();
        registry.register_instance("contoso.failing", Arc::new(Failing));
        registry.register_instance("contoso.panicking", Arc::new(Panicking));
        registry.register_instance("contoso.recorder", recorder);
        ExtensibilityManager::new(registry)
    }

    #[tokio::test]
    async fn test_failing_provider_does_not_stop_later_ones() {
        let recorder = Arc::new(Recorder::default());
        let manager = manager_with(recorder.clone());
        let site = InMemorySite::new("https://contoso.test");

        let mut template = Template::new();
        template.providers.push(Provider::new("contoso.failing", ""));
        template.providers.push(Provider::new("contoso.recorder", "second"));

        let report = manager.execute_all(&site, &template).await;

        assert_eq!(report.executed, vec!["contoso.recorder"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].provider, "contoso.failing");
        assert!(report.failed[0].error.contains("rejected"));
        assert_eq!(*recorder.calls.lock().unwrap(), vec!["second"]);
    }

    #[tokio::test]
    async fn test_unknown_provider_fails_only_its_invocation() {
        let recorder = Arc::new(Recorder::default());
        let manager = manager_with(recorder.clone());
        let site = InMemorySite::new("https://contoso.test");

        let mut template = Template::new();
        template.providers.push(Provider::new("contoso.unavailable", ""));
        template.providers.push(Provider::new("contoso.recorder", "after"));

        let report = manager.execute_all(&site, &template).await;

        assert!(!report.is_clean());
        assert_eq!(report.failed[0].provider, "contoso.unavailable");
        assert_eq!(report.executed, vec!["contoso.recorder"]);
    }

    #[tokio::test]
    async fn test_disabled_provider_is_skipped() {
        let recorder = Arc::new(Recorder::default());
        let manager = manager_with(recorder.clone());
        let site = InMemorySite::new("https://contoso.test");

        let mut template = Template::new();
        let mut disabled = Provider::new("contoso.recorder", "off");
        disabled.enabled = false;
        template.providers.push(disabled);

        let report = manager.execute_all(&site, &template).await;

        assert_eq!(report.skipped, vec!["contoso.recorder"]);
        assert!(report.executed.is_empty());
        assert!(recorder.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_single_callout_surfaces_error() {
        let manager = manager_with(Arc::new(Recorder::default()));
        let site = InMemorySite::new("https://contoso.test");
        let template = Template::new();

        let err = manager
            .execute_extensibility_callout(&site, &Provider::new("contoso.failing", ""), &template)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ExtensibilityError::CallOut { ref provider, .. } if provider == "contoso.failing"
        ));
    }

    #[tokio::test]
    async fn test_panicking_provider_does_not_stop_later_ones() {
        let recorder = Arc::new(Recorder::default());
        let manager = manager_with(recorder.clone());
        let site = InMemorySite::new("https://contoso.test");

        let mut template = Template::new();
        template.providers.push(Provider::new("contoso.panicking", "{broken"));
        template.providers.push(Provider::new("contoso.recorder", "after panic"));

        let report = manager.execute_all(&site, &template).await;

        assert_eq!(report.executed, vec!["contoso.recorder"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].provider, "contoso.panicking");
        assert!(report.failed[0].error.contains("panicked: bad configuration"));
        assert_eq!(*recorder.calls.lock().unwrap(), vec!["after panic"]);
    }

    #[test]
    fn test_panic_message_payloads() {
        let literal: Box<dyn Any + Send> = Box::new("static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let other: Box<dyn Any + Send> = Box::new(7u8);

        assert_eq!(panic_message(literal.as_ref()), "static");
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
