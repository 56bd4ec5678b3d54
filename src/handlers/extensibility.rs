use async_trait::async_trait;
use tracing::warn;

use super::traits::{HandlerError, ObjectHandler};
use crate::extensibility::ExtensibilityManager;
use crate::model::Template;
use crate::site::Site;

/// Runs the template's extensibility providers as the last apply step
///
/// Provider failures are reported by the manager and never abort the apply.
#[derive(Debug, Clone, Default)]
pub struct ExtensibilityHandler {
    manager: ExtensibilityManager,
}

impl ExtensibilityHandler {
    pub fn new(manager: ExtensibilityManager) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &ExtensibilityManager {
        &self.manager
    }
}

#[async_trait]
impl ObjectHandler for ExtensibilityHandler {
    fn name(&self) -> &'static str {
        "extensibility"
    }

    async fn create_entities(
        &self,
        _site: &dyn Site,
        _template: Template,
    ) -> Result<Template, HandlerError> {
        Err(HandlerError::Unsupported {
            handler: "extensibility",
            operation: "extraction",
        })
    }

    async fn provision_objects(
        &self,
        site: &dyn Site,
        template: &Template,
    ) -> Result<(), HandlerError> {
        let report = self.manager.execute_all(site, template).await;
        if !report.is_clean() {
            warn!(failed = report.failed.len(), "Some extensibility providers failed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Provider;
    use crate::site::InMemorySite;

    #[tokio::test]
    async fn test_extraction_is_unsupported() {
        let site = InMemorySite::new("https://contoso.test");

        let err = ExtensibilityHandler::default()
            .create_entities(&site, Template::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            HandlerError::Unsupported {
                operation: "extraction",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_unknown_provider_does_not_fail_apply() {
        let site = InMemorySite::new("https://contoso.test");
        let mut template = Template::new();
        template.providers.push(Provider::new("contoso.unavailable", ""));

        ExtensibilityHandler::default()
            .provision_objects(&site, &template)
            .await
            .unwrap();
    }
}
