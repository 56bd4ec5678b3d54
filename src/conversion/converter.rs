use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use super::error::{ConversionError, Direction, Result};
use crate::connectors::{FileConnector, FileDescriptor};
use crate::extensibility::ExtensibilityManager;
use crate::handlers::{
    ComposedLookHandler, CustomActionsHandler, ExtensibilityHandler, FeaturesHandler,
    FilesHandler, ListInstancesHandler, ObjectHandler,
};
use crate::model::Template;
use crate::site::Site;

/// Drives the object handlers over a site in a fixed order
///
/// Extraction runs lists, custom actions, features, composed look and
/// files. Apply runs the same sequence followed by extensibility. The first
/// handler error aborts the run; changes already made to the site stay.
#[derive(Clone)]
pub struct TemplateConverter {
    handlers: Vec<Arc<dyn ObjectHandler>>,
    extensibility: Arc<dyn ObjectHandler>,
}

impl fmt::Debug for TemplateConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateConverter")
            .field("handlers", &self.handler_names(Direction::Apply))
            .finish()
    }
}

impl Default for TemplateConverter {
    fn default() -> Self {
        Self::new(FilesHandler::default(), ExtensibilityManager::default())
    }
}

impl TemplateConverter {
    pub fn new(files: FilesHandler, extensibility: ExtensibilityManager) -> Self {
        let handlers: Vec<Arc<dyn ObjectHandler>> = vec![
            Arc::new(ListInstancesHandler),
            Arc::new(CustomActionsHandler),
            Arc::new(FeaturesHandler),
            Arc::new(ComposedLookHandler),
            Arc::new(files),
        ];
        Self {
            handlers,
            extensibility: Arc::new(ExtensibilityHandler::new(extensibility)),
        }
    }

    /// Handler names in the order they run
    pub fn handler_names(&self, direction: Direction) -> Vec<&'static str> {
        self.sequence(direction).map(|h| h.name()).collect()
    }

    fn sequence(&self, direction: Direction) -> impl Iterator<Item = &Arc<dyn ObjectHandler>> {
        let tail = match direction {
            Direction::Extract => None,
            Direction::Apply => Some(&self.extensibility),
        };
        self.handlers.iter().chain(tail)
    }

    /// Capture the configuration of `site` into a new template
    pub async fn extract_template(&self, site: &dyn Site) -> Result<Template> {
        info!(site = site.url(), "Extracting template");

        let mut template = Template::new();
        for handler in self.sequence(Direction::Extract) {
            debug!(handler = handler.name(), "Running handler");
            template = handler
                .create_entities(site, template)
                .await
                .map_err(|source| ConversionError::Handler {
                    handler: handler.name(),
                    direction: Direction::Extract,
                    source,
                })?;
        }
        template.generated_at = Some(Utc::now());

        info!(
            site = site.url(),
            template_id = %template.id,
            lists = template.lists.len(),
            custom_actions = template.custom_actions.len(),
            files = template.files.len(),
            "Template extracted"
        );
        Ok(template)
    }

    /// Provision `template` onto `site`
    pub async fn apply_template(&self, site: &dyn Site, template: &Template) -> Result<()> {
        info!(site = site.url(), template_id = %template.id, "Applying template");

        for handler in self.sequence(Direction::Apply) {
            debug!(handler = handler.name(), "Running handler");
            handler
                .provision_objects(site, template)
                .await
                .map_err(|source| ConversionError::Handler {
                    handler: handler.name(),
                    direction: Direction::Apply,
                    source,
                })?;
        }

        info!(site = site.url(), template_id = %template.id, "Template applied");
        Ok(())
    }
}

/// Write a template as JSON through a connector
pub async fn save_template(
    connector: &dyn FileConnector,
    descriptor: &FileDescriptor,
    template: &Template,
) -> Result<()> {
    let bytes = template.to_json()?;
    connector
        .save_file(&descriptor.name, descriptor.container(), &bytes)
        .await?;
    debug!(backend = %connector.describe(), file = %descriptor, "Saved template");
    Ok(())
}

/// Read a template saved by [`save_template`]; `None` when it doesn't exist
pub async fn load_template(
    connector: &dyn FileConnector,
    descriptor: &FileDescriptor,
) -> Result<Option<Template>> {
    let Some(bytes) = connector
        .get_file_bytes(&descriptor.name, descriptor.container())
        .await?
    else {
        return Ok(None);
    };
    Ok(Some(Template::from_json(&bytes)?))
}
