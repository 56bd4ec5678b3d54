use async_trait::async_trait;
use tracing::{debug, info};

use super::traits::{HandlerError, ObjectHandler};
use crate::model::Template;
use crate::site::Site;

/// Site branding
#[derive(Debug, Clone, Copy, Default)]
pub struct ComposedLookHandler;

#[async_trait]
impl ObjectHandler for ComposedLookHandler {
    fn name(&self) -> &'static str {
        "composed look"
    }

    async fn create_entities(
        &self,
        site: &dyn Site,
        mut template: Template,
    ) -> Result<Template, HandlerError> {
        if let Some(look) = site.composed_look().await? {
            debug!(name = %look.name, "Extracted composed look");
            template.composed_look = Some(look);
        }
        Ok(template)
    }

    async fn provision_objects(
        &self,
        site: &dyn Site,
        template: &Template,
    ) -> Result<(), HandlerError> {
        let Some(look) = &template.composed_look else {
            return Ok(());
        };

        if site.composed_look().await?.as_ref() == Some(look) {
            debug!(name = %look.name, "Composed look already applied");
            return Ok(());
        }

        site.set_composed_look(look).await?;
        info!(name = %look.name, "Applied composed look");
        Ok(())
    }
}
