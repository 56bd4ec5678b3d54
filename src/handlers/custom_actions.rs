use async_trait::async_trait;
use tracing::{debug, info};

use super::traits::{HandlerError, ObjectHandler};
use crate::model::{ActionScope, Template};
use crate::site::Site;

const SCOPES: [ActionScope; 2] = [ActionScope::Site, ActionScope::Web];

/// Site- and web-scoped custom actions, keyed by name
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomActionsHandler;

#[async_trait]
impl ObjectHandler for CustomActionsHandler {
    fn name(&self) -> &'static str {
        "custom actions"
    }

    async fn create_entities(
        &self,
        site: &dyn Site,
        mut template: Template,
    ) -> Result<Template, HandlerError> {
        for scope in SCOPES {
            let live = site.custom_actions(scope).await?;
            let actions = template.custom_actions.scope_mut(scope);

            for action in live {
                match actions.iter_mut().find(|a| a.name == action.name) {
                    Some(existing) => *existing = action,
                    None => actions.push(action),
                }
            }
        }

        debug!(count = template.custom_actions.len(), "Extracted custom actions");
        Ok(template)
    }

    async fn provision_objects(
        &self,
        site: &dyn Site,
        template: &Template,
    ) -> Result<(), HandlerError> {
        for scope in SCOPES {
            for action in template.custom_actions.scope(scope) {
                if site.custom_action_exists(scope, &action.name).await? {
                    debug!(name = %action.name, ?scope, "Custom action exists, skipping");
                    continue;
                }
                site.add_custom_action(scope, action).await?;
                info!(name = %action.name, ?scope, "Added custom action");
            }
        }
        Ok(())
    }
}
