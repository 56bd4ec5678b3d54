use async_trait::async_trait;
use tracing::{debug, info};

use super::traits::{HandlerError, ObjectHandler};
use crate::model::{Feature, FeatureScope, Template};
use crate::site::Site;

const SCOPES: [FeatureScope; 2] = [FeatureScope::Site, FeatureScope::Web];

/// Site and web feature activation
#[derive(Debug, Clone, Copy, Default)]
pub struct FeaturesHandler;

#[async_trait]
impl ObjectHandler for FeaturesHandler {
    fn name(&self) -> &'static str {
        "features"
    }

    async fn create_entities(
        &self,
        site: &dyn Site,
        mut template: Template,
    ) -> Result<Template, HandlerError> {
        for scope in SCOPES {
            let active = site.active_features(scope).await?;
            let features = template.features.scope_mut(scope);

            for id in active {
                if !features.iter().any(|f| f.id == id) {
                    features.push(Feature::activate(id));
                }
            }
        }
        Ok(template)
    }

    async fn provision_objects(
        &self,
        site: &dyn Site,
        template: &Template,
    ) -> Result<(), HandlerError> {
        for scope in SCOPES {
            for feature in template.features.scope(scope) {
                let active = site.is_feature_active(scope, feature.id).await?;

                match (feature.deactivate, active) {
                    (false, false) => {
                        site.activate_feature(scope, feature.id).await?;
                        info!(id = %feature.id, ?scope, "Activated feature");
                    }
                    (true, true) => {
                        site.deactivate_feature(scope, feature.id).await?;
                        info!(id = %feature.id, ?scope, "Deactivated feature");
                    }
                    _ => debug!(id = %feature.id, ?scope, "Feature already in target state"),
                }
            }
        }
        Ok(())
    }
}
