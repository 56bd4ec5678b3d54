use async_trait::async_trait;
use tracing::{debug, info};

use super::traits::{HandlerError, ObjectHandler};
use crate::model::Template;
use crate::site::Site;

/// Lists and document libraries
#[derive(Debug, Clone, Copy, Default)]
pub struct ListInstancesHandler;

#[async_trait]
impl ObjectHandler for ListInstancesHandler {
    fn name(&self) -> &'static str {
        "lists"
    }

    async fn create_entities(
        &self,
        site: &dyn Site,
        mut template: Template,
    ) -> Result<Template, HandlerError> {
        let lists = site.lists().await?;

        for list in lists.into_iter().filter(|l| !l.hidden) {
            match template.lists.iter_mut().find(|l| l.title == list.title) {
                Some(existing) => *existing = list,
                None => template.lists.push(list),
            }
        }

        debug!(count = template.lists.len(), "Extracted lists");
        Ok(template)
    }

    async fn provision_objects(
        &self,
        site: &dyn Site,
        template: &Template,
    ) -> Result<(), HandlerError> {
        for list in &template.lists {
            if site.list_exists(&list.title).await? {
                debug!(title = %list.title, "List exists, skipping");
                continue;
            }
            site.create_list(list).await?;
            info!(title = %list.title, "Created list");
        }
        Ok(())
    }
}
