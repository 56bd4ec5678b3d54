use async_trait::async_trait;
use thiserror::Error;

use crate::connectors::ConnectorError;
use crate::model::Template;
use crate::site::{Site, SiteError};

/// Handler errors
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{handler} does not support {operation}")]
    Unsupported {
        handler: &'static str,
        operation: &'static str,
    },
    #[error("site request failed: {0}")]
    Site(#[from] SiteError),
    #[error("connector failed: {0}")]
    Connector(#[from] ConnectorError),
    #[error("asset '{name}' not found in the template connector")]
    MissingAsset { name: String },
}

/// One configuration domain of a site (lists, features, ...)
///
/// Handlers are driven in a fixed order by the converter and never run
/// concurrently against the same template.
#[async_trait]
pub trait ObjectHandler: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &'static str;

    /// Read the live configuration of this domain into the template
    ///
    /// Entities of other domains are left untouched.
    async fn create_entities(
        &self,
        site: &dyn Site,
        template: Template,
    ) -> Result<Template, HandlerError>;

    /// Push this domain's slice of the template onto the site
    ///
    /// Running it twice with the same template converges to the same state.
    async fn provision_objects(&self, site: &dyn Site, template: &Template)
    -> Result<(), HandlerError>;
}
