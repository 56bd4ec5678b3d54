use thiserror::Error;

use crate::site::SiteError;

/// Connector failures
///
/// An absent artifact is never an error; connectors report it as `Ok(None)`
/// or an empty listing.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("connector is missing required configuration key '{key}'")]
    NotConfigured { key: &'static str },

    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),

    #[error("invalid container path '{0}'")]
    InvalidContainer(String),

    #[error("invalid file name '{0}'")]
    InvalidName(String),

    #[error("document library '{0}' does not exist")]
    LibraryNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("container request for '{container}' failed with status {status}")]
    ContainerRequest { container: String, status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("site error: {0}")]
    Site(#[from] SiteError),

    #[error("file is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, ConnectorError>;
