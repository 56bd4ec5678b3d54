//! Storage connectors for templates and their assets
//!
//! Every backend implements [`FileConnector`], so callers only decide
//! *where* a template lives through configuration:
//!
//! - [`BlobStorageConnector`] - cloud blob storage via `object_store`
//! - [`FileSystemConnector`] - a local directory tree
//! - [`DocumentLibraryConnector`] - a document library on a remote site
//!
//! ## Example
//!
//! ```rust,ignore
//! use provisionkit::connectors::{FileConnector, FileSystemConnector};
//!
//! let connector = FileSystemConnector::new("./resources", "templates");
//! connector.save_file("a.txt", Some("X"), b"hello").await?;
//! assert_eq!(connector.get_file("a.txt", Some("X")).await?.as_deref(), Some("hello"));
//! ```

mod azure;
mod blob;
mod config;
mod error;
mod filesystem;
pub mod library;
pub mod path;
mod traits;

pub use blob::{BlobStorageConnector, MEMORY_CONNECTION_STRING};
pub use config::{
    CLIENT_CONTEXT, CONNECTION_STRING, CONTAINER, ClientHandle, ConfigValue, ConnectorConfig,
};
pub use error::{ConnectorError, Result};
pub use filesystem::FileSystemConnector;
pub use library::DocumentLibraryConnector;
pub use path::{LibraryPath, validate_name};
pub use traits::{FileConnector, FileDescriptor, FileStream};
