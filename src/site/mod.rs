//! Boundary to the remote site being extracted or provisioned
//!
//! The real client (authentication, retries, the site's object model) lives
//! outside this crate; it only has to implement [`Site`]. [`InMemorySite`]
//! stands in for it in tests and local runs.

mod memory;
mod traits;

pub use memory::{DOCUMENT_LIBRARY_TEMPLATE, InMemorySite};
pub use traits::{DocumentLibrary, FolderRef, Result, Site, SiteError};
