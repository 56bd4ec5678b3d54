use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{ActionScope, ComposedLook, CustomAction, FeatureScope, ListInstance};

/// Errors raised by the remote site client
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("site unavailable: {0}")]
    Unavailable(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("request failed: {0}")]
    Request(String),
}

pub type Result<T> = std::result::Result<T, SiteError>;

/// Handle to a folder inside a document library
///
/// Holds the server-relative url of the folder, e.g. `/templates/sub1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FolderRef(pub String);

impl FolderRef {
    pub fn url(&self) -> &str {
        &self.0
    }

    pub fn child(&self, name: &str) -> FolderRef {
        FolderRef(format!("{}/{}", self.0.trim_end_matches('/'), name))
    }
}

/// Folder and file primitives of a remote document library
///
/// Lookups of absent libraries, folders or files return `Ok(None)`; `Err`
/// is reserved for transport, auth and permission failures.
#[async_trait]
pub trait DocumentLibrary: Send + Sync {
    /// Root folder of the library with the given title
    async fn root_folder(&self, library: &str) -> Result<Option<FolderRef>>;

    async fn sub_folder(&self, parent: &FolderRef, name: &str) -> Result<Option<FolderRef>>;

    async fn create_folder(&self, parent: &FolderRef, name: &str) -> Result<FolderRef>;

    /// Names of the files directly inside `folder`
    async fn folder_files(&self, folder: &FolderRef) -> Result<Vec<String>>;

    async fn read_file(&self, folder: &FolderRef, name: &str) -> Result<Option<Bytes>>;

    /// Upload replacing any file with the same name
    async fn upload_file(&self, folder: &FolderRef, name: &str, content: Bytes) -> Result<()>;

    /// Returns whether a file was removed
    async fn delete_file(&self, folder: &FolderRef, name: &str) -> Result<bool>;
}

/// Already-authenticated client for the site being extracted or provisioned
#[async_trait]
pub trait Site: DocumentLibrary {
    /// Site url, used for logging only
    fn url(&self) -> &str;

    async fn lists(&self) -> Result<Vec<ListInstance>>;

    async fn list_exists(&self, title: &str) -> Result<bool>;

    async fn create_list(&self, list: &ListInstance) -> Result<()>;

    async fn custom_actions(&self, scope: ActionScope) -> Result<Vec<CustomAction>>;

    async fn custom_action_exists(&self, scope: ActionScope, name: &str) -> Result<bool>;

    async fn add_custom_action(&self, scope: ActionScope, action: &CustomAction) -> Result<()>;

    async fn active_features(&self, scope: FeatureScope) -> Result<Vec<Uuid>>;

    async fn is_feature_active(&self, scope: FeatureScope, id: Uuid) -> Result<bool>;

    /// Fails with [`SiteError::Conflict`] when the feature is already active
    async fn activate_feature(&self, scope: FeatureScope, id: Uuid) -> Result<()>;

    async fn deactivate_feature(&self, scope: FeatureScope, id: Uuid) -> Result<()>;

    async fn composed_look(&self) -> Result<Option<ComposedLook>>;

    async fn set_composed_look(&self, look: &ComposedLook) -> Result<()>;
}
