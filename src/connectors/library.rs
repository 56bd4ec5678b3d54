use async_trait::async_trait;
use bytes::Bytes;
use std::io::Cursor;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::config::{CLIENT_CONTEXT, CONNECTION_STRING, CONTAINER, ClientHandle, ConnectorConfig};
use super::error::{ConnectorError, Result};
use super::path::{LibraryPath, validate_name};
use super::traits::{FileConnector, FileStream};
use crate::site::{self, DocumentLibrary, FolderRef};

/// Walk `path` from the library root; `None` when any part is missing
pub async fn resolve_folder<L>(library: &L, path: &LibraryPath) -> site::Result<Option<FolderRef>>
where
    L: DocumentLibrary + ?Sized,
{
    let Some(mut folder) = library.root_folder(&path.library).await? else {
        return Ok(None);
    };
    for name in &path.folders {
        match library.sub_folder(&folder, name).await? {
            Some(next) => folder = next,
            None => return Ok(None),
        }
    }
    Ok(Some(folder))
}

/// Walk `path` from the library root, creating missing folders on the way
pub async fn ensure_folder<L>(library: &L, path: &LibraryPath) -> Result<FolderRef>
where
    L: DocumentLibrary + ?Sized,
{
    let mut folder = library
        .root_folder(&path.library)
        .await?
        .ok_or_else(|| ConnectorError::LibraryNotFound(path.library.clone()))?;

    for name in &path.folders {
        folder = match library.sub_folder(&folder, name).await? {
            Some(next) => next,
            None => {
                tracing::debug!(parent = folder.url(), name, "Creating folder");
                library.create_folder(&folder, name).await?
            }
        };
    }
    Ok(folder)
}

/// Connector over a document library of a remote site
///
/// Containers are `"library[/folder[/folder...]]"` paths, normalized by
/// [`LibraryPath::parse`]. The site client comes in through
/// [`CLIENT_CONTEXT`]; the connection string (site url) is only used for
/// logging.
#[derive(Debug, Clone, Default)]
pub struct DocumentLibraryConnector {
    config: ConnectorConfig,
}

impl DocumentLibraryConnector {
    pub fn new(
        client: Arc<dyn DocumentLibrary>,
        site_url: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        let site_url: String = site_url.into();
        let container: String = container.into();
        Self::from_config(
            ConnectorConfig::new()
                .with(CONNECTION_STRING, site_url)
                .with(CONTAINER, container)
                .with(CLIENT_CONTEXT, client),
        )
    }

    pub fn from_config(config: ConnectorConfig) -> Self {
        Self { config }
    }

    pub fn config_mut(&mut self) -> &mut ConnectorConfig {
        &mut self.config
    }

    fn client(&self) -> Result<&dyn DocumentLibrary> {
        match &self.config.client {
            Some(ClientHandle::Library(client)) => Ok(client.as_ref()),
            _ => Err(ConnectorError::NotConfigured {
                key: CLIENT_CONTEXT,
            }),
        }
    }

    fn path(&self, container: Option<&str>) -> Result<LibraryPath> {
        LibraryPath::parse(self.config.resolve_container(container)?)
    }
}

#[async_trait]
impl FileConnector for DocumentLibraryConnector {
    fn describe(&self) -> String {
        format!(
            "library({})",
            self.config.connection_string.as_deref().unwrap_or("<unset>")
        )
    }

    async fn get_files(&self, container: Option<&str>) -> Result<Vec<String>> {
        let client = self.client()?;
        let path = self.path(container)?;

        match resolve_folder(client, &path).await? {
            Some(folder) => {
                let mut names = client.folder_files(&folder).await?;
                names.sort();
                Ok(names)
            }
            None => Ok(Vec::new()),
        }
    }

    async fn get_file_stream(
        &self,
        name: &str,
        container: Option<&str>,
    ) -> Result<Option<FileStream>> {
        let name = validate_name(name)?;
        let client = self.client()?;
        let path = self.path(container)?;

        let Some(folder) = resolve_folder(client, &path).await? else {
            return Ok(None);
        };
        let content = client.read_file(&folder, name).await?;

        Ok(content.map(|bytes| Box::new(Cursor::new(bytes)) as FileStream))
    }

    async fn save_file_stream(
        &self,
        name: &str,
        container: Option<&str>,
        content: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<()> {
        let name = validate_name(name)?;
        let client = self.client()?;
        let path = self.path(container)?;

        let mut data = Vec::new();
        content.read_to_end(&mut data).await?;
        let size = data.len();

        let folder = ensure_folder(client, &path).await?;
        client.upload_file(&folder, name, Bytes::from(data)).await?;

        tracing::info!(folder = folder.url(), name, size, "Uploaded file to library");
        Ok(())
    }

    async fn delete_file(&self, name: &str, container: Option<&str>) -> Result<()> {
        let name = validate_name(name)?;
        let client = self.client()?;
        let path = self.path(container)?;

        if let Some(folder) = resolve_folder(client, &path).await? {
            if client.delete_file(&folder, name).await? {
                tracing::info!(folder = folder.url(), name, "Deleted file from library");
            }
        }
        Ok(())
    }
}
