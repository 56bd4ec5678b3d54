//! Blob storage connector on top of the object_store crate

use async_trait::async_trait;
use object_store::memory::InMemory;
use object_store::{ObjectStore, path::Path as StoragePath};
use std::io::Cursor;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::OnceCell;

use super::azure::AzureAccount;
use super::config::{CLIENT_CONTEXT, CONNECTION_STRING, CONTAINER, ClientHandle, ConnectorConfig};
use super::error::{ConnectorError, Result};
use super::path::{segments, validate_name};
use super::traits::{FileConnector, FileStream};

/// Connection string selecting a process-local in-memory account
pub const MEMORY_CONNECTION_STRING: &str = "memory://";

#[derive(Debug)]
enum BlobAccount {
    /// One store for every container, containers are top-level prefixes
    Shared(Arc<dyn ObjectStore>),
    /// One Azure store per container, built on first use
    Azure(AzureAccount),
}

/// Store plus the key prefix inside it that a container maps to
struct Location<'a> {
    store: Arc<dyn ObjectStore>,
    prefix: Vec<String>,
    /// Azure account and the container the prefix lives in
    azure: Option<(&'a AzureAccount, String)>,
}

impl Location<'_> {
    /// Key for `name`, kept verbatim so listings hand back the same name
    fn file(&self, name: &str) -> Result<StoragePath> {
        let name = validate_name(name)?;
        let key = self
            .prefix
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(name))
            .collect::<Vec<_>>()
            .join("/");
        StoragePath::parse(&key).map_err(|_| ConnectorError::InvalidName(name.to_string()))
    }

    fn listing_prefix(&self) -> Result<Option<StoragePath>> {
        if self.prefix.is_empty() {
            return Ok(None);
        }
        let key = self.prefix.join("/");
        StoragePath::parse(&key)
            .map(Some)
            .map_err(|_| ConnectorError::InvalidContainer(key))
    }
}

/// Connector over cloud blob storage
///
/// The account is resolved on first use from, in order: an `ObjectStore`
/// handle under [`CLIENT_CONTEXT`], the [`MEMORY_CONNECTION_STRING`], or an
/// Azure connection string (`AccountName=..;AccountKey=..`, optionally with
/// `BlobEndpoint=..`, or `UseDevelopmentStorage=true`). No anonymous access
/// is ever configured. Azure containers are created on the first save.
#[derive(Debug, Default)]
pub struct BlobStorageConnector {
    config: ConnectorConfig,
    account: OnceCell<BlobAccount>,
}

impl BlobStorageConnector {
    pub fn new(connection_string: impl Into<String>, container: impl Into<String>) -> Self {
        let connection_string: String = connection_string.into();
        let container: String = container.into();
        Self::from_config(
            ConnectorConfig::new()
                .with(CONNECTION_STRING, connection_string)
                .with(CONTAINER, container),
        )
    }

    /// Connector over an existing store, e.g. one shared between tests
    pub fn with_store(store: Arc<dyn ObjectStore>, container: impl Into<String>) -> Self {
        let container: String = container.into();
        Self::from_config(
            ConnectorConfig::new()
                .with(CLIENT_CONTEXT, store)
                .with(CONTAINER, container),
        )
    }

    pub fn from_config(config: ConnectorConfig) -> Self {
        Self {
            config,
            account: OnceCell::new(),
        }
    }

    /// Configuration changes only take effect before the first operation
    pub fn config_mut(&mut self) -> &mut ConnectorConfig {
        &mut self.config
    }

    async fn account(&self) -> Result<&BlobAccount> {
        self.account
            .get_or_try_init(|| async { self.open_account() })
            .await
    }

    fn open_account(&self) -> Result<BlobAccount> {
        if let Some(ClientHandle::ObjectStore(store)) = &self.config.client {
            tracing::debug!(store = %store, "Using provided object store");
            return Ok(BlobAccount::Shared(store.clone()));
        }

        let connection_string = self.config.require_connection_string()?;
        if connection_string.trim() == MEMORY_CONNECTION_STRING {
            tracing::info!("Using in-memory blob account");
            return Ok(BlobAccount::Shared(Arc::new(InMemory::new())));
        }

        AzureAccount::parse(connection_string).map(BlobAccount::Azure)
    }

    async fn locate(&self, container: Option<&str>) -> Result<Location<'_>> {
        let container = self.config.resolve_container(container)?;
        let parts = segments(container);
        if parts.is_empty() || parts.contains(&"..") {
            return Err(ConnectorError::InvalidContainer(container.to_string()));
        }

        match self.account().await? {
            BlobAccount::Shared(store) => Ok(Location {
                store: store.clone(),
                prefix: parts.into_iter().map(str::to_string).collect(),
                azure: None,
            }),
            BlobAccount::Azure(account) => {
                // first segment names the Azure container, the rest is a prefix in it
                Ok(Location {
                    store: account.store(parts[0]).await?,
                    prefix: parts[1..].iter().map(|s| s.to_string()).collect(),
                    azure: Some((account, parts[0].to_string())),
                })
            }
        }
    }
}

#[async_trait]
impl FileConnector for BlobStorageConnector {
    fn describe(&self) -> String {
        match self.account.get() {
            Some(BlobAccount::Shared(store)) => format!("blob({store})"),
            Some(BlobAccount::Azure(account)) => format!("blob(azure:{})", account.name),
            None => "blob(unresolved)".to_string(),
        }
    }

    async fn get_files(&self, container: Option<&str>) -> Result<Vec<String>> {
        let location = self.locate(container).await?;
        let prefix = location.listing_prefix()?;

        let listing = match location.store.list_with_delimiter(prefix.as_ref()).await {
            Ok(listing) => listing,
            Err(object_store::Error::NotFound { .. }) => return Ok(Vec::new()),
            Err(e) => {
                // listing a missing Azure container is not reported as NotFound
                if let Some((account, container)) = &location.azure {
                    if !account.container_exists(container).await? {
                        return Ok(Vec::new());
                    }
                }
                return Err(e.into());
            }
        };

        let mut names: Vec<String> = listing
            .objects
            .iter()
            .filter_map(|meta| meta.location.filename().map(str::to_string))
            .collect();
        names.sort();

        Ok(names)
    }

    async fn get_file_stream(
        &self,
        name: &str,
        container: Option<&str>,
    ) -> Result<Option<FileStream>> {
        let location = self.locate(container).await?;
        let path = location.file(name)?;

        let result = match location.store.get(&path).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let bytes = result.bytes().await?;

        tracing::debug!(key = %path, size = bytes.len(), "Downloaded blob");
        Ok(Some(Box::new(Cursor::new(bytes))))
    }

    async fn save_file_stream(
        &self,
        name: &str,
        container: Option<&str>,
        content: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<()> {
        let location = self.locate(container).await?;
        let path = location.file(name)?;

        let mut data = Vec::new();
        content.read_to_end(&mut data).await?;
        let size = data.len();

        if let Some((account, container)) = &location.azure {
            account.ensure_container(container).await?;
        }
        location.store.put(&path, data.into()).await?;

        tracing::info!(key = %path, size, "Uploaded blob");
        Ok(())
    }

    async fn delete_file(&self, name: &str, container: Option<&str>) -> Result<()> {
        let location = self.locate(container).await?;
        let path = location.file(name)?;

        match location.store.delete(&path).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
