use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::Result;

/// Caller-owned byte stream returned by [`FileConnector::get_file_stream`]
///
/// Dropping it releases the underlying handle.
pub type FileStream = Box<dyn AsyncRead + Send + Unpin>;

/// Uniform file storage contract implemented by every backend
///
/// `container` overrides the connector's configured default container for a
/// single call. Absent artifacts come back as `Ok(None)`; `Err` always means
/// the backend itself failed.
#[async_trait]
pub trait FileConnector: Send + Sync {
    /// Short backend label for logs and errors
    fn describe(&self) -> String;

    /// Read an artifact as UTF-8 text
    async fn get_file(&self, name: &str, container: Option<&str>) -> Result<Option<String>> {
        let Some(mut stream) = self.get_file_stream(name, container).await? else {
            return Ok(None);
        };
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await?;
        Ok(Some(String::from_utf8(buf)?))
    }

    /// Names of the artifacts directly inside the container, sorted
    async fn get_files(&self, container: Option<&str>) -> Result<Vec<String>>;

    async fn get_file_stream(&self, name: &str, container: Option<&str>)
    -> Result<Option<FileStream>>;

    /// Write an artifact, replacing any existing one with the same name
    async fn save_file_stream(
        &self,
        name: &str,
        container: Option<&str>,
        content: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<()>;

    /// Remove an artifact; removing an absent one succeeds
    async fn delete_file(&self, name: &str, container: Option<&str>) -> Result<()>;

    async fn save_file(&self, name: &str, container: Option<&str>, content: &[u8]) -> Result<()> {
        let mut reader = content;
        self.save_file_stream(name, container, &mut reader).await
    }

    /// Read an artifact fully into memory
    async fn get_file_bytes(&self, name: &str, container: Option<&str>) -> Result<Option<Vec<u8>>> {
        let Some(mut stream) = self.get_file_stream(name, container).await? else {
            return Ok(None);
        };
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await?;
        Ok(Some(buf))
    }
}

/// Artifact name plus optional container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    pub container: Option<String>,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            container: None,
        }
    }

    pub fn in_container(name: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            container: Some(container.into()),
        }
    }

    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }
}

impl FromStr for FileDescriptor {
    type Err = std::convert::Infallible;

    /// `"name"` or `"container/.../name"`; the last segment is the name
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim_end_matches(['/', '\\']);
        Ok(match trimmed.rsplit_once(['/', '\\']) {
            Some((container, name)) if !container.is_empty() => {
                FileDescriptor::in_container(name, container)
            }
            Some((_, name)) => FileDescriptor::new(name),
            None => FileDescriptor::new(trimmed),
        })
    }
}

impl fmt::Display for FileDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.container {
            Some(container) => write!(f, "{container}/{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}
