use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};

use super::config::{CONNECTION_STRING, CONTAINER, ConnectorConfig};
use super::error::Result;
use super::path::{segments, validate_name};
use super::traits::{FileConnector, FileStream};

/// Connector over a local directory tree
///
/// The connection string is the root directory; containers are directories
/// relative to it (or absolute paths). An unset default container means the
/// root itself.
#[derive(Debug, Clone, Default)]
pub struct FileSystemConnector {
    config: ConnectorConfig,
}

impl FileSystemConnector {
    pub fn new(root: impl Into<String>, container: impl Into<String>) -> Self {
        let root: String = root.into();
        let container: String = container.into();
        let config = ConnectorConfig::new()
            .with(CONNECTION_STRING, root)
            .with(CONTAINER, container);
        Self { config }
    }

    pub fn from_config(config: ConnectorConfig) -> Self {
        Self { config }
    }

    pub fn config_mut(&mut self) -> &mut ConnectorConfig {
        &mut self.config
    }

    fn directory(&self, container: Option<&str>) -> Result<PathBuf> {
        let root = self.config.require_connection_string()?;
        let container = container
            .or(self.config.container.as_deref())
            .unwrap_or_default();

        if Path::new(container).is_absolute() {
            return Ok(PathBuf::from(container));
        }

        let mut dir = PathBuf::from(root);
        dir.extend(segments(container));
        Ok(dir)
    }
}

#[async_trait]
impl FileConnector for FileSystemConnector {
    fn describe(&self) -> String {
        format!(
            "filesystem({})",
            self.config.connection_string.as_deref().unwrap_or("<unset>")
        )
    }

    async fn get_files(&self, container: Option<&str>) -> Result<Vec<String>> {
        let dir = self.directory(container)?;

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => tracing::warn!(name = ?raw, "Skipping non UTF-8 file name"),
            }
        }
        names.sort();

        Ok(names)
    }

    async fn get_file_stream(
        &self,
        name: &str,
        container: Option<&str>,
    ) -> Result<Option<FileStream>> {
        let path = self.directory(container)?.join(validate_name(name)?);

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        match fs::File::open(&path).await {
            Ok(file) => Ok(Some(Box::new(file))),
            // removed between the metadata check and the open
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save_file_stream(
        &self,
        name: &str,
        container: Option<&str>,
        content: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<()> {
        let name = validate_name(name)?;
        let dir = self.directory(container)?;
        fs::create_dir_all(&dir).await?;

        let path = dir.join(name);
        let mut file = fs::File::create(&path).await?;
        let size = tokio::io::copy(content, &mut file).await?;
        file.flush().await?;

        tracing::info!(path = %path.display(), size, "Saved file");
        Ok(())
    }

    async fn delete_file(&self, name: &str, container: Option<&str>) -> Result<()> {
        let path = self.directory(container)?.join(validate_name(name)?);

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Deleted file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::ConnectorError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_and_get_in_container() {
        let temp_dir = TempDir::new().unwrap();
        let connector = FileSystemConnector::new(temp_dir.path().to_str().unwrap(), "");

        connector.save_file("a.txt", Some("X"), b"hello").await.unwrap();

        assert_eq!(
            connector.get_file("a.txt", Some("X")).await.unwrap().as_deref(),
            Some("hello")
        );
        assert_eq!(connector.get_files(Some("X")).await.unwrap(), vec!["a.txt"]);
        assert!(temp_dir.path().join("X").join("a.txt").exists());
    }

    #[tokio::test]
    async fn test_nested_container_with_backslashes() {
        let temp_dir = TempDir::new().unwrap();
        let connector = FileSystemConnector::new(temp_dir.path().to_str().unwrap(), "wrong");

        connector
            .save_file("blabla.png", Some(r"Resources\Templates"), &[1, 2, 3])
            .await
            .unwrap();

        assert!(temp_dir.path().join("Resources/Templates/blabla.png").exists());
        assert!(connector.get_file_stream("blabla.png", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_listing_skips_directories() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("Templates/sub")).unwrap();
        std::fs::write(temp_dir.path().join("Templates/b.xml"), "b").unwrap();
        std::fs::write(temp_dir.path().join("Templates/a.xml"), "a").unwrap();
        std::fs::write(temp_dir.path().join("Templates/sub/c.xml"), "c").unwrap();

        let connector = FileSystemConnector::new(temp_dir.path().to_str().unwrap(), "Templates");

        assert_eq!(connector.get_files(None).await.unwrap(), vec!["a.xml", "b.xml"]);
        assert!(connector.get_file("sub", None).await.unwrap().is_none());
        assert!(connector.get_files(Some("missing")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_absolute_container_overrides_root() {
        let root = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        std::fs::write(elsewhere.path().join("x.txt"), "x").unwrap();

        let connector = FileSystemConnector::new(root.path().to_str().unwrap(), "");
        let content = connector
            .get_file("x.txt", elsewhere.path().to_str())
            .await
            .unwrap();

        assert_eq!(content.as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn test_missing_root_reported_on_first_use() {
        let connector = FileSystemConnector::default();

        let err = connector.get_files(None).await.unwrap_err();
        assert!(matches!(err, ConnectorError::NotConfigured { key: CONNECTION_STRING }));
    }

    #[tokio::test]
    async fn test_config_populated_after_construction() {
        let temp_dir = TempDir::new().unwrap();
        let mut connector = FileSystemConnector::default();
        connector
            .config_mut()
            .set(CONNECTION_STRING, temp_dir.path().to_str().unwrap())
            .set(CONTAINER, "Templates");

        connector.save_file("t.json", None, b"{}").await.unwrap();
        assert!(temp_dir.path().join("Templates/t.json").exists());
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let connector = FileSystemConnector::new(temp_dir.path().to_str().unwrap(), "");
        connector.save_file("bin", None, &[0xff, 0xfe]).await.unwrap();

        let err = connector.get_file("bin", None).await.unwrap_err();
        assert!(matches!(err, ConnectorError::Decode(_)));
    }
}
