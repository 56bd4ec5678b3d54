use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::traits::{HandlerError, ObjectHandler};
use crate::connectors::library::{ensure_folder, resolve_folder};
use crate::connectors::{FileConnector, FileDescriptor, LibraryPath};
use crate::model::{FileEntry, Template};
use crate::site::Site;

/// Files uploaded into site document libraries
///
/// File contents travel next to the template: extraction copies each
/// captured file into the asset connector under `"<folder>/<name>"` and
/// records that path as the entry's `src`; provisioning reads it back from
/// the same place.
#[derive(Clone, Default)]
pub struct FilesHandler {
    assets: Option<Arc<dyn FileConnector>>,
    folders: Vec<String>,
}

impl fmt::Debug for FilesHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilesHandler")
            .field("assets", &self.assets.as_ref().map(|a| a.describe()))
            .field("folders", &self.folders)
            .finish()
    }
}

impl FilesHandler {
    pub fn new(assets: Arc<dyn FileConnector>) -> Self {
        Self {
            assets: Some(assets),
            folders: Vec::new(),
        }
    }

    /// Site folders (`"library[/folder...]"`) captured during extraction
    pub fn with_folders<I, S>(mut self, folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.folders = folders.into_iter().map(Into::into).collect();
        self
    }

    fn assets(&self, operation: &'static str) -> Result<&Arc<dyn FileConnector>, HandlerError> {
        self.assets.as_ref().ok_or(HandlerError::Unsupported {
            handler: "files",
            operation,
        })
    }
}

#[async_trait]
impl ObjectHandler for FilesHandler {
    fn name(&self) -> &'static str {
        "files"
    }

    async fn create_entities(
        &self,
        site: &dyn Site,
        mut template: Template,
    ) -> Result<Template, HandlerError> {
        if self.folders.is_empty() {
            return Ok(template);
        }
        let assets = self.assets("extraction without an asset connector")?;

        for folder in &self.folders {
            let path = LibraryPath::parse(folder)?;
            let Some(site_folder) = resolve_folder(site, &path).await? else {
                warn!(folder = %path, "Folder not found on site, skipping");
                continue;
            };
            let folder = path.to_string();

            for name in site.folder_files(&site_folder).await? {
                let Some(content) = site.read_file(&site_folder, &name).await? else {
                    continue;
                };
                assets.save_file(&name, Some(folder.as_str()), &content).await?;

                let src = format!("{folder}/{name}");
                debug!(src = %src, bytes = content.len(), "Captured file");
                if !template.files.iter().any(|f| f.src == src && f.folder == folder) {
                    template.files.push(FileEntry {
                        src,
                        folder: folder.clone(),
                        overwrite: true,
                    });
                }
            }
        }
        Ok(template)
    }

    async fn provision_objects(
        &self,
        site: &dyn Site,
        template: &Template,
    ) -> Result<(), HandlerError> {
        if template.files.is_empty() {
            return Ok(());
        }
        let assets = self.assets("provisioning without an asset connector")?;

        for entry in &template.files {
            let asset: FileDescriptor = entry.src.parse().unwrap_or_else(|e| match e {});
            let path = LibraryPath::parse(&entry.folder)?;
            let folder = ensure_folder(site, &path).await?;

            if !entry.overwrite && site.read_file(&folder, &asset.name).await?.is_some() {
                debug!(name = %asset.name, folder = %path, "File exists, skipping");
                continue;
            }

            let content = assets
                .get_file_bytes(&asset.name, asset.container())
                .await?
                .ok_or_else(|| HandlerError::MissingAsset {
                    name: entry.src.clone(),
                })?;

            site.upload_file(&folder, &asset.name, Bytes::from(content)).await?;
            info!(name = %asset.name, folder = %path, "Uploaded file");
        }
        Ok(())
    }
}
