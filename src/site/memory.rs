use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::traits::{DocumentLibrary, FolderRef, Result, Site, SiteError};
use crate::model::{ActionScope, ComposedLook, CustomAction, FeatureScope, ListInstance};

/// List template id of a document library
pub const DOCUMENT_LIBRARY_TEMPLATE: u32 = 101;

#[derive(Debug, Default)]
struct SiteState {
    lists: Vec<ListInstance>,
    site_actions: Vec<CustomAction>,
    web_actions: Vec<CustomAction>,
    site_features: BTreeSet<Uuid>,
    web_features: BTreeSet<Uuid>,
    composed_look: Option<ComposedLook>,
    /// library title -> root folder url
    libraries: BTreeMap<String, String>,
    /// folder url -> files
    folders: BTreeMap<String, BTreeMap<String, Bytes>>,
}

impl SiteState {
    fn actions(&self, scope: ActionScope) -> &Vec<CustomAction> {
        match scope {
            ActionScope::Site => &self.site_actions,
            ActionScope::Web => &self.web_actions,
        }
    }

    fn actions_mut(&mut self, scope: ActionScope) -> &mut Vec<CustomAction> {
        match scope {
            ActionScope::Site => &mut self.site_actions,
            ActionScope::Web => &mut self.web_actions,
        }
    }

    fn features(&self, scope: FeatureScope) -> &BTreeSet<Uuid> {
        match scope {
            FeatureScope::Site => &self.site_features,
            FeatureScope::Web => &self.web_features,
        }
    }

    fn features_mut(&mut self, scope: FeatureScope) -> &mut BTreeSet<Uuid> {
        match scope {
            FeatureScope::Site => &mut self.site_features,
            FeatureScope::Web => &mut self.web_features,
        }
    }

    fn insert_list(&mut self, list: ListInstance) {
        if list.template_type == DOCUMENT_LIBRARY_TEMPLATE {
            let root = format!("/{}", list.url.trim_matches('/'));
            self.folders.entry(root.clone()).or_default();
            self.libraries.insert(list.title.clone(), root);
        }
        self.lists.push(list);
    }
}

/// In-memory site for tests and local development
///
/// Implements the full [`Site`] surface over a lock-protected state. The
/// `offline` switch makes every call fail with [`SiteError::Unavailable`],
/// which is how transport failures are simulated.
#[derive(Debug)]
pub struct InMemorySite {
    url: String,
    state: RwLock<SiteState>,
    offline: AtomicBool,
    activations: AtomicUsize,
}

impl InMemorySite {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: RwLock::new(SiteState::default()),
            offline: AtomicBool::new(false),
            activations: AtomicUsize::new(0),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of successful feature activations so far
    pub fn activation_count(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }

    pub async fn add_list(&self, list: ListInstance) {
        self.state.write().await.insert_list(list);
    }

    /// Create a document library whose root folder url is `/<title>`
    pub async fn add_library(&self, title: &str) {
        let list = ListInstance::builder()
            .title(title)
            .url(title)
            .template_type(DOCUMENT_LIBRARY_TEMPLATE)
            .build();
        self.add_list(list).await;
    }

    pub async fn add_custom_action_unchecked(&self, scope: ActionScope, action: CustomAction) {
        self.state.write().await.actions_mut(scope).push(action);
    }

    pub async fn activate_unchecked(&self, scope: FeatureScope, id: Uuid) {
        self.state.write().await.features_mut(scope).insert(id);
    }

    pub async fn set_look_unchecked(&self, look: ComposedLook) {
        self.state.write().await.composed_look = Some(look);
    }

    /// Whether a folder with the given server-relative url exists
    pub async fn folder_exists(&self, url: &str) -> bool {
        self.state.read().await.folders.contains_key(url)
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SiteError::Unavailable(self.url.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentLibrary for InMemorySite {
    async fn root_folder(&self, library: &str) -> Result<Option<FolderRef>> {
        self.check_online()?;
        let state = self.state.read().await;
        Ok(state.libraries.get(library).cloned().map(FolderRef))
    }

    async fn sub_folder(&self, parent: &FolderRef, name: &str) -> Result<Option<FolderRef>> {
        self.check_online()?;
        let child = parent.child(name);
        let state = self.state.read().await;
        Ok(state.folders.contains_key(child.url()).then_some(child))
    }

    async fn create_folder(&self, parent: &FolderRef, name: &str) -> Result<FolderRef> {
        self.check_online()?;
        let mut state = self.state.write().await;
        if !state.folders.contains_key(parent.url()) {
            return Err(SiteError::Request(format!(
                "parent folder {} does not exist",
                parent.url()
            )));
        }
        let child = parent.child(name);
        state.folders.entry(child.url().to_string()).or_default();
        Ok(child)
    }

    async fn folder_files(&self, folder: &FolderRef) -> Result<Vec<String>> {
        self.check_online()?;
        let state = self.state.read().await;
        Ok(state
            .folders
            .get(folder.url())
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn read_file(&self, folder: &FolderRef, name: &str) -> Result<Option<Bytes>> {
        self.check_online()?;
        let state = self.state.read().await;
        Ok(state
            .folders
            .get(folder.url())
            .and_then(|files| files.get(name))
            .cloned())
    }

    async fn upload_file(&self, folder: &FolderRef, name: &str, content: Bytes) -> Result<()> {
        self.check_online()?;
        let mut state = self.state.write().await;
        let files = state.folders.get_mut(folder.url()).ok_or_else(|| {
            SiteError::Request(format!("folder {} does not exist", folder.url()))
        })?;
        files.insert(name.to_string(), content);
        Ok(())
    }

    async fn delete_file(&self, folder: &FolderRef, name: &str) -> Result<bool> {
        self.check_online()?;
        let mut state = self.state.write().await;
        Ok(state
            .folders
            .get_mut(folder.url())
            .and_then(|files| files.remove(name))
            .is_some())
    }
}

#[async_trait]
impl Site for InMemorySite {
    fn url(&self) -> &str {
        &self.url
    }

    async fn lists(&self) -> Result<Vec<ListInstance>> {
        self.check_online()?;
        Ok(self.state.read().await.lists.clone())
    }

    async fn list_exists(&self, title: &str) -> Result<bool> {
        self.check_online()?;
        let state = self.state.read().await;
        Ok(state.lists.iter().any(|l| l.title.eq_ignore_ascii_case(title)))
    }

    async fn create_list(&self, list: &ListInstance) -> Result<()> {
        self.check_online()?;
        let mut state = self.state.write().await;
        if state.lists.iter().any(|l| l.title.eq_ignore_ascii_case(&list.title)) {
            return Err(SiteError::Conflict(format!("list {} already exists", list.title)));
        }
        state.insert_list(list.clone());
        Ok(())
    }

    async fn custom_actions(&self, scope: ActionScope) -> Result<Vec<CustomAction>> {
        self.check_online()?;
        Ok(self.state.read().await.actions(scope).clone())
    }

    async fn custom_action_exists(&self, scope: ActionScope, name: &str) -> Result<bool> {
        self.check_online()?;
        let state = self.state.read().await;
        Ok(state.actions(scope).iter().any(|a| a.name == name))
    }

    async fn add_custom_action(&self, scope: ActionScope, action: &CustomAction) -> Result<()> {
        self.check_online()?;
        self.state.write().await.actions_mut(scope).push(action.clone());
        Ok(())
    }

    async fn active_features(&self, scope: FeatureScope) -> Result<Vec<Uuid>> {
        self.check_online()?;
        Ok(self.state.read().await.features(scope).iter().copied().collect())
    }

    async fn is_feature_active(&self, scope: FeatureScope, id: Uuid) -> Result<bool> {
        self.check_online()?;
        Ok(self.state.read().await.features(scope).contains(&id))
    }

    async fn activate_feature(&self, scope: FeatureScope, id: Uuid) -> Result<()> {
        self.check_online()?;
        let mut state = self.state.write().await;
        if !state.features_mut(scope).insert(id) {
            return Err(SiteError::Conflict(format!("feature {id} is already active")));
        }
        self.activations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn deactivate_feature(&self, scope: FeatureScope, id: Uuid) -> Result<()> {
        self.check_online()?;
        if !self.state.write().await.features_mut(scope).remove(&id) {
            return Err(SiteError::Request(format!("feature {id} is not active")));
        }
        Ok(())
    }

    async fn composed_look(&self) -> Result<Option<ComposedLook>> {
        self.check_online()?;
        Ok(self.state.read().await.composed_look.clone())
    }

    async fn set_composed_look(&self, look: &ComposedLook) -> Result<()> {
        self.check_online()?;
        self.state.write().await.composed_look = Some(look.clone());
        Ok(())
    }
}
