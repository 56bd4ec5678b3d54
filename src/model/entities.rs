use bon::Builder;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// List (or document library) definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct ListInstance {
    #[builder(into)]
    pub title: String,
    #[serde(default)]
    #[builder(into, default)]
    pub description: String,
    /// Base template id (100 = generic list, 101 = document library)
    #[builder(default = 100)]
    pub template_type: u32,
    #[builder(into)]
    pub url: String,
    #[serde(default)]
    #[builder(default)]
    pub enable_versioning: bool,
    /// System lists are hidden and never extracted
    #[serde(default)]
    #[builder(default)]
    pub hidden: bool,
}

/// Where a custom action is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionScope {
    Site,
    Web,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct CustomAction {
    #[builder(into)]
    pub name: String,
    #[builder(into)]
    pub location: String,
    #[serde(default)]
    #[builder(into, default)]
    pub title: String,
    #[serde(default)]
    #[builder(default)]
    pub sequence: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub script_block: Option<String>,
    /// Permission mask required to see the action (0 = everyone)
    #[serde(default)]
    #[builder(default)]
    pub rights: u64,
}

/// Custom actions split by registration scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomActions {
    #[serde(default)]
    pub site_custom_actions: Vec<CustomAction>,
    #[serde(default)]
    pub web_custom_actions: Vec<CustomAction>,
}

impl CustomActions {
    pub fn scope(&self, scope: ActionScope) -> &[CustomAction] {
        match scope {
            ActionScope::Site => &self.site_custom_actions,
            ActionScope::Web => &self.web_custom_actions,
        }
    }

    pub fn scope_mut(&mut self, scope: ActionScope) -> &mut Vec<CustomAction> {
        match scope {
            ActionScope::Site => &mut self.site_custom_actions,
            ActionScope::Web => &mut self.web_custom_actions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.site_custom_actions.is_empty() && self.web_custom_actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.site_custom_actions.len() + self.web_custom_actions.len()
    }
}

/// Feature activation scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureScope {
    Site,
    Web,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub id: Uuid,
    /// When set, applying the template deactivates the feature instead
    #[serde(default)]
    pub deactivate: bool,
}

impl Feature {
    pub fn activate(id: Uuid) -> Self {
        Self { id, deactivate: false }
    }

    pub fn deactivate(id: Uuid) -> Self {
        Self { id, deactivate: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    #[serde(default)]
    pub site_features: Vec<Feature>,
    #[serde(default)]
    pub web_features: Vec<Feature>,
}

impl Features {
    pub fn scope(&self, scope: FeatureScope) -> &[Feature] {
        match scope {
            FeatureScope::Site => &self.site_features,
            FeatureScope::Web => &self.web_features,
        }
    }

    pub fn scope_mut(&mut self, scope: FeatureScope) -> &mut Vec<Feature> {
        match scope {
            FeatureScope::Site => &mut self.site_features,
            FeatureScope::Web => &mut self.web_features,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.site_features.is_empty() && self.web_features.is_empty()
    }
}

/// Site branding: theme files plus master page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedLook {
    pub name: String,
    #[serde(default)]
    pub color_file: Option<String>,
    #[serde(default)]
    pub font_file: Option<String>,
    #[serde(default)]
    pub background_file: Option<String>,
    #[serde(default)]
    pub master_page: Option<String>,
    #[serde(default)]
    pub version: u32,
}

/// A file to be uploaded to the site
///
/// `src` names the asset inside the template's asset connector, `folder` is
/// the target `"library[/sub-folder...]"` path on the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub src: String,
    pub folder: String,
    #[serde(default)]
    pub overwrite: bool,
}

/// Extensibility registration carried by a template
///
/// The identifier is only looked up when the provider is executed, so a
/// template naming an unavailable provider still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    #[serde(default)]
    pub configuration: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Provider {
    pub fn new(id: impl Into<String>, configuration: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            configuration: configuration.into(),
            enabled: true,
        }
    }
}

fn default_enabled() -> bool {
    true
}
