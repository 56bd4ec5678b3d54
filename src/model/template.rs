use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entities::{ComposedLook, CustomActions, Features, FileEntry, ListInstance, Provider};

/// In-memory aggregate of a site's configuration
///
/// Handlers fill it during extraction and read from it during apply. Every
/// collection is always present, empty rather than missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    #[serde(default = "default_version")]
    pub version: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lists: Vec<ListInstance>,
    #[serde(default)]
    pub custom_actions: CustomActions,
    #[serde(default)]
    pub features: Features,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composed_look: Option<ComposedLook>,
    #[serde(default)]
    pub files: Vec<FileEntry>,
    #[serde(default)]
    pub providers: Vec<Provider>,
}

impl Template {
    pub fn new() -> Self {
        Self {
            id: format!("TEMPLATE-{}", Uuid::new_v4().simple()),
            version: default_version(),
            generated_at: None,
            lists: Vec::new(),
            custom_actions: CustomActions::default(),
            features: Features::default(),
            composed_look: None,
            files: Vec::new(),
            providers: Vec::new(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }

    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::new()
    }
}

fn default_version() -> f64 {
    1.0
}
