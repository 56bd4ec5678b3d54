//! Provisioning template model
//!
//! Only the identifying fields needed for existence checks and idempotent
//! apply are modelled; everything flows through [`Template`].

mod entities;
mod template;

pub use entities::{
    ActionScope, ComposedLook, CustomAction, CustomActions, Feature, FeatureScope, Features,
    FileEntry, ListInstance, Provider,
};
pub use template::Template;
