//! Object handlers
//!
//! Each handler owns one configuration domain of a site and works in two
//! directions: extraction reads the live site into a [`Template`], and
//! provisioning pushes the template back onto a (possibly different) site.
//!
//! ## Handlers
//!
//! - [`ListInstancesHandler`] - lists and libraries, matched by title
//! - [`CustomActionsHandler`] - site and web custom actions, matched by name
//! - [`FeaturesHandler`] - feature activation per scope
//! - [`ComposedLookHandler`] - site branding
//! - [`FilesHandler`] - files copied through an asset connector
//! - [`ExtensibilityHandler`] - provider callouts, apply only
//!
//! [`Template`]: crate::model::Template

mod composed_look;
mod custom_actions;
mod extensibility;
mod features;
mod files;
mod lists;
mod traits;

pub use composed_look::ComposedLookHandler;
pub use custom_actions::CustomActionsHandler;
pub use extensibility::ExtensibilityHandler;
pub use features::FeaturesHandler;
pub use files::FilesHandler;
pub use lists::ListInstancesHandler;
pub use traits::{HandlerError, ObjectHandler};
