//! Template extraction and provisioning
//!
//! [`TemplateConverter`] threads a [`Template`](crate::model::Template)
//! through the object handlers. [`save_template`] and [`load_template`]
//! move the result through any [`FileConnector`](crate::connectors::FileConnector)
//! as JSON.

mod converter;
mod error;

pub use converter::{TemplateConverter, load_template, save_template};
pub use error::{ConversionError, Direction, Result};
