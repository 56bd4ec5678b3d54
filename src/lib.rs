pub mod config;
pub mod connectors;
pub mod conversion;
pub mod extensibility;
pub mod handlers;
pub mod model;
pub mod observability;
pub mod site;
