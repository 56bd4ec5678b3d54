//! Extensibility providers
//!
//! Templates can name providers by identifier. At apply time the
//! [`ExtensibilityManager`] resolves each one through the
//! [`ProviderRegistry`] and invokes it, isolating failures per provider.
//!
//! ```rust,ignore
//! let mut registry = ProviderRegistry::new();
//! registry.register_instance("contoso.branding", Arc::new(BrandingProvider));
//!
//! let manager = ExtensibilityManager::new(registry);
//! let report = manager.execute_all(&site, &template).await;
//! ```

mod manager;
mod registry;

pub use manager::{CalloutFailure, CalloutReport, ExtensibilityManager};
pub use registry::{
    ExtensibilityError, ExtensibilityProvider, ProviderError, ProviderFactory, ProviderRegistry,
};
