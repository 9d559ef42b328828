//! Resource registry
//!
//! Maps orchestrator type names (`nextdns_allowlist`, ...) to their
//! handlers so a host can dispatch lifecycle calls without matching on
//! type names itself.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nextdns_core::ResourceRegistry;
//!
//! let registry = ResourceRegistry::with_defaults(api);
//! let handler = registry.resource("nextdns_denylist")?;
//! let imported = handler.import("abc123").await?;
//! ```
//!
//! ## Registration
//!
//! Additional handlers can be registered at runtime:
//!
//! ```rust,ignore
//! registry.register_resource(Arc::new(MyResource::new(api.clone())));
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{Error, Result};
use crate::resources::{
    DomainListResource, ParentalControlResource, PrivacyResource, ProfileResource,
    RewriteResource, SecurityResource, SettingsResource, SetupEndpointSource, SetupLinkedIpSource,
};
use crate::traits::{DataSourceHandler, NextDnsApi, ResourceHandler};

/// Registry of resource and data source handlers
///
/// ## Thread Safety
///
/// Interior mutability with RwLock: concurrent lookups, exclusive
/// registration. Handlers are handed out as `Arc`s so no lock is held
/// across a lifecycle call.
#[derive(Default)]
pub struct ResourceRegistry {
    resources: RwLock<HashMap<&'static str, Arc<dyn ResourceHandler>>>,
    data_sources: RwLock<HashMap<&'static str, Arc<dyn DataSourceHandler>>>,
}

impl ResourceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every NextDNS resource and data source, all sharing
    /// one API client
    pub fn with_defaults(api: Arc<dyn NextDnsApi>) -> Self {
        let registry = Self::new();
        registry.register_resource(Arc::new(ProfileResource::new(api.clone())));
        registry.register_resource(Arc::new(DomainListResource::allowlist(api.clone())));
        registry.register_resource(Arc::new(DomainListResource::denylist(api.clone())));
        registry.register_resource(Arc::new(ParentalControlResource::new(api.clone())));
        registry.register_resource(Arc::new(PrivacyResource::new(api.clone())));
        registry.register_resource(Arc::new(SecurityResource::new(api.clone())));
        registry.register_resource(Arc::new(RewriteResource::new(api.clone())));
        registry.register_resource(Arc::new(SettingsResource::new(api.clone())));
        registry.register_data_source(Arc::new(SetupEndpointSource::new(api.clone())));
        registry.register_data_source(Arc::new(SetupLinkedIpSource::new(api)));

        tracing::debug!(
            "Registered {} resources and {} data sources",
            registry.list_resources().len(),
            registry.list_data_sources().len()
        );
        registry
    }

    /// Register a resource handler under its type name
    ///
    /// A handler registered under an existing name replaces it.
    pub fn register_resource(&self, handler: Arc<dyn ResourceHandler>) {
        let mut resources = self
            .resources
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        resources.insert(handler.type_name(), handler);
    }

    /// Register a data source handler under its type name
    pub fn register_data_source(&self, handler: Arc<dyn DataSourceHandler>) {
        let mut sources = self
            .data_sources
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        sources.insert(handler.type_name(), handler);
    }

    /// Look up a resource handler
    ///
    /// # Returns
    ///
    /// - `Ok(handler)`: The registered handler
    /// - `Err(Error::Config)`: No resource registered under that name
    pub fn resource(&self, type_name: &str) -> Result<Arc<dyn ResourceHandler>> {
        let resources = self
            .resources
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        resources
            .get(type_name)
            .cloned()
            .ok_or_else(|| Error::config(format!("Unknown resource type: {}", type_name)))
    }

    /// Look up a data source handler
    pub fn data_source(&self, type_name: &str) -> Result<Arc<dyn DataSourceHandler>> {
        let sources = self
            .data_sources
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        sources
            .get(type_name)
            .cloned()
            .ok_or_else(|| Error::config(format!("Unknown data source type: {}", type_name)))
    }

    /// Registered resource type names, sorted
    pub fn list_resources(&self) -> Vec<&'static str> {
        let resources = self
            .resources
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<_> = resources.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Registered data source type names, sorted
    pub fn list_data_sources(&self) -> Vec<&'static str> {
        let sources = self
            .data_sources
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<_> = sources.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn has_resource(&self, type_name: &str) -> bool {
        let resources = self
            .resources
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        resources.contains_key(type_name)
    }

    pub fn has_data_source(&self, type_name: &str) -> bool {
        let sources = self
            .data_sources
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        sources.contains_key(type_name)
    }
}
