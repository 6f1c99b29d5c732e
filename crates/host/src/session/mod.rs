//! In-process hosting session.

use std::sync::Arc;

use interceptor::{ConfigurationSource, ExtensionLocator, HostingSession, ServerTarget};
use tracing::debug;

use crate::errors::HostAdapterError;
use crate::properties::PropertySet;
use crate::registry::ExtensionRegistry;

/// A hosting session assembled in-process.
///
/// Owns the primary server object, its [`PropertySet`] and the
/// [`ExtensionRegistry`]. The interceptor takes its own references to the
/// primary object and the properties at initialization; the session keeps
/// the registry for lookups.
pub struct InProcessSession {
    primary: Arc<dyn ServerTarget>,
    properties: Arc<PropertySet>,
    registry: Arc<ExtensionRegistry>,
}

impl InProcessSession {
    /// Starts building a session.
    #[must_use]
    pub fn builder() -> InProcessSessionBuilder {
        InProcessSessionBuilder::default()
    }

    /// The session's property set.
    pub fn properties(&self) -> &Arc<PropertySet> {
        &self.properties
    }

    /// The session's extension registry.
    pub fn registry(&self) -> &Arc<ExtensionRegistry> {
        &self.registry
    }
}

impl HostingSession for InProcessSession {
    fn server_object(&self) -> Arc<dyn ServerTarget> {
        Arc::clone(&self.primary)
    }

    fn configuration(&self) -> Arc<dyn ConfigurationSource> {
        Arc::clone(&self.properties) as Arc<dyn ConfigurationSource>
    }

    fn extension_locator(&self) -> &dyn ExtensionLocator {
        &*self.registry
    }
}

impl std::fmt::Debug for InProcessSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InProcessSession")
            .field("primary_capabilities", &self.primary.capabilities())
            .field("properties", &self.properties)
            .field("registry", &self.registry)
            .finish()
    }
}

/// Builder for [`InProcessSession`].
///
/// Properties and registry default to empty ones.
#[derive(Default)]
pub struct InProcessSessionBuilder {
    primary: Option<Arc<dyn ServerTarget>>,
    properties: Option<Arc<PropertySet>>,
    registry: Option<Arc<ExtensionRegistry>>,
}

impl InProcessSessionBuilder {
    /// Sets the primary server object. Required.
    #[must_use]
    pub fn primary(mut self, primary: Arc<dyn ServerTarget>) -> Self {
        self.primary = Some(primary);
        self
    }

    /// Sets the property set read for `ExtensionName`.
    #[must_use]
    pub fn properties(mut self, properties: Arc<PropertySet>) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Sets the registry extensions are looked up in.
    #[must_use]
    pub fn registry(mut self, registry: impl Into<Arc<ExtensionRegistry>>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    /// Builds the session.
    ///
    /// # Errors
    ///
    /// Returns [`HostAdapterError::MissingPrimary`] if no primary server
    /// object was set.
    pub fn build(self) -> Result<InProcessSession, HostAdapterError> {
        let primary = self.primary.ok_or(HostAdapterError::MissingPrimary)?;
        let properties = self.properties.unwrap_or_default();
        let registry = self.registry.unwrap_or_default();
        debug!(
            primary_capabilities = %primary.capabilities(),
            properties = properties.len(),
            extensions = registry.len(),
            "in-process session built"
        );
        Ok(InProcessSession {
            primary,
            properties,
            registry,
        })
    }
}

impl std::fmt::Debug for InProcessSessionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InProcessSessionBuilder")
            .field("has_primary", &self.primary.is_some())
            .field("properties", &self.properties)
            .field("registry", &self.registry)
            .finish()
    }
}
