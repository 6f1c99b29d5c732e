//! Extension registry.
//!
//! The [`ExtensionRegistry`] holds the extension instances of a hosted server
//! object keyed by type name, and serves them to the interceptor as its
//! [`ExtensionLocator`]. Duplicate registrations for the same name are
//! rejected.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use interceptor::{ExtensionHandle, ExtensionLocator, ExtensionName, HostError, ServerTarget};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::errors::HostAdapterError;

/// Registry of extension instances.
///
/// Registration and lookup both take `&self`, so extensions can be added
/// after the registry has been handed to a session.
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    extensions: RwLock<HashMap<ExtensionName, ExtensionHandle>>,
}

impl ExtensionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `extension` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`HostAdapterError::DuplicateExtension`] if an extension with
    /// the same name is already registered. The existing registration is kept.
    pub fn register(
        &self,
        name: ExtensionName,
        extension: Arc<dyn ServerTarget>,
    ) -> Result<ExtensionHandle, HostAdapterError> {
        let mut extensions = self.extensions.write();
        if extensions.contains_key(&name) {
            return Err(HostAdapterError::DuplicateExtension { name });
        }
        let handle = ExtensionHandle::new(extension);
        info!(extension = %name, capabilities = %handle.capabilities(), "extension registered");
        extensions.insert(name, handle.clone());
        Ok(handle)
    }

    /// Removes the extension registered under `name`.
    ///
    /// Interceptors that already cached the extension keep using it.
    pub fn unregister(&self, name: &ExtensionName) -> Option<ExtensionHandle> {
        let removed = self.extensions.write().remove(name);
        if removed.is_some() {
            info!(extension = %name, "extension unregistered");
        }
        removed
    }

    /// Looks up an extension by name.
    #[must_use]
    pub fn get(&self, name: &ExtensionName) -> Option<ExtensionHandle> {
        self.extensions.read().get(name).cloned()
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<ExtensionName> {
        let mut names: Vec<ExtensionName> = self.extensions.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered extensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.extensions.read().len()
    }

    /// Returns `true` if no extension is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.read().is_empty()
    }
}

#[async_trait]
impl ExtensionLocator for ExtensionRegistry {
    async fn find_extension_by_type_name(
        &self,
        name: &ExtensionName,
    ) -> Result<Option<ExtensionHandle>, HostError> {
        let found = self.get(name);
        debug!(extension = %name, found = found.is_some(), "extension lookup");
        Ok(found)
    }
}
