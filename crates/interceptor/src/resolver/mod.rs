//! Delegate resolution.
//!
//! [`DelegateResolver::resolve`] decides, for one capability, which target
//! serves the next request:
//!
//! 1. Read `ExtensionName`. A read failure counts as "not configured".
//! 2. Not configured: the primary target, if it supports the capability
//!    (REST always resolves to the primary's REST view).
//! 3. Configured and cached: the cached extension, projected for the
//!    capability without consulting its capability set again.
//! 4. Configured, not cached: ask the locator. A found extension that
//!    advertises the capability is cached and returned. An unknown name or a
//!    capability mismatch yields `None` and caches nothing.
//!
//! Only locator failures are returned as errors.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::cache::DelegateCache;
use crate::capability::CapabilityKind;
use crate::errors::{HostError, LifecycleError};
use crate::identifiers::ExtensionName;
use crate::ports::{
    ConfigurationSource, ExtensionHandle, HostingSession, PrimaryTarget, EXTENSION_NAME_KEY,
};


/// Resolves delegates for one bound hosting session.
///
/// Owns every resource acquired from the session. Fields are declared in
/// release order.
pub struct DelegateResolver {
    primary: PrimaryTarget,
    session: Arc<dyn HostingSession>,
    configuration: Arc<dyn ConfigurationSource>,
    cache: DelegateCache,
}

impl DelegateResolver {
    /// Acquires the primary target and configuration source from `session`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::PrimaryNotRestCapable`] if the session's
    /// server object has no REST handler.
    pub fn new(session: Arc<dyn HostingSession>) -> Result<Self, LifecycleError> {
        let primary = PrimaryTarget::new(session.server_object())?;
        let configuration = session.configuration();
        Ok(Self {
            primary,
            session,
            configuration,
            cache: DelegateCache::new(),
        })
    }

    /// The primary target.
    pub fn primary(&self) -> &PrimaryTarget {
        &self.primary
    }

    /// The delegate cache.
    pub fn cache(&self) -> &DelegateCache {
        &self.cache
    }

    /// Resolves the delegate for capability `K`.
    ///
    /// Returns `Ok(None)` when no target can serve the capability.
    ///
    /// # Errors
    ///
    /// Returns the locator's [`HostError`] unchanged if the extension lookup
    /// fails. Nothing is cached in that case.
    pub async fn resolve<K: CapabilityKind>(&self) -> Result<Option<Arc<K::Handler>>, HostError> {
        let capability = K::CAPABILITY;

        let Some(name) = self.configured_extension() else {
            let delegate = K::project_primary(&self.primary);
            if delegate.is_none() {
                debug!(%capability, "primary target does not support capability");
            }
            return Ok(delegate);
        };

        if let Some(handle) = self.cache.get(&name) {
            trace!(extension = %name, %capability, "delegate cache hit");
            return Ok(project_extension::<K>(&name, &handle));
        }

        let Some(handle) = self
            .session
            .extension_locator()
            .find_extension_by_type_name(&name)
            .await?
        else {
            debug!(extension = %name, %capability, "extension not found");
            return Ok(None);
        };

        if !handle.capabilities().supports(capability) {
            debug!(
                extension = %name,
                %capability,
                supported = %handle.capabilities(),
                "extension does not support capability"
            );
            return Ok(None);
        }

        let cached = self.cache.insert_if_absent(name.clone(), handle);
        debug!(extension = %name, %capability, "extension resolved and cached");
        Ok(project_extension::<K>(&name, &cached))
    }

    /// Reads `ExtensionName`, treating any read failure as "not configured".
    fn configured_extension(&self) -> Option<ExtensionName> {
        match self.configuration.get(EXTENSION_NAME_KEY) {
            Ok(value) => value.and_then(ExtensionName::new),
            Err(err) => {
                debug!(error = %err, "extension name unavailable; using primary target");
                None
            }
        }
    }

    /// Releases every held resource in order: the primary REST view, the
    /// primary target, the hosting session, the configuration source, then
    /// the cached extensions.
    pub(crate) fn release(self) {
        let Self {
            primary,
            session,
            configuration,
            cache,
        } = self;
        primary.release();
        drop(session);
        trace!("released hosting session");
        drop(configuration);
        trace!("released configuration source");
        let cached = cache.len();
        drop(cache);
        trace!(cached, "released delegate cache");
    }
}

impl std::fmt::Debug for DelegateResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelegateResolver")
            .field("primary", &self.primary)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

fn project_extension<K: CapabilityKind>(
    name: &ExtensionName,
    handle: &ExtensionHandle,
) -> Option<Arc<K::Handler>> {
    let delegate = K::project(Arc::clone(handle.target()));
    if delegate.is_none() {
        debug!(
            extension = %name,
            capability = %K::CAPABILITY,
            "extension provides no handler for capability"
        );
    }
    delegate
}
