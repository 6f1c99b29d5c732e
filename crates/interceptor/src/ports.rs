//! Port traits: everything the interceptor consumes from its host.
//!
//! The interceptor defines *what* it needs here; hosting adapters (see the
//! `host` crate) define *how* to supply it. Nothing in this module performs
//! I/O of its own.
//!
//! | Trait | Role |
//! |-------|------|
//! | [`ServerTarget`] | A request-serving object: the primary target or an extension |
//! | [`RestRequestHandler`], [`WebRequestHandler`], [`RequestHandler`], [`RequestHandler2`] | One handler trait per capability |
//! | [`ConfigurationSource`] | Read-only access to the `ExtensionName` property |
//! | [`ExtensionLocator`] | Looks up an extension by type name |
//! | [`HostingSession`] | Supplies the above at initialization |

use std::sync::Arc;

use async_trait::async_trait;

use crate::capability::CapabilitySet;
use crate::errors::{ConfigurationError, HostError, LifecycleError};
use crate::identifiers::ExtensionName;
use crate::types::{RestRequest, RestResponse, WebRequest, WebResponse};

/// Configuration key naming the extension that should receive requests in
/// place of the primary target.
pub const EXTENSION_NAME_KEY: &str = "ExtensionName";

// ---------------------------------------------------------------------------
// Capability handlers
// ---------------------------------------------------------------------------

/// Handler for [`Capability::Rest`](crate::Capability::Rest).
///
/// `Ok(None)` is a legitimate "no payload" answer and is passed through to
/// callers unchanged.
#[async_trait]
pub trait RestRequestHandler: Send + Sync {
    /// Returns the REST schema of the service.
    async fn schema(&self) -> Result<Option<String>, HostError>;

    /// Serves a REST resource or operation request.
    async fn handle_rest_request(
        &self,
        request: &RestRequest,
    ) -> Result<Option<RestResponse>, HostError>;
}

/// Handler for [`Capability::Web`](crate::Capability::Web).
#[async_trait]
pub trait WebRequestHandler: Send + Sync {
    /// Serves an HTTP-like request.
    async fn handle_web_request(
        &self,
        request: &WebRequest,
    ) -> Result<Option<WebResponse>, HostError>;
}

/// Handler for [`Capability::LegacyRequest`](crate::Capability::LegacyRequest).
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Serves a string request.
    async fn handle_string_request(
        &self,
        capabilities: &str,
        request: &str,
    ) -> Result<Option<String>, HostError>;

    /// Serves a binary request without a capability qualifier.
    async fn handle_binary_request(&self, request: &[u8]) -> Result<Option<Vec<u8>>, HostError>;
}

/// Handler for [`Capability::BinaryRequest2`](crate::Capability::BinaryRequest2).
#[async_trait]
pub trait RequestHandler2: Send + Sync {
    /// Serves a capability-qualified binary request.
    async fn handle_binary_request2(
        &self,
        capabilities: &str,
        request: &[u8],
    ) -> Result<Option<Vec<u8>>, HostError>;
}

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// An object that can serve requests: the primary server object or an
/// extension.
///
/// A target reports the capabilities it supports through
/// [`capabilities`](Self::capabilities) and exposes each one through a
/// projection method. The projections default to `None`; implementers
/// override the ones they support, usually with `Some(self)`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use async_trait::async_trait;
/// use interceptor::{Capability, CapabilitySet, HostError};
/// use interceptor::ports::{RequestHandler2, ServerTarget};
///
/// struct Echo;
///
/// #[async_trait]
/// impl RequestHandler2 for Echo {
///     async fn handle_binary_request2(
///         &self,
///         _capabilities: &str,
///         request: &[u8],
///     ) -> Result<Option<Vec<u8>>, HostError> {
///         Ok(Some(request.to_vec()))
///     }
/// }
///
/// impl ServerTarget for Echo {
///     fn capabilities(&self) -> CapabilitySet {
///         CapabilitySet::of(Capability::BinaryRequest2)
///     }
///
///     fn as_request_handler2(self: Arc<Self>) -> Option<Arc<dyn RequestHandler2>> {
///         Some(self)
///     }
/// }
/// ```
pub trait ServerTarget: Send + Sync {
    /// The fixed set of capabilities this target supports.
    fn capabilities(&self) -> CapabilitySet;

    /// Projects this target onto [`RestRequestHandler`].
    fn as_rest_handler(self: Arc<Self>) -> Option<Arc<dyn RestRequestHandler>> {
        None
    }

    /// Projects this target onto [`WebRequestHandler`].
    fn as_web_handler(self: Arc<Self>) -> Option<Arc<dyn WebRequestHandler>> {
        None
    }

    /// Projects this target onto [`RequestHandler`].
    fn as_request_handler(self: Arc<Self>) -> Option<Arc<dyn RequestHandler>> {
        None
    }

    /// Projects this target onto [`RequestHandler2`].
    fn as_request_handler2(self: Arc<Self>) -> Option<Arc<dyn RequestHandler2>> {
        None
    }
}

// ---------------------------------------------------------------------------

/// The default request handler supplied by the hosting session.
///
/// Holds the REST view of the target, built once when the session is bound,
/// alongside the target itself. Fields are declared in release order.
pub struct PrimaryTarget {
    rest_view: Arc<dyn RestRequestHandler>,
    target: Arc<dyn ServerTarget>,
}

impl PrimaryTarget {
    /// Binds `target` as the primary target.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::PrimaryNotRestCapable`] if the target
    /// provides no REST handler.
    pub fn new(target: Arc<dyn ServerTarget>) -> Result<Self, LifecycleError> {
        let rest_view = Arc::clone(&target)
            .as_rest_handler()
            .ok_or(LifecycleError::PrimaryNotRestCapable)?;
        Ok(Self { rest_view, target })
    }

    /// The REST view built at initialization.
    pub fn rest_view(&self) -> &Arc<dyn RestRequestHandler> {
        &self.rest_view
    }

    /// The primary target itself.
    pub fn target(&self) -> &Arc<dyn ServerTarget> {
        &self.target
    }

    /// Capabilities advertised by the primary target.
    pub fn capabilities(&self) -> CapabilitySet {
        self.target.capabilities()
    }

    /// Drops this binding's REST view, then the target. `outstanding` counts
    /// references still held by callers of the public delegate accessors.
    pub(crate) fn release(self) {
        let Self { rest_view, target } = self;
        let outstanding = Arc::strong_count(&rest_view) - 1;
        drop(rest_view);
        tracing::trace!(outstanding, "dropped primary REST view");
        drop(target);
        tracing::trace!("dropped primary target");
    }
}

impl std::fmt::Debug for PrimaryTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimaryTarget")
            .field("capabilities", &self.capabilities())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------

/// A shared reference to an extension instance returned by an
/// [`ExtensionLocator`].
///
/// Cloning is cheap; clones refer to the same extension, which
/// [`ptr_eq`](Self::ptr_eq) can confirm.
#[derive(Clone)]
pub struct ExtensionHandle(Arc<dyn ServerTarget>);

impl ExtensionHandle {
    /// Wraps an extension instance.
    pub fn new(target: Arc<dyn ServerTarget>) -> Self {
        Self(target)
    }

    /// The extension instance.
    pub fn target(&self) -> &Arc<dyn ServerTarget> {
        &self.0
    }

    /// Capabilities advertised by the extension.
    pub fn capabilities(&self) -> CapabilitySet {
        self.0.capabilities()
    }

    /// Returns `true` if both handles refer to the same extension instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for ExtensionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ExtensionHandle")
            .field(&self.capabilities())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Host services
// ---------------------------------------------------------------------------

/// Read-only access to the host's configuration properties.
#[cfg_attr(test, mockall::automock)]
pub trait ConfigurationSource: Send + Sync {
    /// Reads the string property `key`.
    ///
    /// # Errors
    ///
    /// A missing key is `Ok(None)`. Returns a [`ConfigurationError`] only if
    /// the store cannot be read or the value is not a string.
    fn get(&self, key: &str) -> Result<Option<String>, ConfigurationError>;
}

/// Looks up extensions of the hosted server object by type name.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExtensionLocator: Send + Sync {
    /// Finds the extension registered under `name`.
    ///
    /// May be slow (an out-of-process call); no timeout is applied by the
    /// interceptor.
    ///
    /// # Errors
    ///
    /// Returns a [`HostError`] if the host lookup itself fails. An unknown
    /// name is `Ok(None)`.
    async fn find_extension_by_type_name(
        &self,
        name: &ExtensionName,
    ) -> Result<Option<ExtensionHandle>, HostError>;
}

/// The hosting environment an interceptor is bound to.
///
/// [`server_object`](Self::server_object) and
/// [`configuration`](Self::configuration) are called once, at
/// initialization. [`extension_locator`](Self::extension_locator) is called
/// on every cache miss.
pub trait HostingSession: Send + Sync {
    /// The primary server object.
    fn server_object(&self) -> Arc<dyn ServerTarget>;

    /// The configuration source holding `ExtensionName`.
    fn configuration(&self) -> Arc<dyn ConfigurationSource>;

    /// The locator used to find extensions by type name.
    fn extension_locator(&self) -> &dyn ExtensionLocator;
}
