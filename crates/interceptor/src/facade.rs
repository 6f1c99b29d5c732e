//! The interceptor façade.
//!
//! [`Interceptor`] implements every capability handler trait. Each call
//! resolves a delegate for the matching capability and forwards its arguments
//! unchanged; the delegate's result (payload, empty payload, or error) comes
//! back unchanged. When no delegate can serve the capability the call returns
//! `Ok(None)`.
//!
//! | Operation | Capability |
//! |-----------|------------|
//! | `schema`, `handle_rest_request` | `Rest` |
//! | `handle_web_request` | `Web` |
//! | `handle_string_request`, `handle_binary_request` | `LegacyRequest` |
//! | `handle_binary_request2` | `BinaryRequest2` |
//!
//! Since the façade is itself a [`ServerTarget`] advertising all four
//! capabilities, interceptors can be stacked.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::field::Empty;
use tracing::{debug, info, instrument, warn, Span};

use crate::cache::CacheEntrySummary;
use crate::capability::{
    BinaryRequest2Kind, CapabilityKind, CapabilitySet, LegacyRequestKind, RestKind, WebKind,
};
use crate::errors::{HostError, LifecycleError};
use crate::identifiers::SessionId;
use crate::lifecycle::{BoundSession, InterceptorHooks, LifecyclePhase, LifecycleState};
use crate::ports::{
    HostingSession, RequestHandler, RequestHandler2, RestRequestHandler, ServerTarget,
    WebRequestHandler,
};
use crate::resolver::DelegateResolver;
use crate::types::{RestRequest, RestResponse, WebRequest, WebResponse};


/// Forwards requests to the primary server object or the configured
/// extension.
///
/// Shared between request workers behind an [`Arc`]; every method takes
/// `&self`.
pub struct Interceptor<H> {
    hooks: H,
    state: RwLock<LifecycleState>,
}

impl<H: InterceptorHooks> Interceptor<H> {
    /// Creates an uninitialized interceptor.
    pub fn new(hooks: H) -> Self {
        Self {
            hooks,
            state: RwLock::new(LifecycleState::Uninitialized),
        }
    }

    /// The implementer hooks.
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// The current lifecycle phase.
    pub fn phase(&self) -> LifecyclePhase {
        self.state.read().phase()
    }

    /// The id of the bound hosting session, while initialized.
    pub fn session_id(&self) -> Option<SessionId> {
        self.bound().map(|bound| bound.id)
    }

    /// Binds the interceptor to `session`.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::AlreadyInitialized`] if this is not the first call.
    /// - [`LifecycleError::PrimaryNotRestCapable`] if the session's server
    ///   object has no REST handler. The interceptor stays uninitialized.
    pub fn initialize(&self, session: Arc<dyn HostingSession>) -> Result<SessionId, LifecycleError> {
        if !matches!(*self.state.read(), LifecycleState::Uninitialized) {
            return Err(LifecycleError::AlreadyInitialized);
        }

        // Host code runs with no lock held; it may call back into the interceptor.
        let resolver = DelegateResolver::new(session)?;

        let mut state = self.state.write();
        if !matches!(*state, LifecycleState::Uninitialized) {
            return Err(LifecycleError::AlreadyInitialized);
        }
        let id = SessionId::new_random();
        info!(
            session = %id,
            primary_capabilities = %resolver.primary().capabilities(),
            "interceptor initialized"
        );
        *state = LifecycleState::Initialized(Arc::new(BoundSession { id, resolver }));
        Ok(id)
    }

    /// Runs the teardown hook, then releases every host resource.
    ///
    /// Resources are released even when the hook fails; the hook's error is
    /// then returned as [`LifecycleError::Teardown`].
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::NotInitialized`] if the interceptor is not
    ///   initialized. Nothing is released.
    /// - [`LifecycleError::Teardown`] if the hook failed.
    pub async fn shutdown(&self) -> Result<(), LifecycleError> {
        let bound = {
            let mut state = self.state.write();
            match std::mem::replace(&mut *state, LifecycleState::ShuttingDown) {
                LifecycleState::Initialized(bound) => bound,
                other => {
                    *state = other;
                    return Err(LifecycleError::NotInitialized);
                }
            }
        };
        let id = bound.id;
        info!(session = %id, "interceptor shutting down");

        let teardown = self.hooks.pre_shutdown().await;
        if let Err(err) = &teardown {
            warn!(session = %id, error = %err, "pre-shutdown teardown failed; releasing resources");
        }

        bound.release();
        *self.state.write() = LifecycleState::Released;
        info!(session = %id, "interceptor released");

        teardown.map_err(|source| LifecycleError::Teardown { source })
    }

    /// Resolves the delegate that would serve capability `K` right now.
    ///
    /// Outside the initialized phase no delegate is resolved. The returned
    /// handler does not keep the hosting session bound; the request methods of
    /// the interceptor itself do.
    ///
    /// # Errors
    ///
    /// Returns the extension locator's [`HostError`] unchanged.
    pub async fn delegate<K: CapabilityKind>(&self) -> Result<Option<Arc<K::Handler>>, HostError> {
        Ok(self.dispatch::<K>().await?.map(|dispatch| dispatch.handler))
    }

    /// Resolves the delegate for `K` together with the session it came from.
    async fn dispatch<K: CapabilityKind>(
        &self,
    ) -> Result<Option<Dispatch<K::Handler>>, HostError> {
        let Some(bound) = self.bound() else {
            warn!(
                phase = %self.phase(),
                capability = %K::CAPABILITY,
                "request received outside an initialized session; not handled"
            );
            return Ok(None);
        };
        Span::current().record("session", tracing::field::display(bound.id));
        let Some(handler) = bound.resolver.resolve::<K>().await? else {
            debug!(session = %bound.id, capability = %K::CAPABILITY, "no delegate; request not handled");
            return Ok(None);
        };
        Ok(Some(Dispatch {
            handler,
            _bound: bound,
        }))
    }

    /// Resolves the REST delegate.
    ///
    /// # Errors
    ///
    /// See [`delegate`](Self::delegate).
    pub async fn rest_delegate(&self) -> Result<Option<Arc<dyn RestRequestHandler>>, HostError> {
        self.delegate::<RestKind>().await
    }

    /// Resolves the web request delegate.
    ///
    /// # Errors
    ///
    /// See [`delegate`](Self::delegate).
    pub async fn web_delegate(&self) -> Result<Option<Arc<dyn WebRequestHandler>>, HostError> {
        self.delegate::<WebKind>().await
    }

    /// Resolves the legacy string/binary request delegate.
    ///
    /// # Errors
    ///
    /// See [`delegate`](Self::delegate).
    pub async fn request_delegate(&self) -> Result<Option<Arc<dyn RequestHandler>>, HostError> {
        self.delegate::<LegacyRequestKind>().await
    }

    /// Resolves the capability-qualified binary request delegate.
    ///
    /// # Errors
    ///
    /// See [`delegate`](Self::delegate).
    pub async fn request2_delegate(&self) -> Result<Option<Arc<dyn RequestHandler2>>, HostError> {
        self.delegate::<BinaryRequest2Kind>().await
    }

    /// Summarises the delegate cache. Empty outside the initialized phase.
    pub fn cache_snapshot(&self) -> Vec<CacheEntrySummary> {
        self.bound()
            .map(|bound| bound.resolver.cache().snapshot())
            .unwrap_or_default()
    }

    fn bound(&self) -> Option<Arc<BoundSession>> {
        match &*self.state.read() {
            LifecycleState::Initialized(bound) => Some(Arc::clone(bound)),
            _ => None,
        }
    }
}

impl<H> std::fmt::Debug for Interceptor<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interceptor")
            .field("phase", &self.state.read().phase())
            .finish_non_exhaustive()
    }
}

/// A resolved handler and the bound session it was resolved from.
///
/// Held across the forwarded call, so a concurrent `shutdown` defers releasing
/// the session's resources until the call completes. Fields drop in
/// declaration order.
struct Dispatch<T: ?Sized> {
    handler: Arc<T>,
    _bound: Arc<BoundSession>,
}

// ---------------------------------------------------------------------------
// Capability protocols
// ---------------------------------------------------------------------------

#[async_trait]
impl<H: InterceptorHooks> RestRequestHandler for Interceptor<H> {
    #[instrument(level = "debug", skip_all, fields(capability = "rest", session = Empty))]
    async fn schema(&self) -> Result<Option<String>, HostError> {
        match self.dispatch::<RestKind>().await? {
            Some(dispatch) => dispatch.handler.schema().await,
            None => Ok(None),
        }
    }

    #[instrument(
        level = "debug",
        skip_all,
        fields(
            capability = "rest",
            session = Empty,
            resource = %request.resource_name,
            operation = %request.operation_name
        )
    )]
    async fn handle_rest_request(
        &self,
        request: &RestRequest,
    ) -> Result<Option<RestResponse>, HostError> {
        match self.dispatch::<RestKind>().await? {
            Some(dispatch) => dispatch.handler.handle_rest_request(request).await,
            None => Ok(None),
        }
    }
}

#[async_trait]
impl<H: InterceptorHooks> WebRequestHandler for Interceptor<H> {
    #[instrument(
        level = "debug",
        skip_all,
        fields(capability = "web", session = Empty, method = %request.method, url = %request.url)
    )]
    async fn handle_web_request(
        &self,
        request: &WebRequest,
    ) -> Result<Option<WebResponse>, HostError> {
        match self.dispatch::<WebKind>().await? {
            Some(dispatch) => dispatch.handler.handle_web_request(request).await,
            None => Ok(None),
        }
    }
}

#[async_trait]
impl<H: InterceptorHooks> RequestHandler for Interceptor<H> {
    #[instrument(
        level = "debug",
        skip_all,
        fields(capability = "legacy-request", session = Empty, capabilities = %capabilities)
    )]
    async fn handle_string_request(
        &self,
        capabilities: &str,
        request: &str,
    ) -> Result<Option<String>, HostError> {
        match self.dispatch::<LegacyRequestKind>().await? {
            Some(dispatch) => {
                dispatch
                    .handler
                    .handle_string_request(capabilities, request)
                    .await
            }
            None => Ok(None),
        }
    }

    #[instrument(
        level = "debug",
        skip_all,
        fields(capability = "legacy-request", session = Empty, len = request.len())
    )]
    async fn handle_binary_request(&self, request: &[u8]) -> Result<Option<Vec<u8>>, HostError> {
        match self.dispatch::<LegacyRequestKind>().await? {
            Some(dispatch) => dispatch.handler.handle_binary_request(request).await,
            None => Ok(None),
        }
    }
}

#[async_trait]
impl<H: InterceptorHooks> RequestHandler2 for Interceptor<H> {
    #[instrument(
        level = "debug",
        skip_all,
        fields(
            capability = "binary-request2",
            session = Empty,
            capabilities = %capabilities,
            len = request.len()
        )
    )]
    async fn handle_binary_request2(
        &self,
        capabilities: &str,
        request: &[u8],
    ) -> Result<Option<Vec<u8>>, HostError> {
        match self.dispatch::<BinaryRequest2Kind>().await? {
            Some(dispatch) => {
                dispatch
                    .handler
                    .handle_binary_request2(capabilities, request)
                    .await
            }
            None => Ok(None),
        }
    }
}

impl<H: InterceptorHooks + 'static> ServerTarget for Interceptor<H> {
    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::all()
    }

    fn as_rest_handler(self: Arc<Self>) -> Option<Arc<dyn RestRequestHandler>> {
        Some(self)
    }

    fn as_web_handler(self: Arc<Self>) -> Option<Arc<dyn WebRequestHandler>> {
        Some(self)
    }

    fn as_request_handler(self: Arc<Self>) -> Option<Arc<dyn RequestHandler>> {
        Some(self)
    }

    fn as_request_handler2(self: Arc<Self>) -> Option<Arc<dyn RequestHandler2>> {
        Some(self)
    }
}
