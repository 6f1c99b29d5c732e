//! Interceptor lifecycle: initialization, the implementer teardown hook, and
//! ordered release of host resources.
//!
//! ```text
//! Uninitialized ──initialize──▶ Initialized ──shutdown──▶ ShuttingDown ──▶ Released
//! ```
//!
//! Shutdown invokes [`InterceptorHooks::pre_shutdown`] before anything is
//! released, then releases the primary REST view, the primary target, the
//! hosting session and the configuration source, in that order. The release
//! runs whether or not the hook succeeds.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::errors::HostError;
use crate::identifiers::SessionId;
use crate::resolver::DelegateResolver;

/// Implementer-supplied behaviour run around the interceptor's lifecycle.
#[async_trait]
pub trait InterceptorHooks: Send + Sync {
    /// Releases implementer-owned state. Runs before any host resource is
    /// released.
    ///
    /// # Errors
    ///
    /// A failure is reported from `shutdown` as
    /// [`LifecycleError::Teardown`](crate::LifecycleError::Teardown) after the
    /// host resources have been released.
    async fn pre_shutdown(&self) -> Result<(), HostError>;
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

#[async_trait]
impl InterceptorHooks for NoHooks {
    async fn pre_shutdown(&self) -> Result<(), HostError> {
        Ok(())
    }
}

/// Observable lifecycle phase of an interceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecyclePhase {
    /// Created; `initialize` has not run.
    Uninitialized,
    /// Bound to a hosting session and accepting dispatch calls.
    Initialized,
    /// `shutdown` is running.
    ShuttingDown,
    /// All host resources have been released. Terminal.
    Released,
}

impl std::fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::ShuttingDown => "shutting-down",
            Self::Released => "released",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------

/// Resources bound by a successful initialization.
#[derive(Debug)]
pub(crate) struct BoundSession {
    pub(crate) id: SessionId,
    pub(crate) resolver: DelegateResolver,
}

impl BoundSession {
    /// Releases the session's resources.
    ///
    /// A request still being forwarded holds its own reference to the
    /// session. The resources are then dropped, in the same field order, when
    /// the last such request completes.
    pub(crate) fn release(self: Arc<Self>) {
        match Arc::try_unwrap(self) {
            Ok(bound) => bound.resolver.release(),
            Err(shared) => {
                warn!(
                    session = %shared.id,
                    "requests still in flight at shutdown; resources release when they complete"
                );
            }
        }
    }
}

#[derive(Debug)]
pub(crate) enum LifecycleState {
    Uninitialized,
    Initialized(Arc<BoundSession>),
    ShuttingDown,
    Released,
}

impl LifecycleState {
    pub(crate) fn phase(&self) -> LifecyclePhase {
        match self {
            Self::Uninitialized => LifecyclePhase::Uninitialized,
            Self::Initialized(_) => LifecyclePhase::Initialized,
            Self::ShuttingDown => LifecyclePhase::ShuttingDown,
            Self::Released => LifecyclePhase::Released,
        }
    }
}
