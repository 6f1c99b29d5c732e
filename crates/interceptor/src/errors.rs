//! Error types for the interceptor domain.
//!
//! Only [`HostError`] ever crosses the dispatch boundary: it is the failure of
//! a host call (extension lookup or the delegate itself) and is handed back to
//! the caller unchanged. [`ConfigurationError`] is absorbed by the resolver and
//! degrades to default routing. [`LifecycleError`] is returned by
//! initialization and shutdown only.
//!
//! "No capable target" is not an error at all; dispatch operations report it
//! as an empty (`Ok(None)`) result.

use std::sync::Arc;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Host failures
// ---------------------------------------------------------------------------

/// An I/O-class failure raised by the hosting environment.
///
/// Produced by extension lookup and by delegates while serving a request.
/// The interceptor never wraps or rewrites these; they reach the caller of the
/// dispatch operation exactly as the host raised them.
#[derive(Debug, Clone, Error)]
pub enum HostError {
    /// A local I/O operation against the host failed.
    #[error("host I/O failure during {operation}: {source}")]
    Io {
        /// Short description of the host operation that failed.
        operation: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// An out-of-process host call returned a failure code.
    #[error("host call failed with code {code}: {message}")]
    Remote {
        /// Host-defined failure code.
        code: i32,
        /// Human-readable description supplied by the host.
        message: String,
    },
}

impl HostError {
    /// Wraps an [`std::io::Error`] raised during `operation`.
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a [`HostError::Remote`] from a host failure code.
    pub fn remote(code: i32, message: impl Into<String>) -> Self {
        Self::Remote {
            code,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration failures
// ---------------------------------------------------------------------------

/// A configuration property could not be read.
///
/// A missing key is not an error (sources return `Ok(None)`); these variants
/// cover a store that cannot be read at all, or a value of the wrong type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The property store is unavailable or corrupted.
    #[error("configuration property '{key}' is unavailable: {message}")]
    Unavailable {
        /// The property key that was requested.
        key: String,
        /// Description of the store failure.
        message: String,
    },

    /// The property exists but does not hold a string.
    #[error("configuration property '{key}' is not a string")]
    NotAString {
        /// The property key that was requested.
        key: String,
    },
}

// ---------------------------------------------------------------------------
// Lifecycle failures
// ---------------------------------------------------------------------------

/// Errors raised by interceptor initialization and shutdown.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// `initialize` was called on an interceptor that has already been
    /// initialized (or shut down).
    #[error("interceptor has already been initialized")]
    AlreadyInitialized,

    /// `shutdown` was called on an interceptor that is not initialized.
    #[error("interceptor is not initialized")]
    NotInitialized,

    /// The hosting session supplied a primary target that cannot serve REST
    /// requests.
    #[error("primary server object does not provide a REST request handler")]
    PrimaryNotRestCapable,

    /// The implementer-supplied teardown step failed.
    ///
    /// Held resources were still released before this error was returned.
    #[error("pre-shutdown teardown failed: {source}")]
    Teardown {
        /// The error returned by the teardown hook.
        #[source]
        source: HostError,
    },
}
