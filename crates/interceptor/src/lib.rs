//! Server object interceptor.
//!
//! An [`Interceptor`] sits in front of a hosted server object (the *primary
//! target*) and its named extensions. Every inbound request, whatever its
//! protocol shape, is forwarded to whichever target the `ExtensionName`
//! configuration property currently selects. The caller cannot tell which
//! target served it.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate performs no transport or
//! storage I/O. It defines *what* it needs from a host in [`ports`]; hosting
//! adapters (the `host` crate, or a real server runtime) define *how* to
//! supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`capability`] | `Capability` tags, `CapabilitySet`, and the `CapabilityKind` selectors |
//! | [`ports`] | Handler traits, `ServerTarget`, and the host service traits |
//! | [`cache`] | The name → extension `DelegateCache` |
//! | [`resolver`] | `DelegateResolver`: picks the delegate for a capability |
//! | [`facade`] | `Interceptor`: resolve-then-forward for every protocol |
//! | [`lifecycle`] | Initialization/shutdown phases and the teardown hook |
//! | [`identifiers`] | `ExtensionName`, `SessionId` |
//! | [`types`] | Request/response shapes and `Timestamp` |
//! | [`errors`] | `HostError`, `ConfigurationError`, `LifecycleError` |
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use interceptor::{HostingSession, Interceptor, NoHooks, RequestHandler2};
//!
//! # async fn run(session: Arc<dyn HostingSession>) -> Result<(), Box<dyn std::error::Error>> {
//! let interceptor = Interceptor::new(NoHooks);
//! interceptor.initialize(session)?;
//!
//! // Served by the primary target, or by the extension named in the
//! // `ExtensionName` property; `None` if neither handles binary requests.
//! let response = interceptor.handle_binary_request2("query", b"payload").await?;
//!
//! interceptor.shutdown().await?;
//! # let _ = response;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod capability;
pub mod errors;
pub mod facade;
pub mod identifiers;
pub mod lifecycle;
pub mod ports;
pub mod resolver;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export everything at the crate root for ergonomic usage by hosting adapters.
pub use cache::{CacheEntrySummary, DelegateCache};
pub use capability::{
    BinaryRequest2Kind, Capability, CapabilityKind, CapabilitySet, LegacyRequestKind, RestKind,
    WebKind,
};
pub use errors::{ConfigurationError, HostError, LifecycleError};
pub use facade::Interceptor;
pub use identifiers::{ExtensionName, SessionId};
pub use lifecycle::{InterceptorHooks, LifecyclePhase, NoHooks};
pub use ports::{
    ConfigurationSource, ExtensionHandle, ExtensionLocator, HostingSession, PrimaryTarget,
    RequestHandler, RequestHandler2, RestRequestHandler, ServerTarget, WebRequestHandler,
    EXTENSION_NAME_KEY,
};
pub use resolver::DelegateResolver;
pub use types::{
    HttpMethod, ResponseDataType, RestRequest, RestResponse, Timestamp, WebRequest, WebResponse,
};
