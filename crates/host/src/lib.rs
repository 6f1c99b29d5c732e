//! In-process hosting adapters for the interceptor.
//!
//! Implements the [`interceptor`] port traits without any out-of-process
//! host: a property store as the [`interceptor::ConfigurationSource`], an
//! extension registry as the [`interceptor::ExtensionLocator`], and a session
//! that ties them to a primary server object as the
//! [`interceptor::HostingSession`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Storage of properties and extension instances lives
//! here. The [`interceptor`] crate sees only its port traits.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use host::{ExtensionRegistry, InProcessSession, PropertySet};
//! use interceptor::{Interceptor, NoHooks, ServerTarget};
//!
//! fn bind(primary: Arc<dyn ServerTarget>) -> Result<(), Box<dyn std::error::Error>> {
//!     let properties = Arc::new(PropertySet::from_json(r#"{ "ExtensionName": "Audit" }"#)?);
//!     let session = InProcessSession::builder()
//!         .primary(primary)
//!         .properties(properties)
//!         .registry(ExtensionRegistry::new())
//!         .build()?;
//!
//!     let interceptor = Interceptor::new(NoHooks);
//!     interceptor.initialize(Arc::new(session))?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod properties;
pub mod registry;
pub mod session;

pub use errors::HostAdapterError;
pub use properties::{PropertySet, PropertyValue};
pub use registry::ExtensionRegistry;
pub use session::{InProcessSession, InProcessSessionBuilder};
