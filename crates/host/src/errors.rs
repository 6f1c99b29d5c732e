//! Error types for the in-process hosting adapters.

use interceptor::ExtensionName;

/// Failures raised while assembling an in-process host.
///
/// These never reach the interceptor's dispatch path; they are returned to
/// whoever builds the session.
#[derive(Debug, thiserror::Error)]
pub enum HostAdapterError {
    /// A property set could not be parsed from JSON.
    ///
    /// The document must be an object whose values are strings, integers or
    /// booleans.
    #[error("invalid property set: {source}")]
    InvalidProperties {
        #[source]
        source: serde_json::Error,
    },

    /// An extension was registered under a name that is already taken.
    #[error("extension '{name}' is already registered")]
    DuplicateExtension { name: ExtensionName },

    /// A session was built without a primary server object.
    #[error("in-process session requires a primary server object")]
    MissingPrimary,
}
