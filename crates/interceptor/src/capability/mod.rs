//! Capability model.
//!
//! A target object (the primary server object or an extension) supports some
//! subset of four request-handling protocols. Each protocol is a
//! [`Capability`] tag; the set a target supports is a [`CapabilitySet`] of
//! flags that the target reports up front, so resolution is a tag test rather
//! than a runtime type inspection.
//!
//! [`CapabilityKind`] connects a tag to its handler trait. The delegate
//! resolver is written once, generic over the kind, and the marker types
//! [`RestKind`], [`WebKind`], [`LegacyRequestKind`] and [`BinaryRequest2Kind`]
//! select which protocol a call resolves for.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ports::{
    PrimaryTarget, RequestHandler, RequestHandler2, RestRequestHandler, ServerTarget,
    WebRequestHandler,
};


// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// One of the four request-handling protocols a target may support.
///
/// # Example
///
/// ```
/// use interceptor::Capability;
///
/// assert_eq!(Capability::BinaryRequest2.as_str(), "binary-request2");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Schema queries and REST resource/operation requests.
    Rest,
    /// HTTP-like web requests.
    Web,
    /// String and binary requests without a capability qualifier.
    LegacyRequest,
    /// Capability-qualified binary requests.
    BinaryRequest2,
}

impl Capability {
    /// Every capability, in declaration order.
    pub const ALL: [Capability; 4] = [
        Capability::Rest,
        Capability::Web,
        Capability::LegacyRequest,
        Capability::BinaryRequest2,
    ];

    /// Returns the canonical kebab-case string for this capability.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rest => "rest",
            Self::Web => "web",
            Self::LegacyRequest => "legacy-request",
            Self::BinaryRequest2 => "binary-request2",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CapabilitySet
// ---------------------------------------------------------------------------

bitflags::bitflags! {
    /// The capabilities a target supports.
    ///
    /// Serialises as a list of [`Capability`] strings.
    ///
    /// # Example
    ///
    /// ```
    /// use interceptor::{Capability, CapabilitySet};
    ///
    /// let set = CapabilitySet::of(Capability::Rest).with(Capability::Web);
    /// assert!(set.supports(Capability::Web));
    /// assert!(!set.supports(Capability::BinaryRequest2));
    /// assert_eq!(set, CapabilitySet::REST | CapabilitySet::WEB);
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CapabilitySet: u8 {
        /// See [`Capability::Rest`].
        const REST = 1 << 0;
        /// See [`Capability::Web`].
        const WEB = 1 << 1;
        /// See [`Capability::LegacyRequest`].
        const LEGACY_REQUEST = 1 << 2;
        /// See [`Capability::BinaryRequest2`].
        const BINARY_REQUEST2 = 1 << 3;
    }
}

impl CapabilitySet {
    /// The flag for `capability` alone.
    pub const fn of(capability: Capability) -> Self {
        match capability {
            Capability::Rest => Self::REST,
            Capability::Web => Self::WEB,
            Capability::LegacyRequest => Self::LEGACY_REQUEST,
            Capability::BinaryRequest2 => Self::BINARY_REQUEST2,
        }
    }

    /// Returns this set with `capability` added.
    #[must_use]
    pub const fn with(self, capability: Capability) -> Self {
        self.union(Self::of(capability))
    }

    /// Returns `true` if `capability` is in the set.
    pub const fn supports(self, capability: Capability) -> bool {
        self.contains(Self::of(capability))
    }

    /// The capabilities in the set, in declaration order.
    pub fn capabilities(self) -> impl Iterator<Item = Capability> {
        Capability::ALL
            .into_iter()
            .filter(move |capability| self.supports(*capability))
    }
}

impl Default for CapabilitySet {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, capability) in self.capabilities().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(capability.as_str())?;
        }
        Ok(())
    }
}

impl From<Capability> for CapabilitySet {
    fn from(capability: Capability) -> Self {
        Self::of(capability)
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl Serialize for CapabilitySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.capabilities())
    }
}

impl<'de> Deserialize<'de> for CapabilitySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let capabilities = Vec::<Capability>::deserialize(deserializer)?;
        Ok(capabilities.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// CapabilityKind
// ---------------------------------------------------------------------------

/// Type-level selector tying a [`Capability`] tag to its handler trait.
///
/// Implemented only by the four uninhabited marker types in this module.
pub trait CapabilityKind: Send + Sync + 'static {
    /// The tag this kind resolves for.
    const CAPABILITY: Capability;

    /// The handler trait object a resolved delegate is exposed as.
    type Handler: ?Sized + Send + Sync;

    /// Projects `target` onto this kind's handler trait.
    ///
    /// Returns `None` when the target provides no such handler.
    fn project(target: Arc<dyn ServerTarget>) -> Option<Arc<Self::Handler>>;

    /// Projects the primary target, used when no extension is configured.
    ///
    /// The primary target's capability set is consulted first; a primary
    /// target that does not advertise the capability yields `None`.
    fn project_primary(primary: &PrimaryTarget) -> Option<Arc<Self::Handler>> {
        if primary.capabilities().supports(Self::CAPABILITY) {
            Self::project(Arc::clone(primary.target()))
        } else {
            None
        }
    }
}

/// Selects [`Capability::Rest`].
#[derive(Debug)]
pub enum RestKind {}

/// Selects [`Capability::Web`].
#[derive(Debug)]
pub enum WebKind {}

/// Selects [`Capability::LegacyRequest`].
#[derive(Debug)]
pub enum LegacyRequestKind {}

/// Selects [`Capability::BinaryRequest2`].
#[derive(Debug)]
pub enum BinaryRequest2Kind {}

impl CapabilityKind for RestKind {
    const CAPABILITY: Capability = Capability::Rest;
    type Handler = dyn RestRequestHandler;

    fn project(target: Arc<dyn ServerTarget>) -> Option<Arc<Self::Handler>> {
        target.as_rest_handler()
    }

    // The primary target is REST-capable by construction; its view is built
    // once at initialization and handed out without a capability check.
    fn project_primary(primary: &PrimaryTarget) -> Option<Arc<Self::Handler>> {
        Some(Arc::clone(primary.rest_view()))
    }
}

impl CapabilityKind for WebKind {
    const CAPABILITY: Capability = Capability::Web;
    type Handler = dyn WebRequestHandler;

    fn project(target: Arc<dyn ServerTarget>) -> Option<Arc<Self::Handler>> {
        target.as_web_handler()
    }
}

impl CapabilityKind for LegacyRequestKind {
    const CAPABILITY: Capability = Capability::LegacyRequest;
    type Handler = dyn RequestHandler;

    fn project(target: Arc<dyn ServerTarget>) -> Option<Arc<Self::Handler>> {
        target.as_request_handler()
    }
}

impl CapabilityKind for BinaryRequest2Kind {
    const CAPABILITY: Capability = Capability::BinaryRequest2;
    type Handler = dyn RequestHandler2;

    fn project(target: Arc<dyn ServerTarget>) -> Option<Arc<Self::Handler>> {
        target.as_request_handler2()
    }
}
