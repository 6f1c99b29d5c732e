//! Shared test doubles for the interceptor unit tests.
//!
//! [`TestTarget`] serves every protocol with responses tagged by its label,
//! so tests can tell which target answered. [`CountingLocator`] counts lookups
//! and can be told to fail. [`TestSession`] hands its primary target and
//! configuration out once and keeps nothing else, so release order is
//! observable through the shared [`EventLog`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::capability::{Capability, CapabilitySet};
use crate::errors::{ConfigurationError, HostError};
use crate::identifiers::ExtensionName;
use crate::lifecycle::InterceptorHooks;
use crate::ports::{
    ConfigurationSource, ExtensionHandle, ExtensionLocator, HostingSession, RequestHandler,
    RequestHandler2, RestRequestHandler, ServerTarget, WebRequestHandler, EXTENSION_NAME_KEY,
};
use crate::types::{ResponseDataType, RestRequest, RestResponse, WebRequest, WebResponse};

// ---------------------------------------------------------------------------
// Event log
// ---------------------------------------------------------------------------

/// Ordered record of lifecycle events, shared by the doubles of one test.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub(crate) fn record(&self, event: impl Into<String>) {
        self.0.lock().push(event.into());
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Holds a request inside its handler until the test opens the gate.
#[derive(Debug, Clone, Default)]
pub(crate) struct Gate {
    entered: Arc<Notify>,
    opened: Arc<Notify>,
}

impl Gate {
    /// Waits until a request is parked at the gate.
    pub(crate) async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Lets the parked request continue.
    pub(crate) fn open(&self) {
        self.opened.notify_one();
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.opened.notified().await;
    }
}

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// A target that serves the capabilities it was built with.
#[derive(Debug)]
pub(crate) struct TestTarget {
    label: String,
    capabilities: CapabilitySet,
    log: Option<EventLog>,
    schema_gate: Option<Gate>,
}

impl TestTarget {
    pub(crate) fn new(label: &str, capabilities: CapabilitySet) -> Self {
        Self {
            label: label.to_owned(),
            capabilities,
            log: None,
            schema_gate: None,
        }
    }

    /// Parks every `schema` call at `gate`.
    pub(crate) fn with_schema_gate(mut self, gate: &Gate) -> Self {
        self.schema_gate = Some(gate.clone());
        self
    }

    /// Records `"{label}"` when dropped and `"{label}-rest-view"` when its
    /// REST view is dropped.
    pub(crate) fn with_log(mut self, log: &EventLog) -> Self {
        self.log = Some(log.clone());
        self
    }

    pub(crate) fn shared(label: &str, capabilities: CapabilitySet) -> Arc<Self> {
        Arc::new(Self::new(label, capabilities))
    }

    pub(crate) fn handle(label: &str, capabilities: CapabilitySet) -> ExtensionHandle {
        ExtensionHandle::new(Self::shared(label, capabilities))
    }
}

impl Drop for TestTarget {
    fn drop(&mut self) {
        if let Some(log) = &self.log {
            log.record(self.label.clone());
        }
    }
}

/// Separate REST view object, so its release is observable on its own.
struct TestRestView {
    target: Arc<TestTarget>,
}

impl Drop for TestRestView {
    fn drop(&mut self) {
        if let Some(log) = &self.target.log {
            log.record(format!("{}-rest-view", self.target.label));
        }
    }
}

#[async_trait]
impl RestRequestHandler for TestRestView {
    async fn schema(&self) -> Result<Option<String>, HostError> {
        if let Some(gate) = &self.target.schema_gate {
            gate.pass().await;
        }
        Ok(Some(format!("{}:schema", self.target.label)))
    }

    async fn handle_rest_request(
        &self,
        request: &RestRequest,
    ) -> Result<Option<RestResponse>, HostError> {
        Ok(Some(RestResponse {
            body: format!("{}:{}", self.target.label, request.resource_name).into_bytes(),
            response_properties: None,
        }))
    }
}

#[async_trait]
impl WebRequestHandler for TestTarget {
    async fn handle_web_request(
        &self,
        request: &WebRequest,
    ) -> Result<Option<WebResponse>, HostError> {
        Ok(Some(WebResponse {
            body: format!("{}:{} {}", self.label, request.method, request.url).into_bytes(),
            content_type: "text/plain".to_owned(),
            data_type: ResponseDataType::Payload,
        }))
    }
}

#[async_trait]
impl RequestHandler for TestTarget {
    async fn handle_string_request(
        &self,
        capabilities: &str,
        request: &str,
    ) -> Result<Option<String>, HostError> {
        Ok(Some(format!("{}:{capabilities}:{request}", self.label)))
    }

    async fn handle_binary_request(&self, request: &[u8]) -> Result<Option<Vec<u8>>, HostError> {
        Ok(Some(tagged(&self.label, "", request)))
    }
}

#[async_trait]
impl RequestHandler2 for TestTarget {
    async fn handle_binary_request2(
        &self,
        capabilities: &str,
        request: &[u8],
    ) -> Result<Option<Vec<u8>>, HostError> {
        Ok(Some(tagged(&self.label, capabilities, request)))
    }
}

impl ServerTarget for TestTarget {
    fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    fn as_rest_handler(self: Arc<Self>) -> Option<Arc<dyn RestRequestHandler>> {
        self.capabilities
            .supports(Capability::Rest)
            .then(|| Arc::new(TestRestView { target: self }) as Arc<dyn RestRequestHandler>)
    }

    fn as_web_handler(self: Arc<Self>) -> Option<Arc<dyn WebRequestHandler>> {
        if self.capabilities.supports(Capability::Web) {
            Some(self)
        } else {
            None
        }
    }

    fn as_request_handler(self: Arc<Self>) -> Option<Arc<dyn RequestHandler>> {
        if self.capabilities.supports(Capability::LegacyRequest) {
            Some(self)
        } else {
            None
        }
    }

    fn as_request_handler2(self: Arc<Self>) -> Option<Arc<dyn RequestHandler2>> {
        if self.capabilities.supports(Capability::BinaryRequest2) {
            Some(self)
        } else {
            None
        }
    }
}

/// `"{label}|{capabilities}|"` followed by the request bytes.
pub(crate) fn tagged(label: &str, capabilities: &str, request: &[u8]) -> Vec<u8> {
    let mut out = format!("{label}|{capabilities}|").into_bytes();
    out.extend_from_slice(request);
    out
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Holds a mutable `ExtensionName` value; can be switched into a failing
/// state.
#[derive(Debug, Default)]
pub(crate) struct TestConfiguration {
    extension_name: Mutex<Option<String>>,
    broken: AtomicBool,
    log: Option<EventLog>,
}

impl TestConfiguration {
    pub(crate) fn with_extension(name: &str) -> Self {
        let config = Self::default();
        config.set_extension(Some(name));
        config
    }

    pub(crate) fn with_log(mut self, log: &EventLog) -> Self {
        self.log = Some(log.clone());
        self
    }

    pub(crate) fn set_extension(&self, name: Option<&str>) {
        *self.extension_name.lock() = name.map(str::to_owned);
    }

    pub(crate) fn set_broken(&self, broken: bool) {
        self.broken.store(broken, Ordering::SeqCst);
    }
}

impl ConfigurationSource for TestConfiguration {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigurationError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(ConfigurationError::Unavailable {
                key: key.to_owned(),
                message: "property store is corrupted".to_owned(),
            });
        }
        if key == EXTENSION_NAME_KEY {
            Ok(self.extension_name.lock().clone())
        } else {
            Ok(None)
        }
    }
}

impl Drop for TestConfiguration {
    fn drop(&mut self) {
        if let Some(log) = &self.log {
            log.record("configuration");
        }
    }
}

// ---------------------------------------------------------------------------
// Locator
// ---------------------------------------------------------------------------

/// Serves registered extensions and counts every lookup.
#[derive(Debug, Default)]
pub(crate) struct CountingLocator {
    extensions: Mutex<HashMap<String, ExtensionHandle>>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl CountingLocator {
    pub(crate) fn register(&self, name: &str, handle: ExtensionHandle) {
        self.extensions.lock().insert(name.to_owned(), handle);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ExtensionLocator for CountingLocator {
    async fn find_extension_by_type_name(
        &self,
        name: &ExtensionName,
    ) -> Result<Option<ExtensionHandle>, HostError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Give concurrent resolutions of the same name a chance to interleave.
        tokio::task::yield_now().await;
        if self.failing.load(Ordering::SeqCst) {
            return Err(HostError::remote(-2147467259, "extension manager unavailable"));
        }
        Ok(self.extensions.lock().get(name.as_str()).cloned())
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Hands out its primary target and configuration exactly once.
pub(crate) struct TestSession {
    primary: Mutex<Option<Arc<dyn ServerTarget>>>,
    configuration: Mutex<Option<Arc<dyn ConfigurationSource>>>,
    locator: Arc<CountingLocator>,
    log: Option<EventLog>,
}

impl TestSession {
    pub(crate) fn new(
        primary: Arc<dyn ServerTarget>,
        configuration: Arc<dyn ConfigurationSource>,
        locator: Arc<CountingLocator>,
    ) -> Self {
        Self {
            primary: Mutex::new(Some(primary)),
            configuration: Mutex::new(Some(configuration)),
            locator,
            log: None,
        }
    }

    pub(crate) fn with_log(mut self, log: &EventLog) -> Self {
        self.log = Some(log.clone());
        self
    }
}

impl HostingSession for TestSession {
    fn server_object(&self) -> Arc<dyn ServerTarget> {
        self.primary
            .lock()
            .take()
            .expect("server object is requested once")
    }

    fn configuration(&self) -> Arc<dyn ConfigurationSource> {
        self.configuration
            .lock()
            .take()
            .expect("configuration is requested once")
    }

    fn extension_locator(&self) -> &dyn ExtensionLocator {
        &*self.locator
    }
}

impl Drop for TestSession {
    fn drop(&mut self) {
        if let Some(log) = &self.log {
            log.record("session");
        }
    }
}

// ---------------------------------------------------------------------------
// Hooks
// ---------------------------------------------------------------------------

/// Records `"pre-shutdown"` and optionally fails.
#[derive(Debug, Default)]
pub(crate) struct RecordingHooks {
    pub(crate) log: EventLog,
    pub(crate) fail: bool,
}

#[async_trait]
impl InterceptorHooks for RecordingHooks {
    async fn pre_shutdown(&self) -> Result<(), HostError> {
        self.log.record("pre-shutdown");
        if self.fail {
            Err(HostError::io(
                "flush interceptor state",
                std::io::Error::new(std::io::ErrorKind::BrokenPipe, "state store closed"),
            ))
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures shared across modules
// ---------------------------------------------------------------------------

/// A primary target that serves REST and legacy requests only.
pub(crate) fn rest_and_legacy() -> CapabilitySet {
    CapabilitySet::of(Capability::Rest).with(Capability::LegacyRequest)
}

/// Everything a resolver or interceptor test needs to drive one session.
pub(crate) struct Harness {
    pub(crate) session: Arc<TestSession>,
    pub(crate) configuration: Arc<TestConfiguration>,
    pub(crate) locator: Arc<CountingLocator>,
}

impl Harness {
    pub(crate) fn new(primary_capabilities: CapabilitySet) -> Self {
        let configuration = Arc::new(TestConfiguration::default());
        let locator = Arc::new(CountingLocator::default());
        let session = Arc::new(TestSession::new(
            TestTarget::shared("primary", primary_capabilities),
            Arc::clone(&configuration) as Arc<dyn ConfigurationSource>,
            Arc::clone(&locator),
        ));
        Self {
            session,
            configuration,
            locator,
        }
    }
}
