//! Server targets and setup shared by the end-to-end tests.

use std::sync::Arc;

use async_trait::async_trait;
use interceptor::{
    Capability, CapabilitySet, HostError, RequestHandler, RequestHandler2, ResponseDataType,
    RestRequest, RestRequestHandler, RestResponse, ServerTarget, WebRequest, WebRequestHandler,
    WebResponse,
};

/// Installs a test-writer subscriber once per test binary. Honours
/// `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Answers every protocol it advertises with its label prepended.
#[derive(Debug)]
pub struct LabelledTarget {
    label: &'static str,
    capabilities: CapabilitySet,
}

impl LabelledTarget {
    pub fn shared(label: &'static str, capabilities: CapabilitySet) -> Arc<dyn ServerTarget> {
        Arc::new(Self {
            label,
            capabilities,
        })
    }
}

/// `"{label}|{capabilities}|"` followed by the request bytes.
pub fn tagged(label: &str, capabilities: &str, request: &[u8]) -> Vec<u8> {
    let mut out = format!("{label}|{capabilities}|").into_bytes();
    out.extend_from_slice(request);
    out
}

#[async_trait]
impl RestRequestHandler for LabelledTarget {
    async fn schema(&self) -> Result<Option<String>, HostError> {
        Ok(Some(format!(r#"{{"name":"{}"}}"#, self.label)))
    }

    async fn handle_rest_request(
        &self,
        request: &RestRequest,
    ) -> Result<Option<RestResponse>, HostError> {
        Ok(Some(RestResponse {
            body: format!("{}:{}", self.label, request.operation_name).into_bytes(),
            response_properties: Some(r#"{"Content-Type":"application/json"}"#.to_owned()),
        }))
    }
}

#[async_trait]
impl WebRequestHandler for LabelledTarget {
    async fn handle_web_request(
        &self,
        request: &WebRequest,
    ) -> Result<Option<WebResponse>, HostError> {
        Ok(Some(WebResponse {
            body: format!("{}:{}", self.label, request.url).into_bytes(),
            content_type: "text/html".to_owned(),
            data_type: ResponseDataType::Payload,
        }))
    }
}

#[async_trait]
impl RequestHandler for LabelledTarget {
    async fn handle_string_request(
        &self,
        capabilities: &str,
        request: &str,
    ) -> Result<Option<String>, HostError> {
        Ok(Some(format!("{}:{capabilities}:{request}", self.label)))
    }

    async fn handle_binary_request(&self, request: &[u8]) -> Result<Option<Vec<u8>>, HostError> {
        Ok(Some(tagged(self.label, "", request)))
    }
}

#[async_trait]
impl RequestHandler2 for LabelledTarget {
    async fn handle_binary_request2(
        &self,
        capabilities: &str,
        request: &[u8],
    ) -> Result<Option<Vec<u8>>, HostError> {
        Ok(Some(tagged(self.label, capabilities, request)))
    }
}

impl ServerTarget for LabelledTarget {
    fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    fn as_rest_handler(self: Arc<Self>) -> Option<Arc<dyn RestRequestHandler>> {
        if self.capabilities.supports(Capability::Rest) {
            Some(self)
        } else {
            None
        }
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
