//! Request and response shapes carried through the interceptor.
//!
//! The interceptor never inspects these values; it hands them to the resolved
//! delegate by reference and returns whatever the delegate produced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Web requests
// ---------------------------------------------------------------------------

/// HTTP verb of a [`WebRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
    /// `PATCH`
    Patch,
}

impl HttpMethod {
    /// Returns the canonical upper-case verb.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP-like request addressed to the hosted server object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebRequest {
    /// HTTP verb.
    pub method: HttpMethod,
    /// Request URL as received by the host.
    pub url: String,
    /// Raw query string, without the leading `?`.
    pub query: String,
    /// Comma-separated capabilities granted to the caller.
    pub capabilities: String,
    /// Request body.
    pub body: String,
}

/// How the body of a [`WebResponse`] should be interpreted by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseDataType {
    /// The body is the response payload itself.
    Payload,
    /// The body holds the path of a file the host should stream instead.
    FilePath,
}

/// Response produced by a web request delegate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebResponse {
    /// Response bytes.
    pub body: Vec<u8>,
    /// MIME type of the response (e.g. `"application/json"`).
    pub content_type: String,
    /// Interpretation of `body`.
    pub data_type: ResponseDataType,
}

// ---------------------------------------------------------------------------
// REST requests
// ---------------------------------------------------------------------------

/// A REST resource/operation request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RestRequest {
    /// Comma-separated capabilities granted to the caller.
    pub capabilities: String,
    /// Resource path relative to the service root (empty for the root).
    pub resource_name: String,
    /// Operation name (empty for a resource request).
    pub operation_name: String,
    /// JSON-encoded operation input.
    pub operation_input: String,
    /// Requested output format (e.g. `"json"`).
    pub output_format: String,
    /// JSON-encoded request properties.
    pub request_properties: String,
}

/// Response produced by a REST request delegate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RestResponse {
    /// Response bytes.
    pub body: Vec<u8>,
    /// JSON-encoded response properties (headers and the like), if any.
    pub response_properties: Option<String>,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A point in time, UTC. Serialises as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current time.
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.to_rfc3339())
    }
}
