//! Request and response snapshots exchanged between the router, the
//! namespace store and the transport.

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

/// Status text used for synthetic offline responses.
const SERVICE_UNAVAILABLE: &str = "Service Unavailable";

/// An intercepted request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Upper-case HTTP method.
    #[serde(default = "default_method", deserialize_with = "uppercase_method")]
    pub method: String,
    /// Absolute request URL.
    pub url: Url,
    /// Request headers in arrival order.
    #[serde(default)]
    pub headers: Vec<(String, String)>,
}

fn default_method() -> String {
    "GET".into()
}

fn uppercase_method<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    String::deserialize(deserializer).map(|method| method.to_ascii_uppercase())
}

impl Request {
    /// Build a request for the given method and URL with no headers.
    pub fn new(method: &str, url: Url) -> Self {
        Self { method: method.to_ascii_uppercase(), url, headers: Vec::new() }
    }

    /// Shorthand for a bare GET request.
    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }

    /// Whether the URL scheme is http or https.
    pub fn is_http(&self) -> bool {
        matches!(self.url.scheme(), "http" | "https")
    }
}

/// A response snapshot: status line, headers and the full body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self { status, status_text: status_text.into(), headers: Vec::new(), body: body.into() }
    }

    /// Synthetic `503 Service Unavailable` with a plain-text body.
    pub fn offline(message: &str) -> Self {
        Self {
            status: 503,
            status_text: SERVICE_UNAVAILABLE.to_string(),
            headers: vec![("Content-Type".to_string(), "text/plain; charset=utf-8".to_string())],
            body: Bytes::copy_from_slice(message.as_bytes()),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Whether the status is in the 2xx class.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
