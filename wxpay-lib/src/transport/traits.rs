use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::protocol::Method;
use crate::Result;

/// One outgoing gateway call, already authorized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Path including the query string, identical to the signed path.
    pub path: String,
    /// Headers to set verbatim, `Authorization` included.
    pub headers: Vec<(String, String)>,
    /// Body bytes, identical to the signed body.
    pub body: Vec<u8>,
}

impl TransportRequest {
    /// Look up a request header by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Response header map with case-insensitive lookup.
///
/// Names are stored lower-cased; a repeated header keeps the last value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    entries: HashMap<String, String>,
}

impl ResponseHeaders {
    /// Create an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, replacing any previous value.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.entries
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Builder form of [`ResponseHeaders::insert`].
    pub fn with(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Get a header value by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no headers are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ResponseHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// What the gateway answered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: ResponseHeaders,
    /// Raw body bytes, exactly as received.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Create a response with no headers.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: ResponseHeaders::new(),
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait describing the request/response primitive the gateway client needs.
///
/// Implementations must send the method, path, headers and body verbatim:
/// the gateway recomputes the signature over them.
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    /// Send one request and return the raw response.
    ///
    /// A non-2xx status is a successful send; only failures to obtain a
    /// response at all are errors.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

#[async_trait]
impl<T: GatewayTransport + ?Sized> GatewayTransport for Arc<T> {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        (**self).send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_ignores_case() {
        let headers = ResponseHeaders::new()
            .with("Wechatpay-Serial", "S1")
            .with("content-type", "application/json");
        assert_eq!(headers.get("wechatpay-serial"), Some("S1"));
        assert_eq!(headers.get("WECHATPAY-SERIAL"), Some("S1"));
        assert_eq!(headers.get("Content-Type"), Some("application/json"));
        assert_eq!(headers.get("Wechatpay-Nonce"), None);
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_headers_from_iter_last_wins() {
        let headers: ResponseHeaders = [("X-A", "1"), ("x-a", "2")].into_iter().collect();
        assert_eq!(headers.get("X-A"), Some("2"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_is_success() {
        assert!(TransportResponse::new(200, "").is_success());
        assert!(TransportResponse::new(204, "").is_success());
        assert!(!TransportResponse::new(301, "").is_success());
        assert!(!TransportResponse::new(401, "").is_success());
    }

    #[test]
    fn test_request_header_lookup() {
        let request = TransportRequest {
            method: Method::Get,
            path: "/v3/certificates".into(),
            headers: vec![("Authorization".into(), "X".into())],
            body: Vec::new(),
        };
        assert_eq!(request.header("authorization"), Some("X"));
    }
}
