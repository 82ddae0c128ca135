//! Plain HTTP request and response values exchanged with a [`Transport`].
//!
//! [`Transport`]: crate::Transport

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use std::fmt;

/// A fully-formed outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl HttpRequest {
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// The body as UTF-8 text (lossy), empty when there is none.
    #[must_use]
    pub fn body_text(&self) -> String {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_default()
    }
}

/// A response received from the remote end, whatever its status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// The body as UTF-8 text (lossy).
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Every value of the named header, in received order.
    ///
    /// Values that are not valid visible ASCII are skipped.
    #[must_use]
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }
}

/// A failure raised while executing a request.
///
/// `response` is present when the server answered with a non-success status,
/// and absent for connection-level problems (DNS, refused, TLS, timeouts).
#[derive(Debug, Clone)]
pub struct TransportError {
    pub message: String,
    pub response: Option<HttpResponse>,
}

impl TransportError {
    /// A failure where no response was received.
    pub fn without_response(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: None,
        }
    }

    /// A failure caused by a non-success response.
    pub fn with_response(message: impl Into<String>, response: HttpResponse) -> Self {
        Self {
            message: message.into(),
            response: Some(response),
        }
    }

    /// Wrap a non-success response with a descriptive message.
    #[must_use]
    pub fn from_status(method: &Method, url: &str, response: HttpResponse) -> Self {
        let kind = if response.status.is_client_error() {
            "Client error"
        } else {
            "Server error"
        };
        let message = format!("{kind}: `{method} {url}` resulted in a `{}` response", response.status);
        Self::with_response(message, response)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TransportError {}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_header_values_multiple() {
        let mut resp = HttpResponse::new(StatusCode::TOO_MANY_REQUESTS, "");
        resp.headers
            .append("retry-after", HeaderValue::from_static("30"));
        resp.headers
            .append("retry-after", HeaderValue::from_static("60"));
        assert_eq!(resp.header_values("Retry-After"), vec!["30", "60"]);
        assert!(resp.header_values("x-missing").is_empty());
    }

    #[test]
    fn test_text_lossy() {
        let resp = HttpResponse::new(StatusCode::OK, Bytes::from_static(b"ok \xff"));
        assert!(resp.text().starts_with("ok "));
    }

    #[test]
    fn test_from_status_message() {
        let resp = HttpResponse::new(StatusCode::NOT_FOUND, "missing");
        let err = TransportError::from_status(&Method::GET, "https://x/y", resp);
        assert!(err.message.starts_with("Client error: `GET https://x/y`"));
        assert!(err.response.is_some());

        let resp = HttpResponse::new(StatusCode::BAD_GATEWAY, "");
        let err = TransportError::from_status(&Method::POST, "https://x/y", resp);
        assert!(err.to_string().starts_with("Server error"));
    }
}
