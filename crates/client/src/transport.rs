//! [`Transport`] implementation on top of `reqwest`.

use async_trait::async_trait;
use teamleader_types::{HttpRequest, HttpResponse, Transport, TransportError};

/// Sends requests with a shared `reqwest` client.
///
/// Non-2xx responses are read in full and returned as a [`TransportError`]
/// carrying the response, so the classifier can inspect status, headers and
/// body.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport wrapping the given HTTP client.
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Returns a reference to the inner HTTP client.
    #[must_use]
    pub fn client(&self) -> &reqwest::Client {
        &self.http
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.http.request(method.clone(), url.as_str()).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| TransportError::without_response(e.to_string()))?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp
            .bytes()
            .await
            .map_err(|e| TransportError::without_response(e.to_string()))?;

        let response = HttpResponse {
            status,
            headers,
            body,
        };
        if status.is_success() {
            Ok(response)
        } else {
            Err(TransportError::from_status(&method, &url, response))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_error_status_keeps_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/contacts.info"))
            .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
            .mount(&server)
            .await;

        let url = format!("{}/contacts.info", server.uri());
        let err = ReqwestTransport::default()
            .send(HttpRequest::new(Method::GET, url.as_str()))
            .await
            .unwrap_err();

        assert_eq!(
            err.message,
            format!("Client error: `GET {url}` resulted in a `404 Not Found` response")
        );
        let resp = err.response.unwrap();
        assert_eq!(resp.status, StatusCode::NOT_FOUND);
        assert_eq!(resp.text(), "gone");
    }

    #[tokio::test]
    async fn test_connection_failure_has_no_response() {
        let err = ReqwestTransport::default()
            .send(HttpRequest::new(Method::GET, "http://127.0.0.1:1/x"))
            .await
            .unwrap_err();
        assert!(err.response.is_none());
    }
}
