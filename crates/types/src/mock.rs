//! A scripted in-process [`Transport`] for tests and offline use.
//!
//! Responses are queued up front and handed out in order; every request is
//! recorded so callers can assert on what was sent.

use crate::{HttpRequest, HttpResponse, Transport, TransportError};
use async_trait::async_trait;
use http::{HeaderValue, StatusCode};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One scripted outcome.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Answer with this response; non-2xx statuses become a [`TransportError`].
    Respond(HttpResponse),
    /// Fail without a response, e.g. connection refused.
    Fail(String),
}

/// A [`Transport`] that replays queued replies.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply with the given status and JSON body.
    pub fn push_json(&self, status: u16, body: &serde_json::Value) -> &Self {
        let mut resp = HttpResponse::new(status_code(status), body.to_string());
        resp.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self.push(MockReply::Respond(resp))
    }

    /// Queue a reply with the given status and raw text body.
    pub fn push_text(&self, status: u16, body: &str) -> &Self {
        self.push(MockReply::Respond(HttpResponse::new(
            status_code(status),
            body.to_string(),
        )))
    }

    /// Queue a fully-built response.
    pub fn push_response(&self, response: HttpResponse) -> &Self {
        self.push(MockReply::Respond(response))
    }

    /// Queue a connection-level failure.
    pub fn push_failure(&self, message: &str) -> &Self {
        self.push(MockReply::Fail(message.to_string()))
    }

    pub fn push(&self, reply: MockReply) -> &Self {
        self.replies
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push_back(reply);
        self
    }

    /// Every request sent so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Number of requests sent so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Number of queued replies not yet consumed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.replies
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = request.method.clone();
        let url = request.url.clone();
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(request);

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front();
        match reply {
            Some(MockReply::Respond(resp)) if resp.status.is_success() => Ok(resp),
            Some(MockReply::Respond(resp)) => Err(TransportError::from_status(&method, &url, resp)),
            Some(MockReply::Fail(message)) => Err(TransportError::without_response(message)),
            None => Err(TransportError::without_response(format!(
                "no scripted reply for {method} {url}"
            ))),
        }
    }
}
