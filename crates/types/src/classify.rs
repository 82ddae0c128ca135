//! Maps error responses onto [`TeamleaderError`].
//!
//! A `429` with a `Retry-After` header becomes
//! [`TeamleaderError::TooManyRequests`]; any other response becomes
//! `"Error <status>: <message>"`. Failures without a response keep their own
//! message.

use crate::{HttpResponse, TeamleaderError, TransportError};
use serde_json::Value;

/// Classify an error response.
#[must_use]
pub fn classify_response(response: &HttpResponse) -> TeamleaderError {
    let status = response.status.as_u16();
    let message = format!("Error {status}: {}", error_message(response));

    if status == 429
        && let Some(first) = response.headers.get_all("retry-after").iter().next()
    {
        let retry_after_secs = leading_int(first.to_str().unwrap_or_default());
        tracing::warn!(retry_after_secs, "rate limited by the API");
        return TeamleaderError::TooManyRequests {
            message,
            status,
            retry_after_secs,
        };
    }

    TeamleaderError::api_with_status(message, status)
}

impl From<TransportError> for TeamleaderError {
    fn from(e: TransportError) -> Self {
        match e.response {
            Some(response) => classify_response(&response),
            None => Self::api(e.message),
        }
    }
}

/// The raw body, or `error.message.value` when the body is JSON carrying one.
fn error_message(response: &HttpResponse) -> String {
    let raw = response.text();
    let nested = serde_json::from_str::<Value>(&raw)
        .ok()
        .and_then(|json| json.pointer("/error/message/value").cloned());
    match nested {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => raw,
        Some(other) => other.to_string(),
    }
}

/// Integer prefix of a header value: `"30"` → 30, `" 12abc"` → 12, and
/// anything without leading digits (including HTTP dates) → 0.
fn leading_int(value: &str) -> u64 {
    let value = value.trim_start();
    let value = value.strip_prefix('+').unwrap_or(value);
    let digits: &str = value
        .find(|c: char| !c.is_ascii_digit())
        .map_or(value, |end| &value[..end]);
    if digits.is_empty() {
        0
    } else {
        digits.parse().unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderValue, Method, StatusCode};

    #[test]
    fn test_transport_error_with_response_is_classified() {
        let mut resp = HttpResponse::new(StatusCode::TOO_MANY_REQUESTS, "slow down");
        resp.headers
            .insert("retry-after", HeaderValue::from_static("30"));
        let err: TeamleaderError =
            TransportError::from_status(&Method::POST, "https://auth/token", resp).into();
        assert_eq!(
            err,
            TeamleaderError::TooManyRequests {
                message: "Error 429: slow down".into(),
                status: 429,
                retry_after_secs: 30,
            }
        );
    }

    #[test]
    fn test_transport_error_without_response_keeps_message() {
        let err: TeamleaderError = TransportError::without_response("connection refused").into();
        assert_eq!(err, TeamleaderError::api("connection refused"));
    }

    #[test]
    fn test_error_message_prefers_nested_value() {
        let resp = HttpResponse::new(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"message":{"value":"invalid_grant"}}}"#,
        );
        assert_eq!(error_message(&resp), "invalid_grant");

        let resp = HttpResponse::new(StatusCode::BAD_REQUEST, r#"{"error":{"message":{"value":7}}}"#);
        assert_eq!(error_message(&resp), "7");
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("30"), 30);
        assert_eq!(leading_int(" 7"), 7);
        assert_eq!(leading_int("15.5"), 15);
        assert_eq!(leading_int("Wed, 21 Oct 2015 07:28:00 GMT"), 0);
        assert_eq!(leading_int(""), 0);
        assert_eq!(leading_int("99999999999999999999999"), u64::MAX);
    }
}
