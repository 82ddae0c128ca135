//! Builds and signs outgoing API requests.

use bytes::Bytes;
use http::{HeaderValue, Method, header};
use serde_json::{Map, Value};
use teamleader_auth::TokenManager;
use teamleader_types::{HttpRequest, Result, TeamleaderError};

const JSON: &str = "application/json";

/// Build a JSON request to `url`, signed with a currently-valid bearer token.
///
/// `params`, when non-empty, are appended as a query string.
///
/// # Errors
///
/// Returns [`TeamleaderError::InvalidAccessToken`] when no token can be
/// obtained, or the token manager's error when a refresh fails.
pub async fn signed_request(
    tokens: &TokenManager,
    method: Method,
    url: &str,
    body: Option<Bytes>,
    params: Option<&Map<String, Value>>,
) -> Result<HttpRequest> {
    let access_token = tokens.access_token().await?.ok_or_else(|| {
        TeamleaderError::InvalidAccessToken("Invalid access token, please acquire a new one.".into())
    })?;

    let url = match params.map(encode_query) {
        Some(query) if !query.is_empty() => format!("{url}?{query}"),
        _ => url.to_string(),
    };

    let mut request = HttpRequest::new(method, url);
    request
        .headers
        .insert(header::ACCEPT, HeaderValue::from_static(JSON));
    request
        .headers
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON));
    let bearer = HeaderValue::from_str(&format!("Bearer {access_token}"))
        .map_err(|_| TeamleaderError::InvalidAccessToken("Access token is not a valid header value.".into()))?;
    request.headers.insert(header::AUTHORIZATION, bearer);
    request.body = body;
    Ok(request)
}

/// Encode parameters the way PHP's `http_build_query` does: nested objects
/// and arrays become `key[sub]`, booleans become `1`/`0` and nulls are left out.
#[must_use]
pub fn encode_query(params: &Map<String, Value>) -> String {
    let mut pairs = Vec::new();
    for (key, value) in params {
        flatten(key.clone(), value, &mut pairs);
    }
    serde_urlencoded::to_string(&pairs).unwrap_or_default()
}

fn flatten(prefix: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push((prefix, if *b { "1" } else { "0" }.to_string())),
        Value::Number(n) => out.push((prefix, n.to_string())),
        Value::String(s) => out.push((prefix, s.clone())),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten(format!("{prefix}[{i}]"), item, out);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                flatten(format!("{prefix}[{key}]"), item, out);
            }
        }
    }
}
