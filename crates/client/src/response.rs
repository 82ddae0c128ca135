//! Decodes successful response bodies.

use serde_json::Value;
use teamleader_types::{HttpResponse, Result, TeamleaderError};

/// Decode a response body as JSON, verbatim.
///
/// An empty body (e.g. `204 No Content`) decodes to `null`.
///
/// # Errors
///
/// Returns [`TeamleaderError::Api`] with the decoder's message when the body
/// is not valid JSON.
pub fn parse_response(response: &HttpResponse) -> Result<Value> {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&response.body).map_err(|e| TeamleaderError::api(e.to_string()))
}
