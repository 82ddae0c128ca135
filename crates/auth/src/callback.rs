//! Local HTTP listener that receives the OAuth authorization redirect.
//!
//! Binds `127.0.0.1:<port>`, waits for the browser to come back from the
//! authorization page, and extracts the `code` from the redirect query.

use std::{collections::HashMap, time::Duration};
use teamleader_types::{Result, TeamleaderError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const TIMEOUT: Duration = Duration::from_secs(120);
const SUCCESS_HTML: &[u8] =
    b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
    <html><body><h1>Teamleader authorization received</h1><p>You may close this tab.</p></body></html>";
const FAILURE_HTML: &[u8] =
    b"HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
    <html><body><h1>Authorization failed</h1><p>Check the terminal for details.</p></body></html>";

/// Bind the local callback port and return the listener.
///
/// Bind **before** sending the user to the authorization page, then call
/// [`accept_code`] on the returned listener.
///
/// # Errors
///
/// Returns an error if the port is already in use or cannot be bound.
pub async fn bind_callback(port: u16) -> Result<TcpListener> {
    let addr = format!("127.0.0.1:{port}");
    TcpListener::bind(&addr).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::AddrInUse {
            TeamleaderError::api(format!(
                "callback port {port} is already in use; set `callback_port` to a free port"
            ))
        } else {
            TeamleaderError::api(format!("cannot bind callback port {port}: {e}"))
        }
    })
}

/// Wait for one redirect on an already-bound listener and return its
/// authorization code. Times out after 120 seconds.
///
/// # Errors
///
/// Returns an error on accept/read failure, on timeout, or when the redirect
/// carries an OAuth `error` instead of a code.
pub async fn accept_code(listener: TcpListener) -> Result<String> {
    let accept = async {
        let (mut stream, peer) = listener
            .accept()
            .await
            .map_err(|e| TeamleaderError::api(e.to_string()))?;
        tracing::debug!(%peer, "authorization redirect received");

        let mut buf = vec![0u8; 8192];
        let n = stream
            .read(&mut buf)
            .await
            .map_err(|e| TeamleaderError::api(e.to_string()))?;

        let request = String::from_utf8_lossy(&buf[..n]);
        let code = parse_query_from_request(&request).and_then(|params| code_from_params(&params));

        let page = if code.is_ok() { SUCCESS_HTML } else { FAILURE_HTML };
        stream
            .write_all(page)
            .await
            .map_err(|e| TeamleaderError::api(format!("write error: {e}")))?;
        let _ = stream.shutdown().await;

        code
    };

    tokio::time::timeout(TIMEOUT, accept)
        .await
        .map_err(|_| TeamleaderError::api("timed out waiting for the authorization redirect"))?
}

/// Pick the authorization code out of redirect query parameters.
///
/// # Errors
///
/// Returns an error when the provider redirected with `error=..`, or when
/// there is no non-empty `code`.
pub fn code_from_params(params: &HashMap<String, String>) -> Result<String> {
    if let Some(error) = params.get("error") {
        let detail = params
            .get("error_description")
            .map_or(String::new(), |d| format!(": {d}"));
        return Err(TeamleaderError::api(format!(
            "authorization denied ({error}){detail}"
        )));
    }
    params
        .get("code")
        .filter(|c| !c.is_empty())
        .cloned()
        .ok_or_else(|| TeamleaderError::api("missing code parameter in redirect"))
}

fn parse_query_from_request(request: &str) -> Result<HashMap<String, String>> {
    // First line format: "GET /callback?code=... HTTP/1.1"
    let first_line = request.lines().next().unwrap_or("");
    let path = first_line.split_ascii_whitespace().nth(1).unwrap_or("/");
    let query = path.split_once('?').map_or("", |(_, q)| q);
    serde_urlencoded::from_str(query)
        .map_err(|e| TeamleaderError::api(format!("invalid redirect query params: {e}")))
}
