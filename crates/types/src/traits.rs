//! Async traits shared across all teamleader crates.
//!
//! The two external collaborators of a connection, token persistence and the
//! HTTP transport, are defined here so that higher layers depend only on
//! `teamleader-types`, not on each other.

use crate::{HttpRequest, HttpResponse, TokenKey, TransportError, error::Result};
use async_trait::async_trait;
use std::time::Duration;

/// Key/value persistence for the OAuth token set, with per-key expiry.
///
/// Implementations must be safe to share between tasks.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Read the value for `key`; expired or missing entries are `None`.
    async fn get(&self, key: TokenKey) -> Result<Option<String>>;
    /// Write `value` under `key`, expiring the cached copy after `ttl`.
    async fn set(&self, key: TokenKey, value: &str, ttl: Duration) -> Result<()>;
    /// Remove `key`; removing a missing key is not an error.
    async fn forget(&self, key: TokenKey) -> Result<()>;
}

/// Executes a single HTTP request.
///
/// Non-success statuses are reported as a [`TransportError`] carrying the
/// response; connection failures carry none.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}
