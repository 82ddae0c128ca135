//! Core types and traits for the teamleader workspace.
//!
//! This crate defines the shared abstractions used across all layers of the
//! SDK: OAuth credentials, the caller-facing error taxonomy, the persisted token model, the page
//! cursor used for list pagination, plain HTTP request/response values, and
//! the async traits implemented by token stores and transports.

pub mod classify;
pub mod clock;
pub mod credentials;
pub mod error;
pub mod message;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod page;
pub mod token;
pub mod traits;

pub use classify::classify_response;
pub use clock::{Clock, FixedClock, SystemClock};
pub use credentials::Credentials;
pub use error::{Result, TeamleaderError};
pub use message::{HttpRequest, HttpResponse, TransportError};
pub use page::Page;
pub use token::{TokenGrant, TokenKey, TokenSet};
pub use traits::{TokenStore, Transport};
