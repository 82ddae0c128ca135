//! OAuth2 token lifecycle for the Teamleader API.
//!
//! The [`TokenManager`] guarantees that callers get a currently-valid access
//! token, refreshing it through the token endpoint when it is about to
//! expire. The [`callback`] module receives the authorization redirect for
//! command-line logins.

pub mod callback;
pub mod manager;

pub use manager::{AuthorizationOutcome, EXPIRY_MARGIN_SECS, TokenManager};
pub use teamleader_types::Credentials;
