//! Connection to the Teamleader REST API.
//!
//! A [`Connection`] owns the OAuth credentials, keeps the access token valid
//! through a [`TokenManager`], signs and sends requests over a [`Transport`],
//! follows list pagination and funnels every failure through [`classify`]
//! so callers only ever see a [`TeamleaderError`].
//!
//! [`TokenManager`]: teamleader_auth::TokenManager
//! [`Transport`]: teamleader_types::Transport
//! [`TeamleaderError`]: teamleader_types::TeamleaderError

pub mod classify;
pub mod connection;
pub mod merge;
pub mod request;
pub mod response;
pub mod transport;

pub use classify::{Failure, classify};
pub use connection::{Connection, Params};
pub use merge::merge_recursive;
pub use transport::ReqwestTransport;
pub use teamleader_auth::AuthorizationOutcome;
