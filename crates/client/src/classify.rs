//! Collapses every request failure into one of the three caller-facing kinds.
//!
//! Precedence: an invalid-access-token error passes through untouched, then a
//! `429` with a `Retry-After` header becomes
//! [`TeamleaderError::TooManyRequests`], and anything else with a response
//! becomes `"Error <status>: <message>"`. Failures without a response keep
//! their own message.

use teamleader_types::{TeamleaderError, TransportError};

pub use teamleader_types::classify::classify_response;

/// A failure raised somewhere between building a request and decoding its
/// response, before classification.
#[derive(Debug)]
pub enum Failure {
    /// Already expressed in the caller-facing taxonomy (missing token, token
    /// exchange failure, undecodable body).
    Classified(TeamleaderError),
    /// The transport failed, with or without a response.
    Transport(TransportError),
}

impl From<TeamleaderError> for Failure {
    fn from(e: TeamleaderError) -> Self {
        Self::Classified(e)
    }
}

impl From<TransportError> for Failure {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

/// Map a [`Failure`] to exactly one [`TeamleaderError`].
#[must_use]
pub fn classify(failure: Failure) -> TeamleaderError {
    match failure {
        Failure::Classified(err) => err,
        Failure::Transport(err) => err.into(),
    }
}
