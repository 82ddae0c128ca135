//! OAuth token representation and expiry logic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three keys under which a token set is persisted in a [`TokenStore`].
///
/// [`TokenStore`]: crate::TokenStore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKey {
    AccessToken,
    RefreshToken,
    TokenExpire,
}

impl TokenKey {
    /// All keys, in the order they are written.
    pub const ALL: [Self; 3] = [Self::AccessToken, Self::RefreshToken, Self::TokenExpire];

    /// The storage key name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccessToken => "accessToken",
            Self::RefreshToken => "refreshToken",
            Self::TokenExpire => "tokenExpire",
        }
    }
}

impl fmt::Display for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete set of persisted tokens.
///
/// Either all three fields are known or there is no token at all; a store
/// holding only some of the keys is read as "no token".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp (seconds) at which the access token stops being valid.
    pub expires_at: u64,
}

impl TokenSet {
    /// Build a token set from the raw stored values.
    ///
    /// Returns `None` if any value is missing or empty, or if the expiry is
    /// not a positive integer timestamp.
    #[must_use]
    pub fn from_parts(
        access_token: Option<String>,
        refresh_token: Option<String>,
        expires_at: Option<String>,
    ) -> Option<Self> {
        let access_token = access_token.filter(|v| !v.is_empty())?;
        let refresh_token = refresh_token.filter(|v| !v.is_empty())?;
        let expires_at = expires_at?.trim().parse::<u64>().ok().filter(|t| *t > 0)?;
        Some(Self {
            access_token,
            refresh_token,
            expires_at,
        })
    }

    /// Return `true` if the token expires at or before `now + margin_secs`.
    #[must_use]
    pub fn is_expiring(&self, now: u64, margin_secs: u64) -> bool {
        self.expires_at <= now.saturating_add(margin_secs)
    }
}

/// The JSON body returned by the token endpoint for both grant types.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: Option<String>,
}
