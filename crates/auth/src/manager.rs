//! Access-token lifecycle: read, refresh, store and clear the token set.
//!
//! Responsibilities:
//! - Read the three token keys from a [`TokenStore`]; any gap means "no token".
//! - Refresh when the token expires within [`EXPIRY_MARGIN_SECS`].
//! - Exchange authorization codes and refresh tokens at the token endpoint.
//! - Serialize concurrent refreshes so one expired token triggers one exchange.

use bytes::Bytes;
use http::{HeaderValue, Method, StatusCode, header};
use std::{sync::Arc, time::Duration};
use teamleader_types::{
    Clock, Credentials, HttpRequest, Result, TeamleaderError, TokenGrant, TokenKey, TokenSet,
    TokenStore, Transport,
};
use tokio::sync::Mutex;

/// Tokens expiring within this many seconds are refreshed before use.
pub const EXPIRY_MARGIN_SECS: u64 = 300;

/// What happened when the authorization-code flow was driven.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    /// No code yet; send the user-agent to `url` and call again with the code
    /// it comes back with.
    RedirectRequired { url: String },
    /// The code was exchanged and the tokens are stored.
    Authorized,
}

pub struct TokenManager {
    credentials: Arc<Credentials>,
    store: Arc<dyn TokenStore>,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    refresh_lock: Mutex<()>,
}

impl TokenManager {
    pub fn new(
        credentials: Arc<Credentials>,
        store: Arc<dyn TokenStore>,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            store,
            transport,
            clock,
            refresh_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Read the stored token set; `None` unless all three keys are present.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself fails.
    pub async fn token_set(&self) -> Result<Option<TokenSet>> {
        let access = self.store.get(TokenKey::AccessToken).await?;
        let refresh = self.store.get(TokenKey::RefreshToken).await?;
        let expire = self.store.get(TokenKey::TokenExpire).await?;
        Ok(TokenSet::from_parts(access, refresh, expire))
    }

    /// Return a currently-valid access token, refreshing it if it expires
    /// within [`EXPIRY_MARGIN_SECS`].
    ///
    /// Returns `Ok(None)` when no complete token set is stored; the caller
    /// has to run the authorization flow.
    ///
    /// # Errors
    ///
    /// Returns [`TeamleaderError::Api`] if a required refresh fails or the
    /// store cannot be read.
    pub async fn access_token(&self) -> Result<Option<String>> {
        let Some(set) = self.token_set().await? else {
            return Ok(None);
        };
        if !set.is_expiring(self.clock.now(), EXPIRY_MARGIN_SECS) {
            return Ok(Some(set.access_token));
        }

        self.refresh_expiring().await?;

        // Re-read what the refresh stored. A grant shorter than the margin is
        // still handed out rather than refreshed again in a loop.
        let Some(set) = self.token_set().await? else {
            return Ok(None);
        };
        if set.is_expiring(self.clock.now(), EXPIRY_MARGIN_SECS) {
            tracing::warn!(
                expires_at = set.expires_at,
                "refreshed access token is already inside the expiry margin"
            );
        }
        Ok(Some(set.access_token))
    }

    /// Whether a complete token set is stored.
    pub async fn is_authenticated(&self) -> bool {
        matches!(self.token_set().await, Ok(Some(_)))
    }

    /// Persist a token set under all three keys.
    ///
    /// Every key gets a TTL of `expires_in` seconds so the cached copy never
    /// outlives the token. If any write fails the partial set is cleared.
    ///
    /// # Errors
    ///
    /// Returns the store error of the first failed write.
    pub async fn store_tokens(
        &self,
        access_token: &str,
        refresh_token: &str,
        expires_in: u64,
        expires_at: u64,
    ) -> Result<()> {
        let ttl = Duration::from_secs(expires_in);
        let expires_at = expires_at.to_string();
        let writes = [
            (TokenKey::AccessToken, access_token),
            (TokenKey::RefreshToken, refresh_token),
            (TokenKey::TokenExpire, expires_at.as_str()),
        ];
        for (key, value) in writes {
            if let Err(e) = self.store.set(key, value, ttl).await {
                tracing::warn!(key = %key, error = %e, "token write failed, clearing partial set");
                let _ = self.clear_tokens().await;
                return Err(e);
            }
        }
        tracing::info!(expires_at = %expires_at, "access token stored");
        Ok(())
    }

    /// Forget all three token keys (logout).
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails to remove a key.
    pub async fn clear_tokens(&self) -> Result<()> {
        for key in TokenKey::ALL {
            self.store.forget(key).await?;
        }
        tracing::info!("tokens cleared");
        Ok(())
    }

    /// Drive the authorization-code flow.
    ///
    /// Without a code this only builds the redirect target. With one, the
    /// code is exchanged for a token set which is then stored.
    ///
    /// # Errors
    ///
    /// Returns [`TeamleaderError::Api`] if the token endpoint rejects the code
    /// or answers with something other than a token grant.
    pub async fn authorize(&self, code: Option<&str>) -> Result<AuthorizationOutcome> {
        let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) else {
            return Ok(AuthorizationOutcome::RedirectRequired {
                url: self.credentials.authorization_url(),
            });
        };

        let form = [
            ("code", code),
            ("client_id", self.credentials.client_id()),
            ("client_secret", self.credentials.client_secret()),
            ("redirect_uri", self.credentials.redirect_url()),
            ("grant_type", "authorization_code"),
        ];
        self.exchange(&form).await?;
        Ok(AuthorizationOutcome::Authorized)
    }

    /// Exchange the stored refresh token for a new token set.
    ///
    /// # Errors
    ///
    /// Returns [`TeamleaderError::InvalidAccessToken`] if no refresh token is
    /// stored, or [`TeamleaderError::Api`] if the exchange fails.
    pub async fn refresh(&self) -> Result<TokenSet> {
        let refresh_token = self
            .store
            .get(TokenKey::RefreshToken)
            .await?
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                TeamleaderError::InvalidAccessToken(
                    "No refresh token available, please authorize again.".into(),
                )
            })?;

        tracing::debug!("refreshing access token");
        let form = [
            ("client_id", self.credentials.client_id()),
            ("client_secret", self.credentials.client_secret()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];
        self.exchange(&form).await
    }

    /// Refresh unless another caller already did while we waited for the lock.
    async fn refresh_expiring(&self) -> Result<()> {
        let _guard = self.refresh_lock.lock().await;
        match self.token_set().await? {
            Some(set) if set.is_expiring(self.clock.now(), EXPIRY_MARGIN_SECS) => {
                self.refresh().await.map(|_| ())
            }
            _ => Ok(()),
        }
    }

    async fn exchange(&self, form: &[(&str, &str)]) -> Result<TokenSet> {
        let body = serde_urlencoded::to_string(form)
            .map_err(|e| TeamleaderError::api(format!("could not encode token request: {e}")))?;

        let mut request = HttpRequest::new(Method::POST, self.credentials.token_url());
        request.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        request
            .headers
            .insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        request.body = Some(Bytes::from(body));

        let response = self.transport.send(request).await.map_err(|e| {
            tracing::warn!(error = %e, "token exchange failed");
            TeamleaderError::from(e)
        })?;

        if response.status != StatusCode::OK {
            tracing::warn!(status = %response.status, "unexpected token endpoint status");
            return Err(TeamleaderError::api_with_status(
                "Could not acquire or refresh tokens",
                response.status.as_u16(),
            ));
        }

        let grant: TokenGrant = serde_json::from_slice(&response.body).map_err(|_| {
            TeamleaderError::api(format!(
                "Could not acquire tokens, json decode failed. Got response: {}",
                response.text()
            ))
        })?;

        let expires_at = self.clock.now().saturating_add(grant.expires_in);
        self.store_tokens(
            &grant.access_token,
            &grant.refresh_token,
            grant.expires_in,
            expires_at,
        )
        .await?;

        Ok(TokenSet {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at,
        })
    }
}
