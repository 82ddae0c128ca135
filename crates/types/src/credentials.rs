//! OAuth application credentials and the fixed endpoint URLs.

use bon::Builder;

/// API base URL for resource calls.
pub const DEFAULT_API_URL: &str = "https://api.teamleader.eu";

/// Authorization endpoint the user-agent is redirected to.
pub const DEFAULT_AUTH_URL: &str = "https://app.teamleader.eu/oauth2/authorize";

/// Token endpoint for both the authorization-code and refresh-token grants.
pub const DEFAULT_TOKEN_URL: &str = "https://app.teamleader.eu/oauth2/access_token";

/// OAuth client credentials plus the URLs they are used against.
///
/// Immutable once built.
#[derive(Debug, Clone, Builder)]
pub struct Credentials {
    #[builder(into)]
    client_id: String,
    #[builder(into)]
    client_secret: String,
    #[builder(into)]
    redirect_url: String,
    #[builder(into, default = DEFAULT_AUTH_URL.to_string())]
    auth_url: String,
    #[builder(into, default = DEFAULT_TOKEN_URL.to_string())]
    token_url: String,
    #[builder(into, default = DEFAULT_API_URL.to_string())]
    api_url: String,
}

impl Credentials {
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    #[must_use]
    pub fn redirect_url(&self) -> &str {
        &self.redirect_url
    }

    #[must_use]
    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    #[must_use]
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// The URL the user-agent must visit to grant access.
    #[must_use]
    pub fn authorization_url(&self) -> String {
        let query = serde_urlencoded::to_string(&[
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_url.as_str()),
            ("response_type", "code"),
        ])
        .unwrap_or_default();
        format!("{}?{query}", self.auth_url)
    }

    /// Resolve a resource endpoint against the API base URL.
    #[must_use]
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.api_url)
    }
}
