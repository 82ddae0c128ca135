use serde::{Deserialize, Serialize};
use std::path::Path;
use teamleader_types::{
    Credentials,
    credentials::{DEFAULT_API_URL, DEFAULT_AUTH_URL, DEFAULT_TOKEN_URL},
};
use thiserror::Error;

/// Prefix for environment variable overrides (`TEAMLEADER_CLIENT_ID`, …).
pub const ENV_PREFIX: &str = "TEAMLEADER_";

/// A configuration that loaded fine but cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting `{0}`")]
    Missing(&'static str),
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}
fn default_auth_url() -> String {
    DEFAULT_AUTH_URL.to_string()
}
fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}
fn default_callback_port() -> u16 {
    8765
}
fn default_log_level() -> String {
    "info".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing` filter directive (defaults to `info`); `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Top-level client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OAuth client ID of the integration.
    #[serde(default)]
    pub client_id: Option<String>,
    /// OAuth client secret of the integration.
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Redirect URL registered for the integration.
    #[serde(default)]
    pub redirect_url: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// Local port the CLI listens on for the OAuth redirect (defaults to 8765).
    #[serde(default = "default_callback_port")]
    pub callback_port: u16,
    #[serde(default)]
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_url: None,
            api_url: default_api_url(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            callback_port: default_callback_port(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Parses configuration from a YAML string, merged with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the YAML is invalid or extraction fails.
    #[allow(clippy::result_large_err)]
    pub fn from_yaml(yaml: &str) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::string(yaml))
            .extract()
    }

    /// Loads defaults, then the optional YAML file, then `TEAMLEADER_*`
    /// environment variables (nested keys separated by `__`).
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the file cannot be parsed or a value
    /// has the wrong type.
    #[allow(clippy::result_large_err)]
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Env, Format as _, Serialized, Yaml},
        };
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
    }

    /// Build the immutable [`Credentials`] for a connection.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if the client ID, client secret or
    /// redirect URL is not configured.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let client_id = non_empty(self.client_id.as_deref()).ok_or(ConfigError::Missing("client_id"))?;
        let client_secret =
            non_empty(self.client_secret.as_deref()).ok_or(ConfigError::Missing("client_secret"))?;
        let redirect_url =
            non_empty(self.redirect_url.as_deref()).ok_or(ConfigError::Missing("redirect_url"))?;
        Ok(Credentials::builder()
            .client_id(client_id)
            .client_secret(client_secret)
            .redirect_url(redirect_url)
            .api_url(self.api_url.trim_end_matches('/'))
            .auth_url(self.auth_url.as_str())
            .token_url(self.token_url.as_str())
            .build())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_YAML: &str = r#"
client_id: "abc"
client_secret: "shh"
redirect_url: "https://example.com/oauth"
api_url: "https://api.example.test/"
callback_port: 9000
log:
  level: "debug"
"#;

    #[test]
    fn test_default_config() {
        let c = Config::default();
        assert_eq!(c.api_url, "https://api.teamleader.eu");
        assert_eq!(c.callback_port, 8765);
        assert_eq!(c.log.level, "info");
        assert!(c.client_id.is_none());
    }

    #[test]
    fn test_from_yaml() {
        let c = Config::from_yaml(SAMPLE_YAML).unwrap();
        assert_eq!(c.client_id.as_deref(), Some("abc"));
        assert_eq!(c.callback_port, 9000);
        assert_eq!(c.log.level, "debug");
        assert_eq!(c.token_url, DEFAULT_TOKEN_URL); // default preserved
    }

    #[test]
    fn test_credentials_from_config() {
        let creds = Config::from_yaml(SAMPLE_YAML).unwrap().credentials().unwrap();
        assert_eq!(creds.client_id(), "abc");
        assert_eq!(creds.client_secret(), "shh");
        assert_eq!(creds.api_url(), "https://api.example.test");
        assert_eq!(creds.auth_url(), DEFAULT_AUTH_URL);
    }

    #[test]
    fn test_credentials_missing_secret() {
        let c = Config::from_yaml("client_id: abc\nredirect_url: http://x").unwrap();
        let err = c.credentials().unwrap_err();
        assert_eq!(err.to_string(), "missing required setting `client_secret`");
    }

    #[test]
    fn test_credentials_blank_is_missing() {
        let c = Config::from_yaml("client_id: '  '\nclient_secret: s\nredirect_url: r").unwrap();
        assert!(matches!(c.credentials(), Err(ConfigError::Missing("client_id"))));
    }

    #[test]
    fn test_load_file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("teamleader.yaml");
        std::fs::write(&path, SAMPLE_YAML).unwrap();
        let path_for_jail = path.clone();

        figment::Jail::expect_with(move |jail| {
            jail.set_env("TEAMLEADER_CLIENT_ID", "from-env");
            jail.set_env("TEAMLEADER_LOG__LEVEL", "trace");
            let c = Config::load(Some(&path_for_jail))?;
            assert_eq!(c.client_id.as_deref(), Some("from-env"));
            assert_eq!(c.client_secret.as_deref(), Some("shh"));
            assert_eq!(c.log.level, "trace");
            Ok(())
        });
    }

    #[test]
    fn test_load_without_file() {
        figment::Jail::expect_with(|_jail| {
            let c = Config::load(None)?;
            assert_eq!(c.api_url, DEFAULT_API_URL);
            Ok(())
        });
    }
}
