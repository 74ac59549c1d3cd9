//! External identity provider configuration.

use serde::{Deserialize, Serialize};

/// OAuth configuration shared by all providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Base callback URL; the provider name is appended
    /// (e.g. `http://localhost:8080/auth/callback` + `/google`).
    #[serde(default = "default_redirect_url")]
    pub redirect_url: String,
    /// Timeout for calls to provider token and profile endpoints.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
    /// Google credentials.
    #[serde(default)]
    pub google: OAuthClientConfig,
    /// GitHub credentials.
    #[serde(default)]
    pub github: OAuthClientConfig,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            redirect_url: default_redirect_url(),
            http_timeout_seconds: default_http_timeout(),
            google: OAuthClientConfig::default(),
            github: OAuthClientConfig::default(),
        }
    }
}

impl OAuthConfig {
    /// Redirect URI registered for a given provider.
    pub fn redirect_uri_for(&self, provider: &str) -> String {
        format!("{}/{provider}", self.redirect_url.trim_end_matches('/'))
    }
}

/// Client credentials for one provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OAuthClientConfig {
    /// Application client id. An empty id disables the provider.
    #[serde(default)]
    pub client_id: String,
    /// Application client secret.
    #[serde(default)]
    pub client_secret: String,
}

impl OAuthClientConfig {
    /// Whether this provider has credentials.
    pub fn is_configured(&self) -> bool {
        !self.client_id.trim().is_empty()
    }
}

fn default_redirect_url() -> String {
    "http://localhost:8080/auth/callback".to_string()
}

fn default_http_timeout() -> u64 {
    10
}
