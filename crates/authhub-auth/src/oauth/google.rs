//! Google OAuth 2.0 provider.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use authhub_core::config::oauth::OAuthClientConfig;
use authhub_core::error::{AppError, ErrorKind};
use authhub_core::result::AppResult;
use authhub_entity::oauth::{OAuthIdentity, OAuthProvider};

use super::http::{exchange_for_access_token, get_json, normalize_email};
use super::provider::IdentityProvider;

const SCOPES: &str = "openid email profile";

/// Where the Google flow sends its requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleEndpoints {
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            authorize_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
        }
    }
}

/// Google identity provider.
#[derive(Debug, Clone)]
pub struct GoogleProvider {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    endpoints: GoogleEndpoints,
}

impl GoogleProvider {
    /// Create a provider from client credentials and its callback URI.
    pub fn new(
        client: reqwest::Client,
        credentials: &OAuthClientConfig,
        redirect_uri: String,
    ) -> Self {
        Self {
            client,
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            redirect_uri,
            endpoints: GoogleEndpoints::default(),
        }
    }

    /// Replace the Google endpoints.
    pub fn with_endpoints(mut self, endpoints: GoogleEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }
}

/// Subset of the v2 userinfo response.
#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

impl GoogleUserInfo {
    fn into_identity(self) -> OAuthIdentity {
        let email = normalize_email(self.email.as_deref());
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email.clone());
        OAuthIdentity {
            provider: OAuthProvider::Google,
            provider_id: self.id,
            email,
            name,
            avatar_url: self.picture.filter(|p| !p.is_empty()),
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn kind(&self) -> OAuthProvider {
        OAuthProvider::Google
    }

    fn authorization_url(&self, state: &str) -> AppResult<String> {
        Url::parse_with_params(
            &self.endpoints.authorize_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("state", state),
                ("access_type", "offline"),
            ],
        )
        .map(String::from)
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Internal,
                "Failed to build Google authorization URL",
                e,
            )
        })
    }

    async fn exchange_code(&self, code: &str) -> AppResult<OAuthIdentity> {
        let access_token = exchange_for_access_token(
            &self.client,
            OAuthProvider::Google,
            &self.endpoints.token_url,
            &[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ],
        )
        .await?;

        let info: GoogleUserInfo = get_json(
            &self.client,
            OAuthProvider::Google,
            &self.endpoints.userinfo_url,
            &access_token,
            "application/json",
        )
        .await?;

        debug!(provider_id = %info.id, "Fetched Google profile");
        Ok(info.into_identity())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn provider() -> GoogleProvider {
        let creds = OAuthClientConfig {
            client_id: "google-client".to_string(),
            client_secret: "shh".to_string(),
        };
        GoogleProvider::new(
            reqwest::Client::new(),
            &creds,
            "http://localhost:8080/auth/callback/google".to_string(),
        )
    }

    fn provider_at(server: &MockServer) -> GoogleProvider {
        provider().with_endpoints(GoogleEndpoints {
            authorize_url: format!("{}/o/oauth2/v2/auth", server.uri()),
            token_url: format!("{}/token", server.uri()),
            userinfo_url: format!("{}/oauth2/v2/userinfo", server.uri()),
        })
    }

    #[test]
    fn test_authorization_url_params() {
        let url = Url::parse(&provider().authorization_url("xyz123").unwrap()).unwrap();
        assert_eq!(url.host_str(), Some("accounts.google.com"));

        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "google-client");
        assert_eq!(params["redirect_uri"], "http://localhost:8080/auth/callback/google");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["scope"], "openid email profile");
        assert_eq!(params["state"], "xyz123");
        assert_eq!(params["access_type"], "offline");
        assert!(!params.contains_key("client_secret"));
    }

    #[test]
    fn test_userinfo_normalization() {
        let info: GoogleUserInfo = serde_json::from_str(
            r#"{"id":"1090","email":"Ann@Gmail.com","name":"Ann",
                "picture":"https://img/a.png","verified_email":true}"#,
        )
        .unwrap();
        let identity = info.into_identity();
        assert_eq!(identity.provider, OAuthProvider::Google);
        assert_eq!(identity.provider_id, "1090");
        assert_eq!(identity.email, "ann@gmail.com");
        assert_eq!(identity.avatar_url.as_deref(), Some("https://img/a.png"));
    }

    #[test]
    fn test_userinfo_without_name_uses_email() {
        let info: GoogleUserInfo =
            serde_json::from_str(r#"{"id":"7","email":"bob@example.com"}"#).unwrap();
        let identity = info.into_identity();
        assert_eq!(identity.name, "bob@example.com");
        assert!(identity.avatar_url.is_none());
    }

    #[tokio::test]
    async fn test_exchange_code_fetches_userinfo() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=abc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "ya29.tok", "expires_in": 3599})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/oauth2/v2/userinfo"))
            .and(header("authorization", "Bearer ya29.tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "1090",
                "email": "Ann@Gmail.com",
                "name": "Ann",
                "picture": "https://img/a.png"
            })))
            .mount(&server)
            .await;

        let identity = provider_at(&server).exchange_code("abc").await.unwrap();

        assert_eq!(identity.provider_id, "1090");
        assert_eq!(identity.email, "ann@gmail.com");
        assert_eq!(identity.name, "Ann");
    }

    #[tokio::test]
    async fn test_rejected_code_is_exchange_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})),
            )
            .mount(&server)
            .await;

        let err = provider_at(&server).exchange_code("expired").await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::OAuthExchangeFailed);
        assert!(err.message.contains("400"));
        assert!(err.message.contains("google"));
    }

    #[tokio::test]
    async fn test_userinfo_failure_is_exchange_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "t"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/oauth2/v2/userinfo"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = provider_at(&server).exchange_code("abc").await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::OAuthExchangeFailed);
    }
}
