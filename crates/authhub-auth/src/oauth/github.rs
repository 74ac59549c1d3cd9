//! GitHub OAuth provider.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

use authhub_core::config::oauth::OAuthClientConfig;
use authhub_core::error::{AppError, ErrorKind};
use authhub_core::result::AppResult;
use authhub_entity::oauth::{OAuthIdentity, OAuthProvider};

use super::http::{exchange_for_access_token, get_json, normalize_email};
use super::provider::IdentityProvider;

const API_ACCEPT: &str = "application/vnd.github+json";
const SCOPES: &str = "user:email";

/// Where the GitHub flow sends its requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubEndpoints {
    /// Browser-facing consent page.
    pub authorize_url: String,
    /// Code-for-token exchange.
    pub token_url: String,
    /// REST API root; `/user` and `/user/emails` hang off it.
    pub api_base: String,
}

impl Default for GitHubEndpoints {
    fn default() -> Self {
        Self {
            authorize_url: "https://github.com/login/oauth/authorize".to_string(),
            token_url: "https://github.com/login/oauth/access_token".to_string(),
            api_base: "https://api.github.com".to_string(),
        }
    }
}

impl GitHubEndpoints {
    fn user_url(&self) -> String {
        format!("{}/user", self.api_base.trim_end_matches('/'))
    }

    fn emails_url(&self) -> String {
        format!("{}/user/emails", self.api_base.trim_end_matches('/'))
    }
}

/// GitHub identity provider.
#[derive(Debug, Clone)]
pub struct GitHubProvider {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    endpoints: GitHubEndpoints,
}

impl GitHubProvider {
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
            endpoints: GitHubEndpoints::default(),
        }
    }

    /// Replace the GitHub endpoints, e.g. for GitHub Enterprise.
    pub fn with_endpoints(mut self, endpoints: GitHubEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Users with a private email only expose it through `/user/emails`.
    async fn primary_email(&self, access_token: &str) -> AppResult<Option<String>> {
        let emails: Vec<GitHubEmail> = get_json(
            &self.client,
            OAuthProvider::Github,
            &self.endpoints.emails_url(),
            access_token,
            API_ACCEPT,
        )
        .await?;
        Ok(pick_primary_email(emails))
    }
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    id: i64,
    login: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
}

impl GitHubUser {
    fn into_identity(self, email: Option<String>) -> OAuthIdentity {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(self.login);
        OAuthIdentity {
            provider: OAuthProvider::Github,
            provider_id: self.id.to_string(),
            email: normalize_email(email.as_deref()),
            name,
            avatar_url: self.avatar_url.filter(|a| !a.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GitHubEmail {
    email: String,
    #[serde(default)]
    primary: bool,
}

fn pick_primary_email(emails: Vec<GitHubEmail>) -> Option<String> {
    emails.into_iter().find(|e| e.primary).map(|e| e.email)
}

#[async_trait]
impl IdentityProvider for GitHubProvider {
    fn kind(&self) -> OAuthProvider {
        OAuthProvider::Github
    }

    fn authorization_url(&self, state: &str) -> AppResult<String> {
        Url::parse_with_params(
            &self.endpoints.authorize_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", SCOPES),
                ("state", state),
            ],
        )
        .map(String::from)
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Internal,
                "Failed to build GitHub authorization URL",
                e,
            )
        })
    }

    async fn exchange_code(&self, code: &str) -> AppResult<OAuthIdentity> {
        let access_token = exchange_for_access_token(
            &self.client,
            OAuthProvider::Github,
            &self.endpoints.token_url,
            &[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
            ],
        )
        .await?;

        let user: GitHubUser = get_json(
            &self.client,
            OAuthProvider::Github,
            &self.endpoints.user_url(),
            &access_token,
            API_ACCEPT,
        )
        .await?;
        debug!(provider_id = user.id, login = %user.login, "Fetched GitHub profile");

        let email = match user.email.clone().filter(|e| !e.trim().is_empty()) {
            Some(email) => Some(email),
            None => match self.primary_email(&access_token).await {
                Ok(email) => email,
                // No email is reported upstream as an exchange failure.
                Err(e) if !e.kind.is_retryable() => {
                    warn!(error = %e, "GitHub email lookup failed");
                    None
                }
                Err(e) => return Err(e),
            },
        };

        Ok(user.into_identity(email))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn credentials() -> OAuthClientConfig {
        OAuthClientConfig {
            client_id: "gh-client".to_string(),
            client_secret: "shh".to_string(),
        }
    }

    fn provider() -> GitHubProvider {
        GitHubProvider::new(
            reqwest::Client::new(),
            &credentials(),
            "http://localhost:8080/auth/callback/github".to_string(),
        )
    }

    fn provider_at(server: &MockServer, client: reqwest::Client) -> GitHubProvider {
        GitHubProvider::new(
            client,
            &credentials(),
            "http://localhost:8080/auth/callback/github".to_string(),
        )
        .with_endpoints(GitHubEndpoints {
            authorize_url: format!("{}/login/oauth/authorize", server.uri()),
            token_url: format!("{}/login/oauth/access_token", server.uri()),
            api_base: server.uri(),
        })
    }

    async fn mount_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .and(body_string_contains("code=good-code"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "gho_abc", "token_type": "bearer"})),
            )
            .mount(server)
            .await;
    }

    async fn mount_user(server: &MockServer, email: Option<&str>) {
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "Bearer gho_abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 583231,
                "login": "octocat",
                "name": null,
                "email": email,
                "avatar_url": "https://avatars/u/583231"
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn test_authorization_url_params() {
        let url = Url::parse(&provider().authorization_url("st8").unwrap()).unwrap();
        assert_eq!(url.host_str(), Some("github.com"));
        assert_eq!(url.path(), "/login/oauth/authorize");

        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "gh-client");
        assert_eq!(params["redirect_uri"], "http://localhost:8080/auth/callback/github");
        assert_eq!(params["scope"], "user:email");
        assert_eq!(params["state"], "st8");
    }

    #[test]
    fn test_numeric_id_is_stringified() {
        let user: GitHubUser = serde_json::from_str(
            r#"{"id":583231,"login":"octocat","name":"The Octocat","email":"Octo@GitHub.com"}"#,
        )
        .unwrap();
        let email = user.email.clone();
        let identity = user.into_identity(email);
        assert_eq!(identity.provider_id, "583231");
        assert_eq!(identity.email, "octo@github.com");
        assert_eq!(identity.name, "The Octocat");
    }

    #[test]
    fn test_primary_email_is_selected() {
        let emails: Vec<GitHubEmail> = serde_json::from_str(
            r#"[
                {"email":"old@example.com","primary":false,"verified":true},
                {"email":"Main@Example.com","primary":true,"verified":true}
            ]"#,
        )
        .unwrap();
        assert_eq!(pick_primary_email(emails).as_deref(), Some("Main@Example.com"));
        assert_eq!(pick_primary_email(Vec::new()), None);
    }

    #[tokio::test]
    async fn test_exchange_with_public_email() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        mount_user(&server, Some("Octo@GitHub.com")).await;

        let identity = provider_at(&server, reqwest::Client::new())
            .exchange_code("good-code")
            .await
            .unwrap();

        assert_eq!(identity.provider, OAuthProvider::Github);
        assert_eq!(identity.provider_id, "583231");
        assert_eq!(identity.email, "octo@github.com");
        assert_eq!(identity.name, "octocat");
        assert_eq!(identity.avatar_url.as_deref(), Some("https://avatars/u/583231"));
    }

    #[tokio::test]
    async fn test_private_email_falls_back_to_emails_endpoint() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        mount_user(&server, None).await;
        Mock::given(method("GET"))
            .and(path("/user/emails"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"email": "old@example.com", "primary": false, "verified": true},
                {"email": "Main@Example.com", "primary": true, "verified": true}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let identity = provider_at(&server, reqwest::Client::new())
            .exchange_code("good-code")
            .await
            .unwrap();

        assert_eq!(identity.email, "main@example.com");
    }

    #[tokio::test]
    async fn test_failed_email_lookup_yields_empty_email() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        mount_user(&server, None).await;
        Mock::given(method("GET"))
            .and(path("/user/emails"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let identity = provider_at(&server, reqwest::Client::new())
            .exchange_code("good-code")
            .await
            .unwrap();

        assert!(!identity.has_email());
    }

    #[tokio::test]
    async fn test_email_lookup_timeout_is_unavailable() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        mount_user(&server, None).await;
        Mock::given(method("GET"))
            .and(path("/user/emails"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(500))
            .build()
            .unwrap();
        let err = provider_at(&server, client)
            .exchange_code("good-code")
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Unavailable);
    }

    #[tokio::test]
    async fn test_token_error_field_is_exchange_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": "bad_verification_code",
                "error_description": "The code passed is incorrect or expired."
            })))
            .mount(&server)
            .await;

        let err = provider_at(&server, reqwest::Client::new())
            .exchange_code("stale-code")
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::OAuthExchangeFailed);
        assert!(err.message.contains("incorrect or expired"));
    }
}
