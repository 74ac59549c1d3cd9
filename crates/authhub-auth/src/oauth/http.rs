//! HTTP plumbing shared by the provider implementations.

use std::time::Duration;

use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use authhub_core::error::{AppError, ErrorKind};
use authhub_core::result::AppResult;
use authhub_entity::oauth::OAuthProvider;

/// Build the client used for every provider call.
pub(crate) fn build_client(timeout: Duration) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("authhub/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                "Failed to build OAuth HTTP client",
                e,
            )
        })
}

/// Timeouts and connection failures are retryable; anything else means the
/// exchange itself failed.
pub(crate) fn transport_error(provider: OAuthProvider, e: reqwest::Error) -> AppError {
    if e.is_timeout() || e.is_connect() {
        AppError::with_source(
            ErrorKind::Unavailable,
            format!("{provider} OAuth request failed: {e}"),
            e,
        )
    } else {
        AppError::oauth_exchange_failed(provider, e)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl TokenResponse {
    /// GitHub answers 200 with an `error` field for a bad code.
    pub fn into_access_token(self, provider: OAuthProvider) -> AppResult<String> {
        match self.access_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => {
                let reason = self
                    .error_description
                    .or(self.error)
                    .unwrap_or_else(|| "no access token in response".to_string());
                Err(AppError::oauth_exchange_failed(provider, reason))
            }
        }
    }
}

/// POST the authorization code to the provider's token endpoint.
pub(crate) async fn exchange_for_access_token(
    client: &reqwest::Client,
    provider: OAuthProvider,
    url: &str,
    params: &[(&str, &str)],
) -> AppResult<String> {
    let resp = client
        .post(url)
        .header(ACCEPT, "application/json")
        .form(params)
        .send()
        .await
        .map_err(|e| transport_error(provider, e))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(AppError::oauth_exchange_failed(
            provider,
            format!("token endpoint returned HTTP {status}: {body}"),
        ));
    }

    resp.json::<TokenResponse>()
        .await
        .map_err(|e| {
            AppError::oauth_exchange_failed(provider, format!("bad token response: {e}"))
        })?
        .into_access_token(provider)
}

/// GET a JSON resource with the user's access token.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    provider: OAuthProvider,
    url: &str,
    access_token: &str,
    accept: &str,
) -> AppResult<T> {
    let resp = client
        .get(url)
        .bearer_auth(access_token)
        .header(ACCEPT, accept)
        .send()
        .await
        .map_err(|e| transport_error(provider, e))?;

    if !resp.status().is_success() {
        let status = resp.status();
        return Err(AppError::oauth_exchange_failed(
            provider,
            format!("{url} returned HTTP {status}"),
        ));
    }

    resp.json::<T>().await.map_err(|e| {
        AppError::oauth_exchange_failed(provider, format!("bad response from {url}: {e}"))
    })
}

/// Lowercase and trim a provider email.
pub(crate) fn normalize_email(email: Option<&str>) -> String {
    email.map(|e| e.trim().to_lowercase()).unwrap_or_default()
}
