//! Shared test helpers for API integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use chrono::Utc;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use authhub_api::AppState;
use authhub_auth::{IdentityProvider, ProviderRegistry};
use authhub_cache::memory::MemoryCacheProvider;
use authhub_cache::{CachedTokenStore, NoopTokenCache};
use authhub_core::clock::ManualClock;
use authhub_core::config::AppConfig;
use authhub_core::config::auth::{PasswordHashCost, RevocationPolicy};
use authhub_core::config::cache::MemoryCacheConfig;
use authhub_core::error::AppError;
use authhub_core::result::AppResult;
use authhub_core::traits::TokenCache;
use authhub_database::MemoryUserRepository;
use authhub_entity::oauth::{OAuthIdentity, OAuthProvider};

/// Identity provider that returns whatever the test configured.
#[derive(Debug)]
pub struct StubProvider {
    kind: OAuthProvider,
    identity: Mutex<Option<OAuthIdentity>>,
}

impl StubProvider {
    pub fn new(kind: OAuthProvider) -> Self {
        Self {
            kind,
            identity: Mutex::new(None),
        }
    }

    pub fn set_identity(&self, name: &str, avatar: Option<&str>) {
        *self.identity.lock().unwrap() = Some(OAuthIdentity {
            provider: self.kind,
            provider_id: "583231".to_string(),
            email: "octo@example.com".to_string(),
            name: name.to_string(),
            avatar_url: avatar.map(String::from),
        });
    }
}

#[async_trait]
impl IdentityProvider for StubProvider {
    fn kind(&self) -> OAuthProvider {
        self.kind
    }

    fn authorization_url(&self, state: &str) -> AppResult<String> {
        Ok(format!("https://idp.test/{}/authorize?state={state}", self.kind))
    }

    async fn exchange_code(&self, _code: &str) -> AppResult<OAuthIdentity> {
        self.identity
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::oauth_exchange_failed(self.kind, "bad_verification_code"))
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// In-memory identity store, for direct inspection
    pub store: Arc<MemoryUserRepository>,
    /// The GitHub provider stub
    pub github: Arc<StubProvider>,
}

impl TestApp {
    /// App with a memory token cache and best-effort revocation.
    pub fn new() -> Self {
        Self::build(RevocationPolicy::BestEffort, true)
    }

    /// App with a memory token cache and strict revocation.
    pub fn strict() -> Self {
        Self::build(RevocationPolicy::Strict, true)
    }

    /// App without a token cache.
    pub fn stateless() -> Self {
        Self::build(RevocationPolicy::BestEffort, false)
    }

    fn build(revocation: RevocationPolicy, with_cache: bool) -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "integration-test-secret".to_string();
        config.auth.revocation = revocation;
        config.auth.password_hash_cost = PasswordHashCost {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        };

        let store = Arc::new(MemoryUserRepository::new());
        let token_cache: Arc<dyn TokenCache> = if with_cache {
            Arc::new(CachedTokenStore::new(
                Arc::new(MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 1000 })),
                Duration::from_secs(1),
            ))
        } else {
            Arc::new(NoopTokenCache)
        };

        let github = Arc::new(StubProvider::new(OAuthProvider::Github));
        let mut providers = ProviderRegistry::new();
        providers.register(github.clone());

        let state = AppState::assemble(
            config,
            store.clone(),
            token_cache,
            providers,
            Arc::new(ManualClock::new(Utc::now())),
        )
        .expect("Failed to assemble app state");

        Self {
            router: authhub_api::build_router(state),
            store,
            github,
        }
    }

    /// Register a user and return the token
    pub async fn register(&self, email: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/auth/register",
                Some(serde_json::json!({
                    "email": email,
                    "password": password,
                    "name": "Test User",
                })),
                &[],
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Register failed: {:?}",
            response.body
        );
        response.token()
    }

    /// Login and return the token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/auth/login",
                Some(serde_json::json!({ "email": email, "password": password })),
                &[],
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );
        response.token()
    }

    /// Make an authenticated request with `X-Auth-Token`
    pub async fn authed(&self, method: &str, path: &str, token: &str) -> TestResponse {
        self.request(method, path, None, &[("X-Auth-Token", token)])
            .await
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();
        self.raw_request(method, path, body_str, headers).await
    }

    /// Make a request with a raw body
    pub async fn raw_request(
        &self,
        method: &str,
        path: &str,
        body: String,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        let req = req.body(Body::from(body)).expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// `data.token` of an auth response
    pub fn token(&self) -> String {
        self.body["data"]["token"]
            .as_str()
            .expect("No token in response")
            .to_string()
    }

    /// `error` code of an error response
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}
