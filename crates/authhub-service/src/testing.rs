//! In-memory wiring for service tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use authhub_auth::{
    IdentityProvider, PasswordHasher, PasswordValidator, ProviderRegistry, TokenAuthority,
};
use authhub_cache::CachedTokenStore;
use authhub_cache::memory::MemoryCacheProvider;
use authhub_core::clock::ManualClock;
use authhub_core::config::auth::{AuthConfig, PasswordHashCost, RevocationPolicy};
use authhub_core::config::cache::MemoryCacheConfig;
use authhub_core::error::AppError;
use authhub_core::result::AppResult;
use authhub_core::types::UserKey;
use authhub_database::{MemoryUserRepository, UserStore};
use authhub_entity::oauth::{OAuthIdentity, OAuthProvider};
use authhub_entity::user::{NewUser, User};

use crate::auth::AuthService;
use crate::user::UserService;

/// Provider whose exchange returns whatever identity the test set.
#[derive(Debug)]
pub(crate) struct StubProvider {
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

    pub fn set_identity(&self, identity: OAuthIdentity) {
        *self.identity.lock().unwrap() = Some(identity);
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

/// Memory store whose writes to existing users always fail.
#[derive(Debug)]
pub(crate) struct ReadOnlyUpdates {
    inner: Arc<MemoryUserRepository>,
}

#[async_trait]
impl UserStore for ReadOnlyUpdates {
    async fn create(&self, user: &NewUser) -> AppResult<User> {
        self.inner.create(user).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.inner.find_by_email(email).await
    }

    async fn find_by_key(&self, key: UserKey) -> AppResult<Option<User>> {
        self.inner.find_by_key(key).await
    }

    async fn find_by_provider(
        &self,
        provider: OAuthProvider,
        provider_id: &str,
    ) -> AppResult<Option<User>> {
        self.inner.find_by_provider(provider, provider_id).await
    }

    async fn update(&self, _user: &User) -> AppResult<User> {
        Err(AppError::unavailable("database connection reset"))
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}

pub(crate) fn github_identity(name: &str, avatar: Option<&str>) -> OAuthIdentity {
    OAuthIdentity {
        provider: OAuthProvider::Github,
        provider_id: "42".to_string(),
        email: "octo@example.com".to_string(),
        name: name.to_string(),
        avatar_url: avatar.map(String::from),
    }
}

pub(crate) struct Harness {
    pub auth: AuthService,
    pub users: UserService,
    pub store: Arc<MemoryUserRepository>,
    pub github: Arc<StubProvider>,
    #[allow(dead_code)]
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(RevocationPolicy::BestEffort, false)
    }

    pub fn strict() -> Self {
        Self::build(RevocationPolicy::Strict, false)
    }

    /// Services see a store that rejects every profile update.
    pub fn failing_updates() -> Self {
        Self::build(RevocationPolicy::BestEffort, true)
    }

    fn build(revocation: RevocationPolicy, failing_updates: bool) -> Self {
        let config = AuthConfig {
            jwt_secret: "service-test-secret".to_string(),
            revocation,
            password_hash_cost: PasswordHashCost {
                memory_kib: 64,
                iterations: 1,
                parallelism: 1,
            },
            ..AuthConfig::default()
        };

        let store = Arc::new(MemoryUserRepository::new());
        let service_store: Arc<dyn UserStore> = if failing_updates {
            Arc::new(ReadOnlyUpdates {
                inner: store.clone(),
            })
        } else {
            store.clone()
        };
        let cache = Arc::new(CachedTokenStore::new(
            Arc::new(MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 1000 })),
            Duration::from_secs(1),
        ));
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let authority = Arc::new(TokenAuthority::new(&config, cache, clock.clone()).unwrap());

        let github = Arc::new(StubProvider::new(OAuthProvider::Github));
        let mut providers = ProviderRegistry::new();
        providers.register(github.clone());

        let auth = AuthService::new(
            service_store.clone(),
            authority,
            Arc::new(PasswordHasher::new(&config.password_hash_cost).unwrap()),
            Arc::new(PasswordValidator::new(&config)),
            Arc::new(providers),
            Duration::from_secs(5),
        );
        let users = UserService::new(service_store, Duration::from_secs(5));

        Self {
            auth,
            users,
            store,
            github,
            clock,
        }
    }
}
