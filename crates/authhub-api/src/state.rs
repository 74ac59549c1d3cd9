//! Application state shared across all handlers and extractors.

use std::sync::Arc;
use std::time::Instant;

use authhub_auth::{PasswordHasher, PasswordValidator, ProviderRegistry, TokenAuthority};
use authhub_core::Clock;
use authhub_core::config::AppConfig;
use authhub_core::result::AppResult;
use authhub_core::traits::TokenCache;
use authhub_database::UserStore;
use authhub_service::{AuthService, UserService};

use crate::i18n::MessageCatalog;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Identity store (Postgres in production)
    pub store: Arc<dyn UserStore>,
    /// Token cache, possibly the no-op one
    pub token_cache: Arc<dyn TokenCache>,

    // ── Services ─────────────────────────────────────────────
    /// Sign-in flows and token checks
    pub auth_service: Arc<AuthService>,
    /// Profile lookup
    pub user_service: Arc<UserService>,

    // ── Presentation ─────────────────────────────────────────
    /// Localized user-facing messages
    pub messages: Arc<MessageCatalog>,
    /// Process start, for the uptime in `/health`
    pub started_at: Instant,
}

impl AppState {
    /// Wires the auth stack on top of a store, a token cache, and the
    /// configured identity providers.
    pub fn assemble(
        config: AppConfig,
        store: Arc<dyn UserStore>,
        token_cache: Arc<dyn TokenCache>,
        providers: ProviderRegistry,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let call_timeout = config.server.request_timeout();

        let authority = Arc::new(TokenAuthority::new(
            &config.auth,
            Arc::clone(&token_cache),
            clock,
        )?);
        let hasher = Arc::new(PasswordHasher::new(&config.auth.password_hash_cost)?);
        let validator = Arc::new(PasswordValidator::new(&config.auth));

        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&store),
            authority,
            hasher,
            validator,
            Arc::new(providers),
            call_timeout,
        ));
        let user_service = Arc::new(UserService::new(Arc::clone(&store), call_timeout));
        let messages = Arc::new(MessageCatalog::new(&config.i18n));

        Ok(Self {
            config: Arc::new(config),
            store,
            token_cache,
            auth_service,
            user_service,
            messages,
            started_at: Instant::now(),
        })
    }
}
