//! Two-index token cache on top of a [`CacheProvider`].
//!
//! Forward index: `token:{digest}` holds the owner's key with the token's
//! remaining lifetime as TTL. Reverse index: `user:{key}:tokens` is a set
//! of digests whose TTL is refreshed to the newest token's TTL on every
//! insert. The reverse index is an approximation; a set may briefly list
//! digests whose forward entries already expired.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use authhub_core::bounded;
use authhub_core::config::cache::CacheConfig;
use authhub_core::error::AppError;
use authhub_core::result::AppResult;
use authhub_core::traits::{CacheProvider, TokenCache};
use authhub_core::types::UserKey;

use crate::keys;
use crate::noop::NoopTokenCache;
use crate::provider::CacheManager;

/// Token cache backed by any [`CacheProvider`].
///
/// Every provider call is bounded by the configured operation timeout.
#[derive(Debug)]
pub struct CachedTokenStore {
    provider: Arc<dyn CacheProvider>,
    op_timeout: Duration,
    closed: AtomicBool,
}

impl CachedTokenStore {
    /// Create a token store over `provider`.
    pub fn new(provider: Arc<dyn CacheProvider>, op_timeout: Duration) -> Self {
        Self {
            provider,
            op_timeout,
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> AppResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(AppError::unavailable("Token cache is closed"));
        }
        Ok(())
    }
}

#[async_trait]
impl TokenCache for CachedTokenStore {
    async fn set_token(&self, token: &str, user: UserKey, ttl: Duration) -> AppResult<()> {
        self.ensure_open()?;
        let digest = keys::token_digest(token);
        let index = keys::user_tokens(user);

        bounded(
            self.op_timeout,
            "cache set token",
            self.provider.set(&keys::token(&digest), &user.to_string(), ttl),
        )
        .await?;
        bounded(
            self.op_timeout,
            "cache index token",
            self.provider.set_add(&index, &digest),
        )
        .await?;
        bounded(
            self.op_timeout,
            "cache refresh index ttl",
            self.provider.expire(&index, ttl),
        )
        .await?;

        debug!(user_key = %user, ttl_secs = ttl.as_secs(), "Token cached");
        Ok(())
    }

    async fn get_token(&self, token: &str) -> AppResult<Option<UserKey>> {
        self.ensure_open()?;
        let key = keys::token(&keys::token_digest(token));
        let raw = bounded(self.op_timeout, "cache get token", self.provider.get(&key)).await?;

        raw.map(|value| {
            value.parse::<UserKey>().map_err(|_| {
                AppError::internal(format!("Corrupt token cache entry under '{key}'"))
            })
        })
        .transpose()
    }

    async fn delete_token(&self, token: &str) -> AppResult<()> {
        self.ensure_open()?;
        let digest = keys::token_digest(token);
        let key = keys::token(&digest);

        let owner = bounded(self.op_timeout, "cache get token", self.provider.get(&key)).await?;
        if let Some(user) = owner.and_then(|v| v.parse::<UserKey>().ok()) {
            bounded(
                self.op_timeout,
                "cache unindex token",
                self.provider.set_remove(&keys::user_tokens(user), &digest),
            )
            .await?;
        }
        bounded(self.op_timeout, "cache delete token", self.provider.delete(&key)).await?;
        Ok(())
    }

    async fn delete_user_tokens(&self, user: UserKey) -> AppResult<()> {
        self.ensure_open()?;
        let index = keys::user_tokens(user);
        let digests = bounded(
            self.op_timeout,
            "cache list user tokens",
            self.provider.set_members(&index),
        )
        .await?;

        for digest in &digests {
            bounded(
                self.op_timeout,
                "cache delete token",
                self.provider.delete(&keys::token(digest)),
            )
            .await?;
        }
        bounded(self.op_timeout, "cache delete index", self.provider.delete(&index)).await?;

        debug!(user_key = %user, count = digests.len(), "Revoked cached user tokens");
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.ensure_open()?;
        bounded(self.op_timeout, "cache health check", self.provider.health_check()).await
    }

    async fn close(&self) -> AppResult<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!(provider = self.provider.name(), "Token cache closed");
        }
        Ok(())
    }
}

/// Build the token cache selected by configuration.
///
/// The cache is optional: a disabled backend, or one that cannot be
/// reached at startup, yields [`NoopTokenCache`] and a warning rather
/// than an error.
pub async fn build_token_cache(config: &CacheConfig) -> Arc<dyn TokenCache> {
    match CacheManager::new(config).await {
        Ok(Some(manager)) => {
            info!(provider = manager.name(), "Token cache enabled");
            Arc::new(CachedTokenStore::new(
                Arc::new(manager),
                config.operation_timeout(),
            ))
        }
        Ok(None) => Arc::new(NoopTokenCache),
        Err(e) => {
            warn!(
                provider = %config.provider,
                error = %e,
                "Token cache unavailable, continuing without revocation support"
            );
            Arc::new(NoopTokenCache)
        }
    }
}
