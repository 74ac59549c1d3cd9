//! The token cache seen by the token authority.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::UserKey;

/// Maps issued tokens to their owner and keeps a per-user index so every
/// token of one user can be revoked at once.
///
/// The cache is optional: [`TokenCache::is_enabled`] returns `false` for the
/// no-op implementation, and callers then rely on the signature alone.
#[async_trait]
pub trait TokenCache: Send + Sync + std::fmt::Debug + 'static {
    /// Whether this cache actually stores anything.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Store `token -> user` with a TTL and add the token to the user's index.
    async fn set_token(&self, token: &str, user: UserKey, ttl: Duration) -> AppResult<()>;

    /// The owner of a cached token, `None` on a miss.
    async fn get_token(&self, token: &str) -> AppResult<Option<UserKey>>;

    /// Remove one token and its index entry.
    async fn delete_token(&self, token: &str) -> AppResult<()>;

    /// Remove every token in the user's index, then the index itself.
    async fn delete_user_tokens(&self, user: UserKey) -> AppResult<()>;

    /// Check that the backing store is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Stop using the backing store. Later calls fail with `Unavailable`.
    async fn close(&self) -> AppResult<()> {
        Ok(())
    }
}
