//! Token cache used when caching is disabled or unreachable.

use std::time::Duration;

use async_trait::async_trait;

use authhub_core::result::AppResult;
use authhub_core::traits::TokenCache;
use authhub_core::types::UserKey;

/// Stores nothing and always misses. With this cache the token authority
/// behaves as a plain stateless JWT issuer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTokenCache;

#[async_trait]
impl TokenCache for NoopTokenCache {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn set_token(&self, _token: &str, _user: UserKey, _ttl: Duration) -> AppResult<()> {
        Ok(())
    }

    async fn get_token(&self, _token: &str) -> AppResult<Option<UserKey>> {
        Ok(None)
    }

    async fn delete_token(&self, _token: &str) -> AppResult<()> {
        Ok(())
    }

    async fn delete_user_tokens(&self, _user: UserKey) -> AppResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
