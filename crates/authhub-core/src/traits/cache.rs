//! Cache provider trait for pluggable caching backends.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for cache backends (Redis or in-memory).
///
/// Keys are plain strings; the token store is responsible for building
/// them. Every write carries an explicit TTL and backends must never
/// return an entry past its TTL.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Short backend name used in logs (`"memory"`, `"redis"`).
    fn name(&self) -> &'static str;

    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value with a TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Delete a key. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether a key exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Set the TTL on an existing key. Returns `false` if the key is absent.
    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool>;

    /// Add a member to the set stored at `key`, creating it if needed.
    async fn set_add(&self, key: &str, member: &str) -> AppResult<()>;

    /// All members of the set stored at `key` (empty if absent).
    async fn set_members(&self, key: &str) -> AppResult<Vec<String>>;

    /// Remove a member from the set stored at `key`.
    async fn set_remove(&self, key: &str, member: &str) -> AppResult<()>;

    /// Check that the cache backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
