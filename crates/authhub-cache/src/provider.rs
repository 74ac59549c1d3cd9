//! Cache manager that dispatches to the configured provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use authhub_core::config::cache::{CacheBackend, CacheConfig};
use authhub_core::error::AppError;
use authhub_core::result::AppResult;
use authhub_core::traits::cache::CacheProvider;

/// Cache manager that wraps the configured cache provider.
///
/// The provider is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// The inner cache provider.
    inner: Arc<dyn CacheProvider>,
}

impl CacheManager {
    /// Create a new cache manager from configuration.
    ///
    /// Returns `Ok(None)` when the cache is disabled.
    pub async fn new(config: &CacheConfig) -> AppResult<Option<Self>> {
        let inner: Arc<dyn CacheProvider> = match config.provider {
            CacheBackend::None => {
                info!("Token cache disabled");
                return Ok(None);
            }
            #[cfg(feature = "redis-backend")]
            CacheBackend::Redis => {
                info!("Initializing Redis cache provider");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisCacheProvider::new(client))
            }
            #[cfg(feature = "memory")]
            CacheBackend::Memory => {
                info!("Initializing in-memory cache provider");
                Arc::new(crate::memory::MemoryCacheProvider::new(&config.memory))
            }
            #[allow(unreachable_patterns)]
            other => {
                return Err(AppError::configuration(format!(
                    "Cache provider '{other}' is not compiled in"
                )));
            }
        };

        Ok(Some(Self { inner }))
    }
}

#[async_trait]
impl CacheProvider for CacheManager {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.inner.exists(key).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        self.inner.expire(key, ttl).await
    }

    async fn set_add(&self, key: &str, member: &str) -> AppResult<()> {
        self.inner.set_add(key, member).await
    }

    async fn set_members(&self, key: &str) -> AppResult<Vec<String>> {
        self.inner.set_members(key).await
    }

    async fn set_remove(&self, key: &str, member: &str) -> AppResult<()> {
        self.inner.set_remove(key, member).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
