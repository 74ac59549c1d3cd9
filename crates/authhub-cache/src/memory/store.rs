//! In-memory cache implementation using the moka crate.
//!
//! String values and sets live in two moka caches sharing one capacity
//! limit. Sets mirror Redis: `SADD` creates a set without a TTL and
//! `EXPIRE` attaches a deadline, which moka enforces and sweeps.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use tracing::debug;

use authhub_core::config::cache::MemoryCacheConfig;
use authhub_core::result::AppResult;
use authhub_core::traits::cache::CacheProvider;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

/// Expires every entry after the TTL it was written with.
struct EntryTtl;

impl Expiry<String, Entry> for EntryTtl {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _now: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _now: Instant,
        _remaining: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

#[derive(Debug, Clone, Default)]
struct SetEntry {
    members: HashSet<String>,
    expires_at: Option<Instant>,
}

/// Expires a set at its absolute deadline, so adding a member keeps the
/// remaining TTL instead of restarting it.
struct SetDeadline;

impl SetDeadline {
    fn remaining(set: &SetEntry, now: Instant) -> Option<Duration> {
        set.expires_at.map(|at| at.saturating_duration_since(now))
    }
}

impl Expiry<String, SetEntry> for SetDeadline {
    fn expire_after_create(&self, _key: &String, set: &SetEntry, now: Instant) -> Option<Duration> {
        Self::remaining(set, now)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        set: &SetEntry,
        now: Instant,
        _remaining: Option<Duration>,
    ) -> Option<Duration> {
        Self::remaining(set, now)
    }
}

/// In-memory cache provider using moka.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// String values.
    cache: Cache<String, Entry>,
    /// Sets, kept apart because moka has no collection values.
    sets: Cache<String, SetEntry>,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(EntryTtl)
            .build();
        let sets = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(SetDeadline)
            .build();

        Self { cache, sets }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.cache
            .insert(
                key.to_string(),
                Entry {
                    value: value.to_string(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.remove(key).await;
        self.sets.remove(key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.cache.contains_key(key) || self.sets.contains_key(key))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        if let Some(mut entry) = self.cache.get(key).await {
            entry.ttl = ttl;
            self.cache.insert(key.to_string(), entry).await;
            return Ok(true);
        }

        let deadline = Instant::now() + ttl;
        let result = self
            .sets
            .entry_by_ref(key)
            .and_compute_with(|current| {
                let op = match current {
                    Some(entry) => {
                        let mut set = entry.into_value();
                        set.expires_at = Some(deadline);
                        Op::Put(set)
                    }
                    None => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;
        Ok(matches!(result, CompResult::ReplacedWith(_)))
    }

    async fn set_add(&self, key: &str, member: &str) -> AppResult<()> {
        self.sets
            .entry_by_ref(key)
            .and_compute_with(|current| {
                let mut set = current.map(|entry| entry.into_value()).unwrap_or_default();
                set.members.insert(member.to_string());
                std::future::ready(Op::Put(set))
            })
            .await;
        Ok(())
    }

    async fn set_members(&self, key: &str) -> AppResult<Vec<String>> {
        Ok(self
            .sets
            .get(key)
            .await
            .map(|set| set.members.into_iter().collect())
            .unwrap_or_default())
    }

    async fn set_remove(&self, key: &str, member: &str) -> AppResult<()> {
        let result = self
            .sets
            .entry_by_ref(key)
            .and_compute_with(|current| {
                let op = match current {
                    Some(entry) => {
                        let mut set = entry.into_value();
                        set.members.remove(member);
                        if set.members.is_empty() {
                            Op::Remove
                        } else {
                            Op::Put(set)
                        }
                    }
                    None => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;
        if matches!(result, CompResult::Removed(_)) {
            debug!(key, "Removed empty set");
        }
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_provider() -> MemoryCacheProvider {
        MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 1000 })
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let provider = make_provider();
        provider
            .set("token:a", "7", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(provider.get("token:a").await.unwrap(), Some("7".to_string()));
        assert!(provider.exists("token:a").await.unwrap());

        provider.delete("token:a").await.unwrap();
        assert_eq!(provider.get("token:a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entries_expire_individually() {
        let provider = make_provider();
        provider
            .set("short", "1", Duration::from_millis(50))
            .await
            .unwrap();
        provider
            .set("long", "2", Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(provider.get("short").await.unwrap(), None);
        assert_eq!(provider.get("long").await.unwrap(), Some("2".to_string()));
    }

    #[tokio::test]
    async fn test_set_operations() {
        let provider = make_provider();
        provider.set_add("user:1:tokens", "a").await.unwrap();
        provider.set_add("user:1:tokens", "b").await.unwrap();
        provider.set_add("user:1:tokens", "a").await.unwrap();

        let mut members = provider.set_members("user:1:tokens").await.unwrap();
        members.sort();
        assert_eq!(members, vec!["a".to_string(), "b".to_string()]);

        provider.set_remove("user:1:tokens", "a").await.unwrap();
        provider.set_remove("user:1:tokens", "b").await.unwrap();
        assert!(!provider.exists("user:1:tokens").await.unwrap());
        assert!(provider.set_members("user:1:tokens").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_expire() {
        let provider = make_provider();
        assert!(!provider.expire("missing", Duration::from_secs(1)).await.unwrap());

        provider.set_add("s", "x").await.unwrap();
        assert!(provider.expire("s", Duration::from_millis(30)).await.unwrap());
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(provider.set_members("s").await.unwrap().is_empty());
        assert!(!provider.exists("s").await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_sets_are_swept() {
        let provider = make_provider();
        for user in 0..500 {
            let key = format!("user:{user}:tokens");
            provider.set_add(&key, "digest").await.unwrap();
            provider.expire(&key, Duration::from_millis(200)).await.unwrap();
        }
        provider.sets.run_pending_tasks().await;
        assert_eq!(provider.sets.entry_count(), 500);

        tokio::time::sleep(Duration::from_millis(300)).await;
        provider.sets.run_pending_tasks().await;

        assert_eq!(provider.sets.entry_count(), 0);
    }

    #[tokio::test]
    async fn test_set_add_keeps_remaining_ttl() {
        let provider = make_provider();
        provider.set_add("s", "x").await.unwrap();
        provider.expire("s", Duration::from_millis(40)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        provider.set_add("s", "y").await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(provider.set_members("s").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sets_share_capacity_limit() {
        let provider = MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 10 });
        for user in 0..200 {
            provider
                .set_add(&format!("user:{user}:tokens"), "digest")
                .await
                .unwrap();
        }
        provider.sets.run_pending_tasks().await;

        assert!(provider.sets.entry_count() <= 10);
    }

    #[tokio::test]
    async fn test_health_check() {
        let provider = make_provider();
        assert!(provider.health_check().await.unwrap());
        assert_eq!(provider.name(), "memory");
    }
}
