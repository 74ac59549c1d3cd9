//! # authhub-cache
//!
//! The Token Cache and the cache providers behind it. Supports three modes:
//!
//! - **none**: [`NoopTokenCache`], validation is purely signature based
//! - **memory**: In-process cache using [moka](https://crates.io/crates/moka)
//! - **redis**: Redis-backed cache using the [redis](https://crates.io/crates/redis) crate
//!
//! The provider is selected at runtime based on configuration.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod noop;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;
pub mod token_store;

pub use noop::NoopTokenCache;
pub use provider::CacheManager;
pub use token_store::{CachedTokenStore, build_token_cache};
