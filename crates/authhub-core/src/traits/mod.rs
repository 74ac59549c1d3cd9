//! Core traits defined in `authhub-core` and implemented by other crates.

pub mod cache;
pub mod token_cache;

pub use cache::CacheProvider;
pub use token_cache::TokenCache;
