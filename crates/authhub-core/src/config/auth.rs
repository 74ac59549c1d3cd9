//! Token and password configuration.

use serde::{Deserialize, Serialize};

/// How token validation treats a cache miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationPolicy {
    /// A miss falls back to the signature and re-populates the cache.
    #[default]
    BestEffort,
    /// A miss in a reachable cache means the token was revoked.
    ///
    /// A token whose entry was evicted for capacity, or whose cache write
    /// failed at issuance, is rejected too until it is reissued.
    Strict,
}

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256). Must be non-empty.
    #[serde(default)]
    pub jwt_secret: String,
    /// Token lifetime in hours.
    #[serde(default = "default_expiration_hours")]
    pub jwt_expiration_hours: u64,
    /// Cache-miss handling during validation.
    #[serde(default)]
    pub revocation: RevocationPolicy,
    /// Minimum password length at registration.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Argon2 work factor.
    #[serde(default)]
    pub password_hash_cost: PasswordHashCost,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_expiration_hours: default_expiration_hours(),
            revocation: RevocationPolicy::default(),
            password_min_length: default_password_min(),
            password_hash_cost: PasswordHashCost::default(),
        }
    }
}

/// Argon2id parameters. Fixed at startup so every hash in a deployment
/// costs the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHashCost {
    /// Memory size in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Number of passes.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for PasswordHashCost {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

fn default_expiration_hours() -> u64 {
    24
}

fn default_password_min() -> usize {
    6
}

fn default_memory_kib() -> u32 {
    19_456
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}
