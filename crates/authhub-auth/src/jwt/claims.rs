//! JWT claims structure carried inside every token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use authhub_core::types::UserKey;

/// JWT claims payload.
///
/// Reconstructed from a validated token; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Internal key of the token owner.
    pub user_id: UserKey,
    /// Owner's email at issuance.
    pub email: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Random token id; keeps tokens issued in the same second distinct.
    pub jti: String,
}

impl Claims {
    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Whether the token is expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Remaining lifetime at `now`, zero if expired.
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> std::time::Duration {
        let remaining = self.exp - now.timestamp();
        std::time::Duration::from_secs(remaining.max(0) as u64)
    }
}
