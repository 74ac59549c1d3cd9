//! Cache key builders for token cache entries.
//!
//! Raw bearer tokens are never used as keys: the forward index and the
//! per-user reverse index both work on a SHA-256 digest of the token.
//! Backends that share a keyspace (Redis) add their configured prefix,
//! giving `auth:token:{digest}` and `auth:user:{key}:tokens`.

use sha2::{Digest, Sha256};

use authhub_core::types::UserKey;

/// Lowercase hex SHA-256 digest of a token.
pub fn token_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Forward index entry: token digest to owner key.
pub fn token(digest: &str) -> String {
    format!("token:{digest}")
}

/// Reverse index: the set of token digests issued to a user.
pub fn user_tokens(user: UserKey) -> String {
    format!("user:{user}:tokens")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_stable_hex() {
        let d = token_digest("abc");
        assert_eq!(
            d,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(token(&d), format!("token:{d}"));
    }

    #[test]
    fn test_user_tokens_key() {
        assert_eq!(user_tokens(UserKey(42)), "user:42:tokens");
    }
}
