//! The token authority: issues HS256 tokens and validates them against the
//! signature, the injected clock, and the optional token cache.
//!
//! The signature is authoritative. The cache accelerates validation and
//! makes logout possible, but revocation only holds while the cache keeps
//! its entries: a token whose cache entry was lost is still accepted under
//! [`RevocationPolicy::BestEffort`] until it expires.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use authhub_core::clock::Clock;
use authhub_core::config::auth::{AuthConfig, RevocationPolicy};
use authhub_core::error::AppError;
use authhub_core::result::AppResult;
use authhub_core::traits::TokenCache;
use authhub_core::types::UserKey;

use super::claims::Claims;

/// A freshly signed token and when it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues, validates, and revokes signed tokens.
#[derive(Clone)]
pub struct TokenAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    policy: RevocationPolicy,
    cache: Arc<dyn TokenCache>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("ttl", &self.ttl)
            .field("policy", &self.policy)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl TokenAuthority {
    /// Creates an authority from auth configuration.
    ///
    /// Fails with `Configuration` if the signing secret is empty.
    pub fn new(
        config: &AuthConfig,
        cache: Arc<dyn TokenCache>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        if config.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration("JWT secret must not be empty"));
        }
        let hours = i64::try_from(config.jwt_expiration_hours)
            .map_err(|_| AppError::configuration("JWT expiration is out of range"))?;

        // Expiry is checked against the injected clock, not the wall clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            ttl: Duration::hours(hours),
            policy: config.revocation,
            cache,
            clock,
        })
    }

    /// The configured revocation policy.
    pub fn policy(&self) -> RevocationPolicy {
        self.policy
    }

    /// Whether a real token cache is attached.
    pub fn has_cache(&self) -> bool {
        self.cache.is_enabled()
    }

    /// Signs a token for `user` and caches it.
    ///
    /// A cache write failure is logged and swallowed; issuance never fails
    /// because the cache is down.
    pub async fn issue_token(&self, user: UserKey, email: &str) -> AppResult<IssuedToken> {
        let now = self.clock.now();
        let expires_at = now + self.ttl;
        let claims = Claims {
            user_id: user,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().simple().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))?;

        if self.cache.is_enabled() {
            if let Err(e) = self
                .cache
                .set_token(&token, user, claims.remaining_ttl(now))
                .await
            {
                warn!(user_key = %user, error = %e, "Failed to cache issued token");
            }
        }

        debug!(user_key = %user, expires_at = %expires_at, "Token issued");
        Ok(IssuedToken { token, expires_at })
    }

    /// Validates a token and returns its claims.
    ///
    /// The signature and expiry are always checked. With a cache attached:
    /// a hit must name the same user as the claims (`TokenUserMismatch`
    /// otherwise); a miss re-populates the cache under the best-effort
    /// policy and is `TokenRevoked` under the strict policy. A cache that
    /// errors is bypassed.
    pub async fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let now = self.clock.now();
        let claims = self.verify(token, now)?;

        if !self.cache.is_enabled() {
            return Ok(claims);
        }

        match self.cache.get_token(token).await {
            Ok(Some(cached)) if cached == claims.user_id => Ok(claims),
            Ok(Some(cached)) => {
                warn!(
                    cached_user_key = %cached,
                    claimed_user_key = %claims.user_id,
                    "Cached token owner disagrees with claims"
                );
                Err(AppError::token_user_mismatch())
            }
            Ok(None) => match self.policy {
                RevocationPolicy::Strict => Err(AppError::token_revoked()),
                RevocationPolicy::BestEffort => {
                    if let Err(e) = self
                        .cache
                        .set_token(token, claims.user_id, claims.remaining_ttl(now))
                        .await
                    {
                        warn!(user_key = %claims.user_id, error = %e, "Failed to re-cache token");
                    }
                    Ok(claims)
                }
            },
            Err(e) => {
                warn!(error = %e, "Token cache lookup failed, falling back to signature");
                Ok(claims)
            }
        }
    }

    /// Removes one token from the cache. A no-op without a cache.
    ///
    /// This does not invalidate the token cryptographically.
    pub async fn revoke_token(&self, token: &str) -> AppResult<()> {
        if !self.cache.is_enabled() {
            return Ok(());
        }
        self.cache.delete_token(token).await
    }

    /// Removes every cached token of `user`. A no-op without a cache.
    ///
    /// Tokens that never made it into the cache stay valid until they expire.
    pub async fn revoke_all_user_tokens(&self, user: UserKey) -> AppResult<()> {
        if !self.cache.is_enabled() {
            return Ok(());
        }
        self.cache.delete_user_tokens(user).await
    }

    /// Signature, algorithm, and expiry check with no cache involvement.
    fn verify(&self, token: &str, now: DateTime<Utc>) -> AppResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::token_expired(),
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::invalid_token("Invalid token signature")
                }
                jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => {
                    AppError::invalid_token("Unexpected token algorithm")
                }
                _ => AppError::invalid_token(format!("Malformed token: {e}")),
            }
        })?;

        if data.claims.is_expired_at(now) {
            return Err(AppError::token_expired());
        }
        Ok(data.claims)
    }
}
