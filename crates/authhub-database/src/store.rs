//! The Identity Store boundary.

use async_trait::async_trait;

use authhub_core::result::AppResult;
use authhub_core::types::UserKey;
use authhub_entity::oauth::OAuthProvider;
use authhub_entity::user::{NewUser, User};

/// Persistence for user records.
///
/// Lookups return `Ok(None)` when nothing matches; storage failures are
/// `Unavailable`. Uniqueness of email and of the provider identity is
/// enforced by the store itself, and a violation surfaces as
/// `AlreadyExists`. Soft-deleted users are invisible to every method.
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new user and return the stored row.
    async fn create(&self, user: &NewUser) -> AppResult<User>;

    /// Find a user by (already normalized) email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find a user by internal key.
    async fn find_by_key(&self, key: UserKey) -> AppResult<Option<User>>;

    /// Find a user by OAuth identity.
    async fn find_by_provider(
        &self,
        provider: OAuthProvider,
        provider_id: &str,
    ) -> AppResult<Option<User>>;

    /// Write back the mutable profile fields of an existing user.
    ///
    /// Fails with `NotFound` if the user no longer exists.
    async fn update(&self, user: &User) -> AppResult<User>;

    /// Check that the store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
