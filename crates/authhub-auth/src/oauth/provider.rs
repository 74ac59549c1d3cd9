//! Identity provider trait.

use async_trait::async_trait;

use authhub_core::result::AppResult;
use authhub_entity::oauth::{OAuthIdentity, OAuthProvider};

/// A third-party OAuth provider.
///
/// Implementations fail with `OAuthExchangeFailed` when the provider
/// rejects the code or returns unusable data, and with `Unavailable` when
/// the provider cannot be reached in time.
#[async_trait]
pub trait IdentityProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Which provider this is.
    fn kind(&self) -> OAuthProvider;

    /// URL the user is sent to, carrying the caller's anti-CSRF `state`.
    fn authorization_url(&self, state: &str) -> AppResult<String>;

    /// Exchange an authorization code for the user's normalized identity.
    async fn exchange_code(&self, code: &str) -> AppResult<OAuthIdentity>;
}
