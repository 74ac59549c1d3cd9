//! Normalized third-party identity.

use serde::{Deserialize, Serialize};

use super::provider::OAuthProvider;

/// A provider profile reduced to the fields AuthHub stores.
///
/// Produced once per OAuth callback and consumed immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthIdentity {
    pub provider: OAuthProvider,
    /// Provider-assigned id, stringified.
    pub provider_id: String,
    /// Verified email, lowercased. May be empty when the provider has none.
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl OAuthIdentity {
    /// Whether the provider returned a usable email.
    pub fn has_email(&self) -> bool {
        !self.email.trim().is_empty()
    }
}
