//! User entity model.

use authhub_core::types::{ExternalId, UserKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::profile::UserProfile;
use crate::oauth::{OAuthIdentity, OAuthProvider};

/// A registered user.
///
/// Email is unique among non-deleted users, and so is the
/// `(provider, provider_id)` pair when both are present.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Internal primary key. Never exposed through the API.
    #[sqlx(rename = "id")]
    #[serde(skip_serializing)]
    pub key: UserKey,
    /// Public, immutable identifier.
    pub external_id: ExternalId,
    /// Login email, stored lowercased.
    pub email: String,
    /// Argon2 PHC string. `None` for OAuth-only accounts.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Display name.
    pub name: String,
    /// Avatar URL, usually from an OAuth profile.
    pub avatar_url: Option<String>,
    /// OAuth provider the account was created through.
    pub provider: Option<OAuthProvider>,
    /// Provider-assigned id; set together with `provider`.
    pub provider_id: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Whether the account can log in with a password.
    pub fn has_password(&self) -> bool {
        self.password_hash.as_deref().is_some_and(|h| !h.is_empty())
    }

    /// Whether the account has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether a freshly fetched OAuth profile differs from what is stored.
    pub fn needs_profile_refresh(&self, identity: &OAuthIdentity) -> bool {
        self.name != identity.name || self.avatar_url != identity.avatar_url
    }

    /// Copy the mutable profile fields from an OAuth identity.
    pub fn apply_identity(&mut self, identity: &OAuthIdentity) {
        self.name = identity.name.clone();
        self.avatar_url = identity.avatar_url.clone();
    }

    /// Public projection of this user.
    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self)
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Pre-generated public identifier.
    pub external_id: ExternalId,
    /// Normalized email.
    pub email: String,
    /// Pre-hashed password, `None` for OAuth sign-ups.
    pub password_hash: Option<String>,
    /// Display name.
    pub name: String,
    /// Avatar URL.
    pub avatar_url: Option<String>,
    /// OAuth provider.
    pub provider: Option<OAuthProvider>,
    /// Provider-assigned id.
    pub provider_id: Option<String>,
}

impl NewUser {
    /// A password account.
    pub fn with_password(email: String, name: String, password_hash: String) -> Self {
        Self {
            external_id: ExternalId::generate(),
            email,
            password_hash: Some(password_hash),
            name,
            avatar_url: None,
            provider: None,
            provider_id: None,
        }
    }

    /// An OAuth-only account built from a provider profile.
    pub fn from_identity(identity: &OAuthIdentity) -> Self {
        Self {
            external_id: ExternalId::generate(),
            email: identity.email.clone(),
            password_hash: None,
            name: identity.name.clone(),
            avatar_url: identity.avatar_url.clone(),
            provider: Some(identity.provider),
            provider_id: Some(identity.provider_id.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(name: &str, avatar: Option<&str>) -> OAuthIdentity {
        OAuthIdentity {
            provider: OAuthProvider::Github,
            provider_id: "42".to_string(),
            email: "octo@example.com".to_string(),
            name: name.to_string(),
            avatar_url: avatar.map(String::from),
        }
    }

    fn user_from(identity: &OAuthIdentity) -> User {
        let new = NewUser::from_identity(identity);
        let now = Utc::now();
        User {
            key: UserKey(1),
            external_id: new.external_id,
            email: new.email,
            password_hash: new.password_hash,
            name: new.name,
            avatar_url: new.avatar_url,
            provider: new.provider,
            provider_id: new.provider_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_oauth_user_has_no_password() {
        let user = user_from(&identity("Octo", None));
        assert!(!user.has_password());
        assert_eq!(user.provider, Some(OAuthProvider::Github));
    }

    #[test]
    fn test_profile_refresh_detects_changes() {
        let mut user = user_from(&identity("Octo", Some("https://a/1.png")));
        assert!(!user.needs_profile_refresh(&identity("Octo", Some("https://a/1.png"))));

        let fresh = identity("Octo Cat", Some("https://a/2.png"));
        assert!(user.needs_profile_refresh(&fresh));
        user.apply_identity(&fresh);
        assert_eq!(user.name, "Octo Cat");
        assert!(!user.needs_profile_refresh(&fresh));
    }

    #[test]
    fn test_serialization_hides_internal_fields() {
        let user = user_from(&identity("Octo", None));
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("key").is_none());
        assert!(json.get("password_hash").is_none());
    }
}
