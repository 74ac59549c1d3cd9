//! Inputs and outputs of the authentication flows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use authhub_entity::oauth::OAuthProvider;
use authhub_entity::user::UserProfile;

/// Data for a password registration.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Data for a password login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Result of every successful sign-in flow.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    /// Signed token to present in `X-Auth-Token`.
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserProfile,
}

/// Where to send the user to start an OAuth flow.
#[derive(Debug, Clone, Serialize)]
pub struct OAuthRedirect {
    pub provider: OAuthProvider,
    pub url: String,
    /// Anti-CSRF value the callback must echo back.
    pub state: String,
}
