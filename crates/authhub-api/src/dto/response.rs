//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use authhub_entity::oauth::OAuthProvider;
use authhub_entity::user::UserProfile;
use authhub_service::{AuthSession, OAuthRedirect};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Standard error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Machine-readable error code.
    pub error: String,
    /// Localized human-readable message.
    pub message: String,
}

/// Issued token plus the signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Token for the `X-Auth-Token` header.
    pub token: String,
    /// Token expiration.
    pub expires_at: DateTime<Utc>,
    /// User info.
    pub user: UserProfile,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            token: session.token,
            expires_at: session.expires_at,
            user: session.user,
        }
    }
}

/// Where to redirect the user for an OAuth sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthUrlResponse {
    pub provider: OAuthProvider,
    pub url: String,
    pub state: String,
}

impl From<OAuthRedirect> for OAuthUrlResponse {
    fn from(redirect: OAuthRedirect) -> Self {
        Self {
            provider: redirect.provider,
            url: redirect.url,
            state: redirect.state,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok`, `degraded` (cache down) or `unavailable` (database down).
    pub status: String,
    /// Server version.
    pub version: String,
    /// Seconds since startup.
    pub uptime_seconds: u64,
    /// `up` or `down`.
    pub database: String,
    /// `up`, `down` or `disabled`.
    pub cache: String,
}
