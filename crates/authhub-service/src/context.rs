//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};

use authhub_auth::Claims;
use authhub_core::types::UserKey;

/// Context for the current authenticated request.
///
/// Built from validated token claims and passed into service methods so
/// every operation knows who is acting and with which token.
#[derive(Clone)]
pub struct RequestContext {
    /// The authenticated user's internal key.
    pub user_key: UserKey,
    /// Email carried in the token.
    pub email: String,
    /// The raw token the request presented.
    pub token: String,
    /// When that token expires.
    pub token_expires_at: DateTime<Utc>,
    /// Client address, if known.
    pub ip_address: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context from validated claims.
    pub fn from_claims(claims: &Claims, token: impl Into<String>) -> Self {
        Self {
            user_key: claims.user_id,
            email: claims.email.clone(),
            token: token.into(),
            token_expires_at: claims.expires_at(),
            ip_address: None,
            request_time: Utc::now(),
        }
    }

    /// Attach the client address.
    pub fn with_ip(mut self, ip_address: Option<String>) -> Self {
        self.ip_address = ip_address;
        self
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("user_key", &self.user_key)
            .field("email", &self.email)
            .field("token", &"<redacted>")
            .field("token_expires_at", &self.token_expires_at)
            .field("ip_address", &self.ip_address)
            .field("request_time", &self.request_time)
            .finish()
    }
}
