//! Unified application error types for AuthHub.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Storage and cache failures are
//! translated at the repository boundary: domain conditions become
//! [`ErrorKind::NotFound`] / [`ErrorKind::AlreadyExists`], everything else
//! becomes the retryable [`ErrorKind::Unavailable`].

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested user or record does not exist.
    NotFound,
    /// A uniqueness constraint was violated (email, provider identity).
    AlreadyExists,
    /// Unknown email or wrong password. The two cases are never distinguished.
    InvalidCredentials,
    /// Malformed token, bad MAC, or unexpected signing algorithm.
    InvalidToken,
    /// The token is past its expiry.
    TokenExpired,
    /// The cached owner of a token disagrees with the token's claims.
    TokenUserMismatch,
    /// The token is no longer present in a reachable cache (strict revocation).
    TokenRevoked,
    /// The OAuth provider rejected the code or returned unusable data.
    OAuthExchangeFailed,
    /// The requested OAuth provider is unknown or not configured.
    UnsupportedProvider,
    /// Store, cache, or network was unreachable or timed out. Retryable.
    Unavailable,
    /// Malformed input; the caller's fault.
    Validation,
    /// A configuration error occurred.
    Configuration,
    /// An internal server error occurred.
    Internal,
}

impl ErrorKind {
    /// Whether the caller may retry the same operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }

    /// Whether this kind means "the presented credential or token is not accepted".
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::InvalidToken
                | Self::TokenExpired
                | Self::TokenUserMismatch
                | Self::TokenRevoked
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::AlreadyExists => write!(f, "ALREADY_EXISTS"),
            Self::InvalidCredentials => write!(f, "INVALID_CREDENTIALS"),
            Self::InvalidToken => write!(f, "INVALID_TOKEN"),
            Self::TokenExpired => write!(f, "TOKEN_EXPIRED"),
            Self::TokenUserMismatch => write!(f, "TOKEN_USER_MISMATCH"),
            Self::TokenRevoked => write!(f, "TOKEN_REVOKED"),
            Self::OAuthExchangeFailed => write!(f, "OAUTH_EXCHANGE_FAILED"),
            Self::UnsupportedProvider => write!(f, "UNSUPPORTED_PROVIDER"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout AuthHub.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an already-exists (uniqueness) error.
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyExists, message)
    }

    /// Create the uniform invalid-credentials error.
    ///
    /// The message is fixed so that "unknown email" and "wrong password"
    /// are indistinguishable to the caller.
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorKind::InvalidCredentials, "Invalid credentials")
    }

    /// Create an invalid-token error.
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidToken, message)
    }

    /// Create a token-expired error.
    pub fn token_expired() -> Self {
        Self::new(ErrorKind::TokenExpired, "Token has expired")
    }

    /// Create a token/user mismatch error.
    pub fn token_user_mismatch() -> Self {
        Self::new(ErrorKind::TokenUserMismatch, "Token user mismatch")
    }

    /// Create a token-revoked error.
    pub fn token_revoked() -> Self {
        Self::new(ErrorKind::TokenRevoked, "Token has been revoked")
    }

    /// Create an OAuth exchange failure carrying the provider name.
    pub fn oauth_exchange_failed(provider: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::OAuthExchangeFailed,
            format!("{provider} OAuth exchange failed: {message}"),
        )
    }

    /// Create an unsupported-provider error.
    pub fn unsupported_provider(provider: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::UnsupportedProvider,
            format!("Unsupported OAuth provider: '{provider}'"),
        )
    }

    /// Create a retryable unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unavailable, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Returns `true` if this error is of the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Internal,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        Self::with_source(ErrorKind::Unavailable, "Operation timed out", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unavailable_is_retryable() {
        assert!(ErrorKind::Unavailable.is_retryable());
        assert!(!ErrorKind::NotFound.is_retryable());
        assert!(!ErrorKind::InvalidCredentials.is_retryable());
    }

    #[test]
    fn test_invalid_credentials_message_is_fixed() {
        let a = AppError::invalid_credentials();
        let b = AppError::invalid_credentials();
        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(a.to_string(), "INVALID_CREDENTIALS: Invalid credentials");
    }

    #[test]
    fn test_oauth_error_carries_provider() {
        let err = AppError::oauth_exchange_failed("github", "bad code");
        assert_eq!(err.kind, ErrorKind::OAuthExchangeFailed);
        assert!(err.message.contains("github"));
    }
}
