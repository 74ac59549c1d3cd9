//! Maps domain `AppError` to localized HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use authhub_core::error::{AppError, ErrorKind};

use crate::dto::response::ApiErrorResponse;
use crate::i18n::{MessageKey, default_message};

/// An error on its way out as an HTTP response.
///
/// Carries the public message already resolved in the request's language.
/// Authentication failures never expose the underlying reason.
#[derive(Debug)]
pub struct ApiError {
    /// The domain error.
    pub error: AppError,
    /// Text shown to the client.
    pub message: String,
}

impl ApiError {
    /// Builds an error whose public text comes from `lookup`.
    pub fn localized(error: AppError, lookup: impl Fn(MessageKey) -> &'static str) -> Self {
        let message = match public_message_key(error.kind) {
            Some(key) => lookup(key).to_string(),
            None => error.message.clone(),
        };
        Self { error, message }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        status_for(self.error.kind)
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self::localized(error, default_message)
    }
}

/// Validation errors keep their detail; everything else gets a fixed text.
fn public_message_key(kind: ErrorKind) -> Option<MessageKey> {
    match kind {
        ErrorKind::Validation => None,
        ErrorKind::InvalidCredentials => Some(MessageKey::InvalidCredentials),
        ErrorKind::InvalidToken
        | ErrorKind::TokenExpired
        | ErrorKind::TokenUserMismatch
        | ErrorKind::TokenRevoked => Some(MessageKey::AuthenticationFailed),
        ErrorKind::AlreadyExists => Some(MessageKey::AccountExists),
        ErrorKind::NotFound => Some(MessageKey::NotFound),
        ErrorKind::UnsupportedProvider => Some(MessageKey::UnsupportedProvider),
        ErrorKind::OAuthExchangeFailed => Some(MessageKey::OAuthFailed),
        ErrorKind::Unavailable => Some(MessageKey::ServiceUnavailable),
        ErrorKind::Configuration | ErrorKind::Internal => Some(MessageKey::InternalError),
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation | ErrorKind::UnsupportedProvider => StatusCode::BAD_REQUEST,
        ErrorKind::InvalidCredentials
        | ErrorKind::InvalidToken
        | ErrorKind::TokenExpired
        | ErrorKind::TokenUserMismatch
        | ErrorKind::TokenRevoked => StatusCode::UNAUTHORIZED,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::AlreadyExists => StatusCode::CONFLICT,
        ErrorKind::OAuthExchangeFailed => StatusCode::BAD_GATEWAY,
        ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Configuration | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_code(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Validation => "VALIDATION_ERROR",
        ErrorKind::InvalidCredentials => "INVALID_CREDENTIALS",
        ErrorKind::InvalidToken
        | ErrorKind::TokenExpired
        | ErrorKind::TokenUserMismatch
        | ErrorKind::TokenRevoked => "UNAUTHORIZED",
        ErrorKind::NotFound => "NOT_FOUND",
        ErrorKind::AlreadyExists => "ALREADY_EXISTS",
        ErrorKind::UnsupportedProvider => "UNSUPPORTED_PROVIDER",
        ErrorKind::OAuthExchangeFailed => "OAUTH_EXCHANGE_FAILED",
        ErrorKind::Unavailable => "SERVICE_UNAVAILABLE",
        ErrorKind::Configuration | ErrorKind::Internal => "INTERNAL_ERROR",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.error.kind;
        match kind {
            ErrorKind::Configuration | ErrorKind::Internal => {
                tracing::error!(error = %self.error, "Internal server error");
            }
            ErrorKind::Unavailable | ErrorKind::OAuthExchangeFailed => {
                tracing::warn!(error = %self.error, "Upstream failure");
            }
            k if k.is_authentication_failure() => {
                tracing::debug!(error = %self.error, "Authentication rejected");
            }
            _ => {}
        }

        let body = ApiErrorResponse {
            success: false,
            error: error_code(kind).to_string(),
            message: self.message,
        };

        (status_for(kind), Json(body)).into_response()
    }
}
