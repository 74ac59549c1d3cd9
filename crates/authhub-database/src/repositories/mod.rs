//! User store implementations.

pub mod memory;
pub mod user;

pub use memory::MemoryUserRepository;
pub use user::PgUserRepository;

use authhub_core::error::{AppError, ErrorKind};

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Translate a sqlx error at the repository boundary.
///
/// Domain conditions keep their meaning (`NotFound`, `AlreadyExists`);
/// anything else is a retryable `Unavailable`.
pub(crate) fn map_sqlx_error(err: sqlx::Error, context: &str) -> AppError {
    match &err {
        sqlx::Error::RowNotFound => AppError::not_found(format!("{context}: user not found")),
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            let what = match db_err.constraint() {
                Some("users_email_key") => "Email is already registered",
                Some("users_provider_identity_key") => "OAuth identity is already linked",
                Some("users_external_id_key") => "External id collision",
                _ => "User already exists",
            };
            AppError::with_source(ErrorKind::AlreadyExists, what, err)
        }
        _ => AppError::with_source(ErrorKind::Unavailable, format!("{context}: {err}"), err),
    }
}
