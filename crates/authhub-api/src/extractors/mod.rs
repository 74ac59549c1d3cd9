//! Custom Axum extractors.

pub mod auth;
pub mod language;

pub use auth::AuthUser;
pub use language::Language;
