//! # authhub-service
//!
//! Business logic for AuthHub. The [`AuthService`] orchestrates the
//! identity store, credential verifier, token authority, and identity
//! providers; [`UserService`] serves the caller's own profile.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod auth;
pub mod context;
pub mod user;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{AuthService, AuthSession, LoginInput, OAuthRedirect, RegisterInput};
pub use context::RequestContext;
pub use user::UserService;
