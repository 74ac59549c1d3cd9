//! # authhub-auth
//!
//! Authentication primitives for AuthHub.
//!
//! ## Modules
//!
//! - `jwt` — the token authority: issue, validate, and revoke signed tokens
//! - `password` — Argon2id password hashing and policy enforcement
//! - `oauth` — Google and GitHub identity providers and their registry

pub mod jwt;
pub mod oauth;
pub mod password;

pub use jwt::{Claims, IssuedToken, TokenAuthority};
pub use oauth::{IdentityProvider, ProviderRegistry, generate_state};
pub use password::{PasswordHasher, PasswordValidator};
