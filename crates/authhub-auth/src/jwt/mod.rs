//! Signed token issuance, validation, and cache-backed revocation.

pub mod authority;
pub mod claims;

pub use authority::{IssuedToken, TokenAuthority};
pub use claims::Claims;
