//! OAuth domain values.

pub mod identity;
pub mod provider;

pub use identity::OAuthIdentity;
pub use provider::OAuthProvider;
