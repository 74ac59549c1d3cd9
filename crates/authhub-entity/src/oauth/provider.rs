//! Supported OAuth providers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// External identity providers a user can sign in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "oauth_provider", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    /// Google (OpenID Connect scopes).
    Google,
    /// GitHub.
    Github,
}

impl OAuthProvider {
    /// Every supported provider.
    pub const ALL: [Self; 2] = [Self::Google, Self::Github];

    /// Return the provider as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Github => "github",
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OAuthProvider {
    type Err = authhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "github" => Ok(Self::Github),
            _ => Err(authhub_core::AppError::unsupported_provider(s)),
        }
    }
}
