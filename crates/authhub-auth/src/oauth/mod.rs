//! Identity provider bridge: turns an OAuth authorization code into a
//! normalized [`OAuthIdentity`](authhub_entity::oauth::OAuthIdentity).

pub mod github;
pub mod google;
mod http;
pub mod provider;
pub mod registry;
pub mod state;

pub use github::{GitHubEndpoints, GitHubProvider};
pub use google::{GoogleEndpoints, GoogleProvider};
pub use provider::IdentityProvider;
pub use registry::ProviderRegistry;
pub use state::generate_state;
