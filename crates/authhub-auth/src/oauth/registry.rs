//! Lookup of configured identity providers by name.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use authhub_core::config::oauth::OAuthConfig;
use authhub_core::error::AppError;
use authhub_core::result::AppResult;
use authhub_entity::oauth::OAuthProvider;

use super::github::GitHubProvider;
use super::google::GoogleProvider;
use super::http::build_client;
use super::provider::IdentityProvider;

/// Configured providers. A provider without a client id is never
/// registered and resolves to `UnsupportedProvider`.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<OAuthProvider, Arc<dyn IdentityProvider>>,
}

impl ProviderRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every provider that has credentials in `config`.
    pub fn from_config(config: &OAuthConfig) -> AppResult<Self> {
        let client = build_client(Duration::from_secs(config.http_timeout_seconds))?;
        let mut registry = Self::new();

        if config.google.is_configured() {
            registry.register(Arc::new(GoogleProvider::new(
                client.clone(),
                &config.google,
                config.redirect_uri_for(OAuthProvider::Google.as_str()),
            )));
        }
        if config.github.is_configured() {
            registry.register(Arc::new(GitHubProvider::new(
                client,
                &config.github,
                config.redirect_uri_for(OAuthProvider::Github.as_str()),
            )));
        }

        info!(providers = ?registry.configured(), "OAuth providers configured");
        Ok(registry)
    }

    /// Add or replace a provider.
    pub fn register(&mut self, provider: Arc<dyn IdentityProvider>) {
        self.providers.insert(provider.kind(), provider);
    }

    /// Provider for a known kind.
    pub fn get(&self, kind: OAuthProvider) -> AppResult<Arc<dyn IdentityProvider>> {
        self.providers
            .get(&kind)
            .cloned()
            .ok_or_else(|| AppError::unsupported_provider(kind))
    }

    /// Provider by its path name (`google`, `github`).
    pub fn resolve(&self, name: &str) -> AppResult<Arc<dyn IdentityProvider>> {
        let kind: OAuthProvider = name.parse()?;
        self.get(kind)
    }

    /// Kinds with a registered provider, in declaration order.
    pub fn configured(&self) -> Vec<OAuthProvider> {
        OAuthProvider::ALL
            .iter()
            .copied()
            .filter(|k| self.providers.contains_key(k))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authhub_core::config::oauth::OAuthClientConfig;
    use authhub_core::error::ErrorKind;

    fn config_with_google() -> OAuthConfig {
        OAuthConfig {
            google: OAuthClientConfig {
                client_id: "g".to_string(),
                client_secret: "s".to_string(),
            },
            ..OAuthConfig::default()
        }
    }

    #[test]
    fn test_only_configured_providers_are_registered() {
        let registry = ProviderRegistry::from_config(&config_with_google()).unwrap();
        assert_eq!(registry.configured(), vec![OAuthProvider::Google]);

        assert_eq!(registry.resolve("google").unwrap().kind(), OAuthProvider::Google);
        let err = registry.resolve("github").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedProvider);
    }

    #[test]
    fn test_unknown_provider_name() {
        let registry = ProviderRegistry::from_config(&config_with_google()).unwrap();
        let err = registry.resolve("myspace").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedProvider);
    }

    #[test]
    fn test_redirect_uri_carries_provider() {
        let registry = ProviderRegistry::from_config(&config_with_google()).unwrap();
        let url = registry
            .get(OAuthProvider::Google)
            .unwrap()
            .authorization_url("s")
            .unwrap();
        assert!(url.contains("auth%2Fcallback%2Fgoogle"));
    }
}
