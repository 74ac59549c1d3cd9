//! Message localization configuration.

use serde::{Deserialize, Serialize};

/// Localization settings for user-facing messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct I18nConfig {
    /// Language used when the request does not ask for a supported one.
    #[serde(default = "default_language")]
    pub default_language: String,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_language: default_language(),
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}
