//! Localized user-facing messages.
//!
//! The catalog is built once from configuration and held in
//! [`AppState`](crate::state::AppState); each request resolves its own
//! language through the [`Language`](crate::extractors::Language) extractor.

use tracing::warn;

use authhub_core::config::i18n::I18nConfig;

/// Messages the API shows to end users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    AuthenticationFailed,
    InvalidCredentials,
    AccountExists,
    NotFound,
    InvalidRequest,
    UnsupportedProvider,
    OAuthFailed,
    ServiceUnavailable,
    InternalError,
    LoggedOut,
    LoggedOutEverywhere,
}

type Table = fn(MessageKey) -> &'static str;

const FALLBACK_LANGUAGE: &str = "en";

/// Languages with a built-in table, by primary subtag.
const LANGUAGES: &[(&str, Table)] = &[("en", english), ("es", spanish)];

fn english(key: MessageKey) -> &'static str {
    match key {
        MessageKey::AuthenticationFailed => "Authentication failed",
        MessageKey::InvalidCredentials => "Invalid email or password",
        MessageKey::AccountExists => "An account with this email already exists",
        MessageKey::NotFound => "Resource not found",
        MessageKey::InvalidRequest => "Invalid request",
        MessageKey::UnsupportedProvider => "Unsupported sign-in provider",
        MessageKey::OAuthFailed => "Sign-in with the external provider failed",
        MessageKey::ServiceUnavailable => "Service temporarily unavailable, please retry",
        MessageKey::InternalError => "Internal server error",
        MessageKey::LoggedOut => "Logged out successfully",
        MessageKey::LoggedOutEverywhere => "Logged out from all sessions",
    }
}

fn spanish(key: MessageKey) -> &'static str {
    match key {
        MessageKey::AuthenticationFailed => "Autenticación fallida",
        MessageKey::InvalidCredentials => "Correo electrónico o contraseña inválidos",
        MessageKey::AccountExists => "Ya existe una cuenta con este correo electrónico",
        MessageKey::NotFound => "Recurso no encontrado",
        MessageKey::InvalidRequest => "Solicitud inválida",
        MessageKey::UnsupportedProvider => "Proveedor de inicio de sesión no soportado",
        MessageKey::OAuthFailed => "Falló el inicio de sesión con el proveedor externo",
        MessageKey::ServiceUnavailable => {
            "Servicio no disponible temporalmente, inténtelo de nuevo"
        }
        MessageKey::InternalError => "Error interno del servidor",
        MessageKey::LoggedOut => "Sesión cerrada correctamente",
        MessageKey::LoggedOutEverywhere => "Se cerraron todas las sesiones",
    }
}

fn table(language: &str) -> Option<(&'static str, Table)> {
    LANGUAGES
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(language))
        .copied()
}

/// Message lookup plus the server's default language.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    default_language: &'static str,
}

impl MessageCatalog {
    /// Creates a catalog. An unsupported default falls back to English.
    pub fn new(config: &I18nConfig) -> Self {
        let default_language = match table(&config.default_language) {
            Some((code, _)) => code,
            None => {
                warn!(
                    language = %config.default_language,
                    "Unsupported default language, using English"
                );
                FALLBACK_LANGUAGE
            }
        };
        Self { default_language }
    }

    /// The language used when a request asks for nothing supported.
    pub fn default_language(&self) -> &'static str {
        self.default_language
    }

    /// Canonical code for a supported language tag (`es-MX` -> `es`).
    pub fn supported(&self, tag: &str) -> Option<&'static str> {
        let primary = tag.split(['-', '_']).next().unwrap_or_default().trim();
        table(primary).map(|(code, _)| code)
    }

    /// Picks the best supported language from an `Accept-Language` value.
    pub fn negotiate(&self, accept_language: &str) -> Option<&'static str> {
        let mut ranges: Vec<(&str, f32)> = accept_language
            .split(',')
            .filter_map(|range| {
                let mut parts = range.split(';');
                let tag = parts.next()?.trim();
                if tag.is_empty() || tag == "*" {
                    return None;
                }
                let quality = parts
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .and_then(|q| q.trim().parse::<f32>().ok())
                    .unwrap_or(1.0);
                (quality > 0.0).then_some((tag, quality))
            })
            .collect();
        // Stable sort keeps header order among equal weights.
        ranges.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranges.into_iter().find_map(|(tag, _)| self.supported(tag))
    }

    /// The message for `key` in `language`, falling back to the default.
    pub fn message(&self, language: &str, key: MessageKey) -> &'static str {
        let lookup = table(language)
            .or_else(|| table(self.default_language))
            .map(|(_, t)| t)
            .unwrap_or(english);
        lookup(key)
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self {
            default_language: FALLBACK_LANGUAGE,
        }
    }
}

/// English text, for places with no request language at hand.
pub fn default_message(key: MessageKey) -> &'static str {
    english(key)
}
