//! `Language` extractor: the request's message language.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Query};
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::request::Parts;
use serde::Deserialize;

use authhub_core::error::AppError;

use crate::error::ApiError;
use crate::i18n::{MessageCatalog, MessageKey};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct LangQuery {
    lang: Option<String>,
}

/// Resolved language for one request, with access to the catalog.
///
/// `?lang=` wins over `Accept-Language`; anything unsupported falls back
/// to the configured default.
#[derive(Debug, Clone)]
pub struct Language {
    code: &'static str,
    catalog: Arc<MessageCatalog>,
}

impl Language {
    /// Resolves the language from request parts.
    pub fn resolve(parts: &Parts, catalog: &Arc<MessageCatalog>) -> Self {
        let from_query = Query::<LangQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.lang)
            .and_then(|tag| catalog.supported(&tag));

        let code = from_query
            .or_else(|| {
                parts
                    .headers
                    .get(ACCEPT_LANGUAGE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| catalog.negotiate(v))
            })
            .unwrap_or_else(|| catalog.default_language());

        Self {
            code,
            catalog: Arc::clone(catalog),
        }
    }

    /// Language code, e.g. `en`.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// A message in this language.
    pub fn message(&self, key: MessageKey) -> &'static str {
        self.catalog.message(self.code, key)
    }

    /// Converts a domain error into a response localized for this request.
    pub fn error(&self, error: AppError) -> ApiError {
        ApiError::localized(error, |key| self.message(key))
    }
}

impl FromRequestParts<AppState> for Language {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::resolve(parts, &state.messages))
    }
}
