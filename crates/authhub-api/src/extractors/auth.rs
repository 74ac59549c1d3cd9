//! `AuthUser` extractor: pulls the token from `X-Auth-Token`, validates it,
//! and injects the request context.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use authhub_core::config::app::AUTH_TOKEN_HEADER;
use authhub_core::error::AppError;
use authhub_service::RequestContext;

use super::language::Language;
use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let lang = Language::resolve(parts, &state.messages);

        let token = parts
            .headers
            .get(AUTH_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| lang.error(AppError::invalid_token("Missing X-Auth-Token header")))?;

        let ctx = state
            .auth_service
            .authenticate(token)
            .await
            .map_err(|e| lang.error(e))?;

        let ip_address = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string());

        Ok(AuthUser(ctx.with_ip(ip_address)))
    }
}
