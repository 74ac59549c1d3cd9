//! Auth handlers: register, login, OAuth redirect and callback, logout.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use authhub_core::error::AppError;

use crate::dto::request::{CallbackQuery, LoginRequest, RegisterRequest, validate_request};
use crate::dto::response::{ApiResponse, AuthResponse, MessageResponse, OAuthUrlResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, Language};
use crate::i18n::MessageKey;
use crate::state::AppState;

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    lang: Language,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    let Json(req) = payload.map_err(|e| lang.error(AppError::validation(e.body_text())))?;
    validate_request(&req).map_err(|e| lang.error(e))?;

    let session = state
        .auth_service
        .register(req.into())
        .await
        .map_err(|e| lang.error(e))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(session.into()))))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    lang: Language,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let Json(req) = payload.map_err(|e| lang.error(AppError::validation(e.body_text())))?;
    validate_request(&req).map_err(|e| lang.error(e))?;

    let session = state
        .auth_service
        .login(req.into())
        .await
        .map_err(|e| lang.error(e))?;

    Ok(Json(ApiResponse::ok(session.into())))
}

/// GET /auth/oauth/{provider}
pub async fn oauth_redirect(
    State(state): State<AppState>,
    lang: Language,
    Path(provider): Path<String>,
) -> Result<Json<ApiResponse<OAuthUrlResponse>>, ApiError> {
    let redirect = state
        .auth_service
        .oauth_authorization_url(&provider)
        .map_err(|e| lang.error(e))?;

    Ok(Json(ApiResponse::ok(redirect.into())))
}

/// GET /auth/callback/{provider}?code=..&state=..
pub async fn oauth_callback(
    State(state): State<AppState>,
    lang: Language,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    if let Some(reason) = query.error {
        return Err(lang.error(AppError::oauth_exchange_failed(provider, reason)));
    }
    let code = query
        .code
        .ok_or_else(|| lang.error(AppError::validation("Missing authorization code")))?;

    let session = state
        .auth_service
        .oauth_login(&provider, &code)
        .await
        .map_err(|e| lang.error(e))?;

    Ok(Json(ApiResponse::ok(session.into())))
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    lang: Language,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .auth_service
        .logout(auth.context())
        .await
        .map_err(|e| lang.error(e))?;

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: lang.message(MessageKey::LoggedOut).to_string(),
    })))
}

/// POST /auth/logout-all
pub async fn logout_all(
    State(state): State<AppState>,
    lang: Language,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .auth_service
        .logout_all(auth.context())
        .await
        .map_err(|e| lang.error(e))?;

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: lang.message(MessageKey::LoggedOutEverywhere).to_string(),
    })))
}
