//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use authhub_core::bounded;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /health
///
/// 503 when the database is unreachable. A down cache only degrades the
/// service, since tokens still validate by signature.
pub async fn health(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let timeout = state.config.server.request_timeout();

    let database_up = matches!(
        bounded(timeout, "database health check", state.store.health_check()).await,
        Ok(true)
    );

    let cache = if !state.token_cache.is_enabled() {
        "disabled"
    } else if matches!(
        bounded(timeout, "cache health check", state.token_cache.health_check()).await,
        Ok(true)
    ) {
        "up"
    } else {
        "down"
    };

    let (status_code, status) = match (database_up, cache) {
        (false, _) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
        (true, "down") => (StatusCode::OK, "degraded"),
        (true, _) => (StatusCode::OK, "ok"),
    };

    let body = ApiResponse {
        success: database_up,
        data: HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.started_at.elapsed().as_secs(),
            database: if database_up { "up" } else { "down" }.to_string(),
            cache: cache.to_string(),
        },
    };

    (status_code, Json(body))
}
