//! # authhub-api
//!
//! HTTP API layer for AuthHub built on Axum.
//!
//! A thin adapter over the service layer: routes, extractors (token and
//! language), DTOs, localized error mapping, CORS, and request logging.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod i18n;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
