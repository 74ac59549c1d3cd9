//! AuthHub Server: email/password and OAuth sign-in with signed tokens.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use authhub_auth::ProviderRegistry;
use authhub_core::config::AppConfig;
use authhub_core::error::AppError;
use authhub_core::traits::TokenCache;
use authhub_core::SystemClock;
use authhub_database::{DatabasePool, PgUserRepository};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `config/default.toml`, the environment overlay,
/// and `AUTHHUB__*` variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("AUTHHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting AuthHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db = DatabasePool::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    authhub_database::migration::run_migrations(db.pool()).await?;
    tracing::info!("Database migrations complete");

    // ── Step 2: Initialize token cache ───────────────────────────
    tracing::info!(
        "Initializing token cache (provider: {})...",
        config.cache.provider
    );
    let token_cache: Arc<dyn TokenCache> =
        authhub_cache::build_token_cache(&config.cache).await;
    if token_cache.is_enabled() {
        tracing::info!("Token cache initialized");
    } else {
        tracing::warn!("Token cache disabled; revocation is unavailable");
    }

    // ── Step 3: Initialize identity providers ────────────────────
    let providers = ProviderRegistry::from_config(&config.oauth)?;

    // ── Step 4: Initialize repositories and services ─────────────
    let store = Arc::new(PgUserRepository::new(db.pool().clone()));
    let state = authhub_api::AppState::assemble(
        config.clone(),
        store,
        Arc::clone(&token_cache),
        providers,
        Arc::new(SystemClock),
    )?;

    // ── Step 5: Build and start HTTP server ──────────────────────
    let app = authhub_api::build_router(state);
    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("AuthHub listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 6: Shutdown ─────────────────────────────────────────
    tracing::info!("Shutting down...");
    if let Err(e) = token_cache.close().await {
        tracing::warn!(error = %e, "Failed to close token cache");
    }
    db.close().await;
    tracing::info!("AuthHub stopped");

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
