//! StaffHub notification server.
//!
//! Main entry point that wires the crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use staffhub_api::{AppState, build_router};
use staffhub_auth::JwtDecoder;
use staffhub_core::config::AppConfig;
use staffhub_core::error::AppError;
use staffhub_realtime::{JwtAuthenticator, RealtimeEngine};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the `config/{env}` overlay, and
/// `STAFFHUB__*` environment overrides.
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("STAFFHUB_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    let env = std::env::var("STAFFHUB_ENV").unwrap_or_else(|_| "development".to_string());

    AppConfig::load_from(&config_path, &env)
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
    tracing::info!("Starting StaffHub notifications v{}", env!("CARGO_PKG_VERSION"));

    if config.auth.jwt_secret.is_empty() {
        return Err(AppError::configuration("auth.jwt_secret must be set"));
    }

    // ── Step 1: Real-time engine ─────────────────────────────────
    let realtime = Arc::new(RealtimeEngine::new(config.realtime.clone()));

    // ── Step 2: Stream authentication ────────────────────────────
    let decoder = Arc::new(JwtDecoder::new(&config.auth));
    let authenticator = Arc::new(JwtAuthenticator::new(decoder));

    // ── Step 3: Router ───────────────────────────────────────────
    let config = Arc::new(config);
    let state = AppState::new(Arc::clone(&config), Arc::clone(&realtime), authenticator);
    let app = build_router(state);

    // ── Step 4: Bind ─────────────────────────────────────────────
    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("StaffHub server listening on {}", addr);

    // ── Step 5: Graceful shutdown ────────────────────────────────
    // Open event streams never finish on their own, so the engine closes
    // them once the signal arrives. The grace period bounds the drain.
    let (stopping_tx, mut stopping_rx) = watch::channel(false);
    let engine = Arc::clone(&realtime);
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, closing notification streams...");
        engine.shutdown();
        let _ = stopping_tx.send(true);
    });

    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let grace_elapsed = async move {
        if stopping_rx.wait_for(|stopping| *stopping).await.is_ok() {
            tokio::time::sleep(grace).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = server => {
            result.map_err(|e| AppError::internal(format!("Server error: {}", e)))?;
        }
        _ = grace_elapsed => {
            tracing::warn!(
                grace_seconds = grace.as_secs(),
                "Grace period elapsed with connections still open, exiting"
            );
        }
    }

    tracing::info!("StaffHub server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
