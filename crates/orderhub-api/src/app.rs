//! Application builder: wires router, middleware, state, and the
//! background scheduler into a running server.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use orderhub_core::config::AppConfig;
use orderhub_core::error::AppError;
use orderhub_database::Stores;
use orderhub_worker::CronScheduler;
use orderhub_worker::jobs::{LedgerCheckJob, ScheduledNotificationJob};

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Runs the OrderHub server until Ctrl+C or SIGTERM.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting OrderHub server...");

    // ── Step 1: Stores ───────────────────────────────────────────
    let stores = Stores::connect(&config.database, config.ledger.default_goal).await?;

    // ── Step 2: Services ─────────────────────────────────────────
    let state = AppState::new(config.clone(), stores.clone());

    // ── Step 3: Background scheduler ─────────────────────────────
    let mut scheduler = if config.worker.enabled {
        let scheduler = CronScheduler::new().await?;
        scheduler
            .register_default_jobs(
                &config.worker,
                Arc::new(ScheduledNotificationJob::new(Arc::clone(&state.processor))),
                Arc::new(LedgerCheckJob::new(Arc::clone(&state.ledger_checker))),
            )
            .await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("In-process scheduler disabled; relying on the cron endpoint");
        None
    };

    // ── Step 4: HTTP server ──────────────────────────────────────
    let app = build_app(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("OrderHub server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 5: Drain ────────────────────────────────────────────
    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.shutdown().await?;
    }
    stores.close().await;
    tracing::info!("OrderHub server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
