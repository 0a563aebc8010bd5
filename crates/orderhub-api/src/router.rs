//! Route definitions for the OrderHub HTTP API.
//!
//! All routes are mounted under `/api` and receive `AppState` through
//! Axum's `State` extractor.

use axum::Router;
use axum::routing::{get, patch, post};

use crate::handlers;
use crate::state::AppState;

/// Build the API router with all routes.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(order_routes())
        .merge(cron_routes())
        .merge(ledger_routes())
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Order lifecycle endpoints
fn order_routes() -> Router<AppState> {
    Router::new().route(
        "/orders/{id}/status",
        patch(handlers::order::update_status),
    )
}

/// Endpoints called by an external scheduler
fn cron_routes() -> Router<AppState> {
    Router::new().route(
        "/cron/scheduled-notifications",
        post(handlers::cron::process_scheduled_notifications),
    )
}

/// Commission ledger reads
fn ledger_routes() -> Router<AppState> {
    Router::new().route(
        "/volunteers/{id}/progress",
        get(handlers::ledger::get_progress),
    )
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
