//! # orderhub-api
//!
//! HTTP API layer for OrderHub built on Axum.
//!
//! Provides the order status endpoint, the external cron trigger, ledger
//! reads, health, and the mapping from [`orderhub_core::error::AppError`]
//! to JSON error bodies.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
