//! Custom Axum extractors.

pub mod actor;
pub mod cron;

pub use actor::Actor;
pub use cron::CronCaller;
