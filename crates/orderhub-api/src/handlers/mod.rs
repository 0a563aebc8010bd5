//! HTTP request handlers grouped by domain.

pub mod cron;
pub mod health;
pub mod ledger;
pub mod order;
