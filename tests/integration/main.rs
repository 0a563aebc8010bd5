//! HTTP-level integration tests against the in-memory backend.

mod cron_test;
mod helpers;
mod ledger_test;
mod order_test;
