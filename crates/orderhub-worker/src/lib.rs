//! Background jobs for OrderHub.
//!
//! This crate provides:
//! - The [`JobHandler`] seam and its error type
//! - A single-flight wrapper so overlapping ticks skip instead of piling up
//! - A cron scheduler binding handlers to cron expressions
//! - Jobs for scheduled notifications and the ledger consistency check

pub mod handler;
pub mod jobs;
pub mod scheduler;

pub use handler::{GuardedJob, JobExecutionError, JobHandler, JobRun};
pub use scheduler::CronScheduler;
