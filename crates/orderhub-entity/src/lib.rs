//! # orderhub-entity
//!
//! Domain entity models for OrderHub. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities additionally derive `sqlx::FromRow`.

pub mod audit;
pub mod ledger;
pub mod notification;
pub mod order;
pub mod schedule;
pub mod user;
