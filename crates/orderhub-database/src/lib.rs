//! # orderhub-database
//!
//! Persistence for OrderHub: the store traits the services depend on,
//! PostgreSQL repositories implementing them, and an in-memory backend
//! for single-node runs and tests.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;
pub mod stores;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use stores::Stores;
