//! Core type definitions used across the OrderHub workspace.

pub mod id;

pub use id::*;
