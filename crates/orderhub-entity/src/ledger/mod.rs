//! Commission ledger entities.

pub mod model;

pub use model::{ChallengeProgress, DEFAULT_GOAL, LedgerDelta};
