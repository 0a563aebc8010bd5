//! Commission ledger services.

pub mod consistency;
pub mod service;

pub use consistency::{LedgerCheckReport, LedgerConsistencyChecker};
pub use service::LedgerService;
