//! User directory entities.

pub mod model;
pub mod role;

pub use model::{DirectoryUser, Recipient};
pub use role::UserRole;
