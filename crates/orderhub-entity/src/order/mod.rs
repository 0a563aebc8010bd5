//! Order domain entities.

pub mod event;
pub mod model;
pub mod status;

pub use event::OrderStatusChanged;
pub use model::{Order, OrderChanges};
pub use status::{OrderStatus, StatusClass};
