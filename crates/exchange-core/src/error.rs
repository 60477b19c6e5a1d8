//! Error types for the core matching engine.
//!
//! Only submissions can fail, and only before any state is touched:
//! a rejected order produces no events and registers nothing. A cancel
//! for an unknown identifier is not an error; it is answered with an
//! `OrderDeleted` event carrying `found = false`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Malformed input: the order carried a zero quantity.
    #[error("order {order_id}: quantity must be greater than zero")]
    InvalidQuantity { order_id: u32 },

    /// An order with this identifier is already resting.
    #[error("order {0}: identifier is already resting")]
    DuplicateOrderId(u32),
}
