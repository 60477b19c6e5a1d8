//! Message types used by the core matching engine.
//!
//! These are **transport-agnostic** logical messages:
//! - [`InputMessage`]: what the engine consumes.
//! - [`OutputMessage`]: what the engine produces.
//!
//! Every output event carries two timestamps: the arrival time of the
//! request that triggered it and the time the event itself was produced.
//!
//! Note: Binary / CSV encoders live in the `exchange-protocol` crate;
//! this module is purely logical.

use crate::side::Side;

/// A request into the matching engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMessage {
    /// New limit order (Buy or Sell).
    NewOrder(NewOrder),

    /// Cancel a resting order by identifier.
    Cancel(Cancel),
}

/// An event emitted by the matching engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMessage {
    /// An order (or its unmatched remainder) now rests in its book.
    OrderAdded(OrderAdded),

    /// An incoming order traded against a resting order.
    OrderExecuted(OrderExecuted),

    /// Outcome of a cancel request.
    OrderDeleted(OrderDeleted),
}

/// New order message (input).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    /// Externally assigned identifier, unique among resting orders.
    pub order_id: u32,

    /// Instrument symbol, e.g. `"ABC"`.
    pub instrument: String,

    /// Limit price in integer ticks.
    pub price: u32,

    /// Requested quantity. Zero is rejected by the engine.
    pub quantity: u32,

    pub side: Side,
}

/// Cancel message (input).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancel {
    pub order_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderAdded {
    pub order_id: u32,
    pub instrument: String,
    pub price: u32,
    /// Quantity left resting after any matching on arrival.
    pub remaining_qty: u32,
    pub side: Side,
    pub arrival_ts: u64,
    pub event_ts: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderExecuted {
    pub resting_order_id: u32,
    pub incoming_order_id: u32,
    /// The resting order's fill-sequence number after this execution.
    pub fill_seq: u32,
    /// Execution price: always the resting (maker) order's price.
    pub price: u32,
    pub quantity: u32,
    pub arrival_ts: u64,
    pub event_ts: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderDeleted {
    pub order_id: u32,
    /// `true` when a resting order was found and removed.
    pub found: bool,
    pub arrival_ts: u64,
    pub event_ts: u64,
}

impl InputMessage {
    /// The order identifier this message refers to.
    pub fn order_id(&self) -> u32 {
        match self {
            InputMessage::NewOrder(n) => n.order_id,
            InputMessage::Cancel(c) => c.order_id,
        }
    }
}

impl OutputMessage {
    /// Timestamp at which the event was produced.
    pub fn event_ts(&self) -> u64 {
        match self {
            OutputMessage::OrderAdded(a) => a.event_ts,
            OutputMessage::OrderExecuted(e) => e.event_ts,
            OutputMessage::OrderDeleted(d) => d.event_ts,
        }
    }
}
