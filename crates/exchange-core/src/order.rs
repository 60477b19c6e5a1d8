//! Internal order representation used inside the instrument books.
//!
//! An [`OrderRecord`] holds only the matching-relevant state of one
//! order. It is created from a [`NewOrder`] message when the order
//! arrives and, if it is not fully matched, rests in its book until it
//! is filled or cancelled.

use crate::messages::NewOrder;
use crate::side::Side;

/// A single order, incoming or resting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub order_id: u32,
    pub instrument: String,
    pub side: Side,

    /// Limit price in integer ticks.
    pub price: u32,

    /// Remaining unfilled quantity. Always `> 0` while resting.
    pub remaining_qty: u32,

    /// Number of executions against this record while it was resting.
    pub fill_seq: u32,

    /// Arrival time (nanoseconds since epoch), fixed at submission.
    pub arrival_ts: u64,
}

impl OrderRecord {
    /// Construct an `OrderRecord` from a [`NewOrder`] message stamped
    /// with its arrival time.
    pub fn from_new_order(msg: &NewOrder, arrival_ts: u64) -> Self {
        OrderRecord {
            order_id: msg.order_id,
            instrument: msg.instrument.clone(),
            side: msg.side,
            price: msg.price,
            remaining_qty: msg.quantity,
            fill_seq: 0,
            arrival_ts,
        }
    }

    /// Returns `true` if the order is fully filled.
    pub fn is_filled(&self) -> bool {
        self.remaining_qty == 0
    }

    /// Fill the order by up to `qty` units.
    ///
    /// Returns the quantity that was actually filled (which will be
    /// `<= qty` and `<= remaining_qty`).
    pub fn fill(&mut self, qty: u32) -> u32 {
        let filled = qty.min(self.remaining_qty);
        self.remaining_qty -= filled;
        filled
    }

    /// Whether this resting order may trade with `incoming` without
    /// disadvantaging it: a resting sell must not be priced above an
    /// incoming buy, a resting buy must not be priced below an
    /// incoming sell.
    pub fn is_eligible_for(&self, incoming: &OrderRecord) -> bool {
        match incoming.side {
            Side::Buy => self.price <= incoming.price,
            Side::Sell => self.price >= incoming.price,
        }
    }
}
