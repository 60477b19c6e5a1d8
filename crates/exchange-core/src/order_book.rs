//! Single-instrument order book.
//!
//! One [`InstrumentBook`] exists per symbol for the lifetime of the
//! engine. It holds two arrival-ordered sequences of resting orders,
//! one per side, behind a single lock.
//!
//! Each resting order occupies a *slot*: a per-book sequence number
//! handed out on insertion and never reused. Slots keep arrival order
//! (a `BTreeMap` iterates them ascending) and double as the stable
//! handle stored in the order index, so a cancel can find and remove
//! an order in O(log n) without scanning the side.
//!
//! Matching walks the contra side in arrival order and trades with
//! every price-eligible order it meets. Price is only a filter here,
//! not a priority: an older, worse-priced but still eligible order
//! trades before a newer, better-priced one.

use std::collections::BTreeMap;

use parking_lot::{Mutex, MutexGuard};

use crate::order::OrderRecord;
use crate::side::Side;

/// Position of a resting order within its book.
pub type Slot = u64;

/// A single execution produced while matching an incoming order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    pub resting_order_id: u32,
    pub resting_slot: Slot,
    /// Resting order's fill-sequence number after this execution.
    pub fill_seq: u32,
    /// Resting (maker) price.
    pub price: u32,
    pub quantity: u32,
    /// The resting order was fully consumed and has left the book.
    pub resting_filled: bool,
}

/// Single-instrument order book.
#[derive(Debug)]
pub struct InstrumentBook {
    symbol: String,
    sides: Mutex<BookSides>,
}

/// Both sides of one book. Only reachable through [`InstrumentBook::lock`].
#[derive(Debug, Default)]
pub struct BookSides {
    buys: BTreeMap<Slot, OrderRecord>,
    sells: BTreeMap<Slot, OrderRecord>,
    next_slot: Slot,
}

impl InstrumentBook {
    /// Create a new, empty book for the given symbol.
    pub fn new(symbol: impl Into<String>) -> Self {
        InstrumentBook {
            symbol: symbol.into(),
            sides: Mutex::new(BookSides::default()),
        }
    }

    /// Returns the symbol of this book.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Acquire the book lock.
    ///
    /// Any access to the resting orders goes through the returned guard.
    /// When the order index is also needed, it must be locked *after*
    /// this lock, never before.
    pub fn lock(&self) -> MutexGuard<'_, BookSides> {
        self.sides.lock()
    }

    /// Copy of one side's resting orders, in arrival order.
    pub fn snapshot(&self, side: Side) -> Vec<OrderRecord> {
        self.lock().resting(side).cloned().collect()
    }

    /// Number of resting orders across both sides.
    pub fn resting_count(&self) -> usize {
        self.lock().len()
    }
}

impl BookSides {
    fn side(&self, side: Side) -> &BTreeMap<Slot, OrderRecord> {
        match side {
            Side::Buy => &self.buys,
            Side::Sell => &self.sells,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut BTreeMap<Slot, OrderRecord> {
        match side {
            Side::Buy => &mut self.buys,
            Side::Sell => &mut self.sells,
        }
    }

    /// Resting orders on one side, in arrival order.
    pub fn resting(&self, side: Side) -> impl Iterator<Item = &OrderRecord> {
        self.side(side).values()
    }

    /// Look up the order occupying `slot` on `side`.
    pub fn get(&self, side: Side, slot: Slot) -> Option<&OrderRecord> {
        self.side(side).get(&slot)
    }

    /// Remove and return the order occupying `slot` on `side`.
    pub fn remove(&mut self, side: Side, slot: Slot) -> Option<OrderRecord> {
        self.side_mut(side).remove(&slot)
    }

    /// Append a resting order at the back of its own side.
    ///
    /// Returns the slot it now occupies.
    pub fn append(&mut self, order: OrderRecord) -> Slot {
        debug_assert!(order.remaining_qty > 0, "resting order must have quantity");
        let slot = self.next_slot;
        self.next_slot += 1;
        self.side_mut(order.side).insert(slot, order);
        slot
    }

    /// Total number of resting orders.
    pub fn len(&self) -> usize {
        self.buys.len() + self.sells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buys.is_empty() && self.sells.is_empty()
    }

    /// Match an incoming order against the opposite side.
    ///
    /// Scans the contra side in arrival order, skipping orders that are
    /// not price-eligible, and trades `min(resting, incoming)` with each
    /// eligible one at the resting price until the incoming order is
    /// exhausted. Fully filled resting orders are removed from the side
    /// before returning; the caller is responsible for dropping them
    /// from the index. Any remaining quantity is left in `incoming`.
    pub fn match_order(&mut self, incoming: &mut OrderRecord) -> Vec<Fill> {
        let mut fills = Vec::new();
        let contra = self.side_mut(incoming.side.opposite());

        for (&slot, resting) in contra.iter_mut() {
            if incoming.remaining_qty == 0 {
                break;
            }
            if !resting.is_eligible_for(incoming) {
                continue;
            }

            let trade_qty = resting.remaining_qty.min(incoming.remaining_qty);
            resting.fill(trade_qty);
            incoming.fill(trade_qty);
            resting.fill_seq += 1;

            fills.push(Fill {
                resting_order_id: resting.order_id,
                resting_slot: slot,
                fill_seq: resting.fill_seq,
                price: resting.price,
                quantity: trade_qty,
                resting_filled: resting.is_filled(),
            });
        }

        for fill in fills.iter().filter(|f| f.resting_filled) {
            contra.remove(&fill.resting_slot);
        }

        fills
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(order_id: u32, side: Side, price: u32, qty: u32) -> OrderRecord {
        OrderRecord {
            order_id,
            instrument: "ABC".to_string(),
            side,
            price,
            remaining_qty: qty,
            fill_seq: 0,
            arrival_ts: u64::from(order_id),
        }
    }

    fn ids(sides: &BookSides, side: Side) -> Vec<u32> {
        sides.resting(side).map(|o| o.order_id).collect()
    }

    #[test]
    fn slots_preserve_arrival_order() {
        let mut sides = BookSides::default();
        let a = sides.append(order(1, Side::Buy, 10, 5));
        let b = sides.append(order(2, Side::Sell, 12, 5));
        let c = sides.append(order(3, Side::Buy, 11, 5));

        assert!(a < b && b < c);
        assert_eq!(ids(&sides, Side::Buy), vec![1, 3]);
        assert_eq!(ids(&sides, Side::Sell), vec![2]);
        assert_eq!(sides.get(Side::Buy, c).map(|o| o.order_id), Some(3));
        assert!(sides.get(Side::Sell, c).is_none());
    }

    #[test]
    fn removed_slot_is_not_reused() {
        let mut sides = BookSides::default();
        let a = sides.append(order(1, Side::Buy, 10, 5));
        assert!(sides.remove(Side::Buy, a).is_some());
        let b = sides.append(order(1, Side::Buy, 10, 5));
        assert_ne!(a, b);
        assert!(sides.get(Side::Buy, a).is_none());
    }

    #[test]
    fn matching_is_fifo_among_eligible_not_best_price() {
        let mut sides = BookSides::default();
        // Older, worse (higher) ask first; newer, better ask second.
        sides.append(order(1, Side::Sell, 10, 5));
        sides.append(order(2, Side::Sell, 8, 5));

        let mut incoming = order(3, Side::Buy, 10, 5);
        let fills = sides.match_order(&mut incoming);

        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].resting_order_id, 1);
        assert_eq!(fills[0].price, 10);
        assert_eq!(ids(&sides, Side::Sell), vec![2]);
    }

    #[test]
    fn ineligible_orders_are_skipped_and_kept() {
        let mut sides = BookSides::default();
        sides.append(order(1, Side::Sell, 12, 5));
        sides.append(order(2, Side::Sell, 9, 3));
        sides.append(order(3, Side::Sell, 10, 4));

        let mut incoming = order(4, Side::Buy, 10, 10);
        let fills = sides.match_order(&mut incoming);

        let traded: Vec<(u32, u32, u32)> = fills
            .iter()
            .map(|f| (f.resting_order_id, f.price, f.quantity))
            .collect();
        assert_eq!(traded, vec![(2, 9, 3), (3, 10, 4)]);
        assert_eq!(incoming.remaining_qty, 3);
        assert_eq!(ids(&sides, Side::Sell), vec![1]);
    }

    #[test]
    fn partial_fill_keeps_resting_order_and_bumps_fill_seq() {
        let mut sides = BookSides::default();
        let slot = sides.append(order(1, Side::Buy, 10, 50));

        let mut first = order(2, Side::Sell, 10, 20);
        let fills = sides.match_order(&mut first);
        assert_eq!(fills[0].fill_seq, 1);
        assert!(!fills[0].resting_filled);

        let mut second = order(3, Side::Sell, 9, 20);
        let fills = sides.match_order(&mut second);
        assert_eq!(fills[0].fill_seq, 2);
        assert_eq!(fills[0].price, 10);

        let resting = sides.get(Side::Buy, slot).cloned();
        assert_eq!(resting.map(|o| (o.remaining_qty, o.fill_seq)), Some((10, 2)));
    }

    #[test]
    fn scan_stops_once_incoming_is_exhausted() {
        let mut sides = BookSides::default();
        sides.append(order(1, Side::Buy, 10, 5));
        sides.append(order(2, Side::Buy, 10, 5));

        let mut incoming = order(3, Side::Sell, 10, 5);
        let fills = sides.match_order(&mut incoming);

        assert_eq!(fills.len(), 1);
        assert!(fills[0].resting_filled);
        assert!(incoming.is_filled());
        assert_eq!(ids(&sides, Side::Buy), vec![2]);
        assert_eq!(sides.resting(Side::Buy).next().map(|o| o.fill_seq), Some(0));
    }
}
