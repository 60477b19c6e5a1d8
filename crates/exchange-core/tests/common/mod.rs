// Shared helpers for the exchange-core integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use exchange_core::{Clock, MatchingEngine, NewOrder, OutputMessage, Side};

/// Deterministic clock: every read returns the next tick.
#[derive(Debug, Default)]
pub struct TickClock(AtomicU64);

impl Clock for TickClock {
    fn now_ns(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

pub fn engine() -> MatchingEngine<TickClock> {
    MatchingEngine::with_clock(TickClock::default())
}

pub fn order(side: Side, order_id: u32, instrument: &str, price: u32, quantity: u32) -> NewOrder {
    NewOrder {
        order_id,
        instrument: instrument.to_string(),
        price,
        quantity,
        side,
    }
}

pub fn buy(order_id: u32, price: u32, quantity: u32) -> NewOrder {
    order(Side::Buy, order_id, "ABC", price, quantity)
}

pub fn sell(order_id: u32, price: u32, quantity: u32) -> NewOrder {
    order(Side::Sell, order_id, "ABC", price, quantity)
}

/// Book/index consistency: every resting order has quantity, sits in
/// exactly one book side, and the index holds exactly those ids.
pub fn assert_consistent<C: Clock>(engine: &MatchingEngine<C>) {
    let mut resting = HashSet::new();
    for book in engine.books() {
        for side in [Side::Buy, Side::Sell] {
            for record in book.snapshot(side) {
                assert!(record.remaining_qty > 0, "resting order {} has no quantity", record.order_id);
                assert_eq!(record.side, side);
                assert_eq!(record.instrument, book.symbol());
                assert!(
                    resting.insert(record.order_id),
                    "order {} rests in more than one place",
                    record.order_id
                );
            }
        }
    }

    let indexed: HashSet<u32> = engine.index().order_ids().into_iter().collect();
    assert_eq!(indexed, resting, "index and books disagree");
}

pub fn executions(events: &[OutputMessage]) -> Vec<(u32, u32, u32, u32)> {
    events
        .iter()
        .filter_map(|e| match e {
            OutputMessage::OrderExecuted(x) => {
                Some((x.resting_order_id, x.incoming_order_id, x.price, x.quantity))
            }
            _ => None,
        })
        .collect()
}
