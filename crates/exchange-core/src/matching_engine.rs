//! Multi-instrument matching engine.
//!
//! - Owns the [`BookRegistry`] (one [`InstrumentBook`] per symbol,
//!   created on first use) and the global [`OrderIndex`].
//! - Matches new orders against their book and rests any remainder.
//! - Resolves cancels through the index in O(1).
//!
//! The engine is shared (`&self`) between any number of connection
//! tasks. Operations on one instrument are serialized by that book's
//! lock; different instruments never contend. Lock order is always
//! book first, index second, and no operation holds two books at once.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::book_registry::BookRegistry;
use crate::clock::{Clock, SystemClock};
use crate::error::EngineError;
use crate::messages::{
    Cancel, InputMessage, NewOrder, OrderAdded, OrderDeleted, OrderExecuted, OutputMessage,
};
use crate::order::OrderRecord;
use crate::order_book::InstrumentBook;
use crate::order_index::{OrderIndex, RestingHandle};

#[derive(Debug, Default)]
pub struct MatchingEngine<C: Clock = SystemClock> {
    books: BookRegistry,
    index: OrderIndex,
    clock: C,
}

impl MatchingEngine {
    /// Create a new, empty matching engine on the system clock.
    pub fn new() -> Self {
        MatchingEngine::default()
    }
}

impl<C: Clock> MatchingEngine<C> {
    /// Create a new, empty matching engine stamping events with `clock`.
    pub fn with_clock(clock: C) -> Self {
        MatchingEngine {
            books: BookRegistry::new(),
            index: OrderIndex::new(),
            clock,
        }
    }

    /// Process a single input message and return the events it produced,
    /// in production order.
    pub fn process_message(&self, msg: InputMessage) -> Result<Vec<OutputMessage>, EngineError> {
        match msg {
            InputMessage::NewOrder(new) => self.submit(new),
            InputMessage::Cancel(cancel) => Ok(self.cancel(cancel)),
        }
    }

    /// Match a new order against its instrument's book.
    ///
    /// Emits one `OrderExecuted` per trade and, if any quantity is left,
    /// exactly one `OrderAdded` for the resting remainder. Zero-quantity
    /// orders and identifiers that are already resting are rejected
    /// without touching any state.
    pub fn submit(&self, msg: NewOrder) -> Result<Vec<OutputMessage>, EngineError> {
        let arrival_ts = self.clock.now_ns();

        if msg.quantity == 0 {
            warn!(order_id = msg.order_id, "dropping order with zero quantity");
            return Err(EngineError::InvalidQuantity {
                order_id: msg.order_id,
            });
        }

        let book = self.books.get_or_create(&msg.instrument);
        let mut sides = book.lock();

        if self.index.contains(msg.order_id) {
            warn!(order_id = msg.order_id, "rejecting order with a resting identifier");
            return Err(EngineError::DuplicateOrderId(msg.order_id));
        }

        let mut incoming = OrderRecord::from_new_order(&msg, arrival_ts);
        let fills = sides.match_order(&mut incoming);
        self.index.erase_filled(&book, &fills);

        let mut outputs = Vec::with_capacity(fills.len() + 1);
        for fill in &fills {
            outputs.push(OutputMessage::OrderExecuted(OrderExecuted {
                resting_order_id: fill.resting_order_id,
                incoming_order_id: incoming.order_id,
                fill_seq: fill.fill_seq,
                price: fill.price,
                quantity: fill.quantity,
                arrival_ts,
                event_ts: self.clock.now_ns(),
            }));
        }

        if !incoming.is_filled() {
            let added = OrderAdded {
                order_id: incoming.order_id,
                instrument: incoming.instrument.clone(),
                price: incoming.price,
                remaining_qty: incoming.remaining_qty,
                side: incoming.side,
                arrival_ts,
                event_ts: self.clock.now_ns(),
            };
            let side = incoming.side;
            let slot = sides.append(incoming);
            self.index.insert(
                added.order_id,
                RestingHandle {
                    book: Arc::clone(&book),
                    side,
                    slot,
                },
            );
            outputs.push(OutputMessage::OrderAdded(added));
        }
        drop(sides);

        debug!(
            order_id = msg.order_id,
            instrument = %msg.instrument,
            fills = fills.len(),
            "order processed"
        );
        Ok(outputs)
    }

    /// Cancel a resting order by identifier.
    ///
    /// Always emits exactly one `OrderDeleted`; `found` is `false` when
    /// the identifier is not resting (never submitted, already filled,
    /// already cancelled, or removed by a concurrent call).
    pub fn cancel(&self, msg: Cancel) -> Vec<OutputMessage> {
        let arrival_ts = self.clock.now_ns();
        let found = self.remove_resting(msg.order_id);

        debug!(order_id = msg.order_id, found, "cancel processed");
        vec![OutputMessage::OrderDeleted(OrderDeleted {
            order_id: msg.order_id,
            found,
            arrival_ts,
            event_ts: self.clock.now_ns(),
        })]
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn remove_resting(&self, order_id: u32) -> bool {
        // Index lock is held only for the lookup itself.
        let Some(handle) = self.index.lookup(order_id) else {
            return false;
        };

        let mut sides = handle.book.lock();
        // Between the lookup and the book lock the order may have been
        // filled or cancelled by another connection.
        let still_resting = sides
            .get(handle.side, handle.slot)
            .is_some_and(|o| o.order_id == order_id);
        if !still_resting {
            return false;
        }

        sides.remove(handle.side, handle.slot);
        self.index.erase(order_id, &handle.book, handle.slot);
        true
    }

    /// For tests or admin queries: the book for `symbol`, if it exists.
    pub fn get_book(&self, symbol: &str) -> Option<Arc<InstrumentBook>> {
        self.books.get(symbol)
    }

    /// For tests or admin queries: number of symbols seen so far.
    pub fn num_symbols(&self) -> usize {
        self.books.len()
    }

    /// For tests or admin queries: the resting record for `order_id`,
    /// resolved through the index and validated under the book lock.
    pub fn resting_order(&self, order_id: u32) -> Option<OrderRecord> {
        let handle = self.index.lookup(order_id)?;
        let sides = handle.book.lock();
        sides
            .get(handle.side, handle.slot)
            .filter(|o| o.order_id == order_id)
            .cloned()
    }

    /// For tests or admin queries: the order index.
    pub fn index(&self) -> &OrderIndex {
        &self.index
    }

    /// For tests or admin queries: every book created so far.
    pub fn books(&self) -> Vec<Arc<InstrumentBook>> {
        self.books.books()
    }
}
