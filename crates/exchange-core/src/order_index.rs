//! Global order identifier -> resting location index.
//!
//! Lets a cancel find its order without scanning every book. The index
//! has its own lock, but every *mutation* happens while the owning
//! book's lock is also held (book lock first, index lock nested inside),
//! so an identifier is in the index exactly when its record rests in a
//! book.
//!
//! Lookups may run without the book lock; the handle they return is
//! only a hint and must be re-validated under the book lock before use.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::order_book::{Fill, InstrumentBook, Slot};
use crate::side::Side;

/// Where a resting order lives. Does not own the order.
#[derive(Debug, Clone)]
pub struct RestingHandle {
    pub book: Arc<InstrumentBook>,
    pub side: Side,
    pub slot: Slot,
}

impl RestingHandle {
    /// Whether this handle points at `slot` in `book`.
    pub fn refers_to(&self, book: &Arc<InstrumentBook>, slot: Slot) -> bool {
        self.slot == slot && Arc::ptr_eq(&self.book, book)
    }
}

#[derive(Debug, Default)]
pub struct OrderIndex {
    entries: Mutex<HashMap<u32, RestingHandle>>,
}

impl OrderIndex {
    pub fn new() -> Self {
        OrderIndex::default()
    }

    pub fn lookup(&self, order_id: u32) -> Option<RestingHandle> {
        self.entries.lock().get(&order_id).cloned()
    }

    pub fn contains(&self, order_id: u32) -> bool {
        self.entries.lock().contains_key(&order_id)
    }

    /// Record a newly resting order. Caller holds the book lock.
    ///
    /// Returns the handle previously registered under `order_id`, if any.
    pub fn insert(&self, order_id: u32, handle: RestingHandle) -> Option<RestingHandle> {
        self.entries.lock().insert(order_id, handle)
    }

    /// Erase `order_id` if it still points at `slot` in `book`.
    /// Caller holds the book lock.
    ///
    /// An entry registered for a different location is left alone.
    pub fn erase(&self, order_id: u32, book: &Arc<InstrumentBook>, slot: Slot) -> bool {
        let mut entries = self.entries.lock();
        match entries.get(&order_id) {
            Some(handle) if handle.refers_to(book, slot) => {
                entries.remove(&order_id);
                true
            }
            _ => false,
        }
    }

    /// Erase every resting order that `fills` consumed completely, under
    /// a single index lock acquisition. Caller holds the book lock.
    pub fn erase_filled(&self, book: &Arc<InstrumentBook>, fills: &[Fill]) {
        let mut filled = fills.iter().filter(|f| f.resting_filled).peekable();
        if filled.peek().is_none() {
            return;
        }

        let mut entries = self.entries.lock();
        for fill in filled {
            if entries
                .get(&fill.resting_order_id)
                .is_some_and(|h| h.refers_to(book, fill.resting_slot))
            {
                entries.remove(&fill.resting_order_id);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Identifiers currently registered, in no particular order.
    pub fn order_ids(&self) -> Vec<u32> {
        self.entries.lock().keys().copied().collect()
    }
}
