//! Symbol -> [`InstrumentBook`] registry.
//!
//! Books are created lazily on first reference and live as long as the
//! registry; nothing is ever removed. Concurrent first use of the same
//! symbol is linearized by the map's entry API, so exactly one book per
//! symbol is ever created.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::order_book::InstrumentBook;

#[derive(Debug, Default)]
pub struct BookRegistry {
    books: DashMap<String, Arc<InstrumentBook>>,
}

impl BookRegistry {
    pub fn new() -> Self {
        BookRegistry::default()
    }

    /// Return the book for `symbol`, creating it on first use.
    ///
    /// The registry's internal shard lock is released before this
    /// returns, so callers may take the book lock freely.
    pub fn get_or_create(&self, symbol: &str) -> Arc<InstrumentBook> {
        if let Some(book) = self.books.get(symbol) {
            return Arc::clone(book.value());
        }

        let entry = self.books.entry(symbol.to_string()).or_insert_with(|| {
            debug!(symbol, "creating instrument book");
            Arc::new(InstrumentBook::new(symbol))
        });
        Arc::clone(entry.value())
    }

    /// Look up an existing book without creating one.
    pub fn get(&self, symbol: &str) -> Option<Arc<InstrumentBook>> {
        self.books.get(symbol).map(|book| Arc::clone(book.value()))
    }

    /// Number of symbols seen so far.
    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Handles to every book, in no particular order.
    pub fn books(&self) -> Vec<Arc<InstrumentBook>> {
        self.books.iter().map(|b| Arc::clone(b.value())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn same_symbol_yields_same_book() {
        let registry = BookRegistry::new();
        let a = registry.get_or_create("ABC");
        let b = registry.get_or_create("ABC");
        let c = registry.get_or_create("XYZ");

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(registry.len(), 2);
        assert!(registry.get("NOPE").is_none());
    }

    #[test]
    fn concurrent_first_use_creates_one_book() {
        let registry = Arc::new(BookRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.get_or_create("RACE"))
            })
            .collect();

        let books: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(books.iter().all(|b| Arc::ptr_eq(b, &books[0])));
        assert_eq!(registry.len(), 1);
    }
}
