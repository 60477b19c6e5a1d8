//! exchange-core
//!
//! Concurrent matching core, transport-agnostic:
//! - messages (input/output types)
//! - order records and per-instrument books
//! - symbol -> book registry and the global order index
//! - multi-instrument matching engine

pub mod side;
pub mod clock;
pub mod messages;
pub mod order;
pub mod order_book;
pub mod book_registry;
pub mod order_index;
pub mod matching_engine;
pub mod error;

pub use side::Side;
pub use clock::{Clock, SystemClock};

pub use messages::{
    Cancel,
    InputMessage,
    NewOrder,
    OrderAdded,
    OrderDeleted,
    OrderExecuted,
    OutputMessage,
};

pub use order::OrderRecord;
pub use order_book::{Fill, InstrumentBook, Slot};
pub use book_registry::BookRegistry;
pub use order_index::{OrderIndex, RestingHandle};
pub use matching_engine::MatchingEngine;
pub use error::EngineError;
