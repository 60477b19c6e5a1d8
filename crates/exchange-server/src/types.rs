//! Shared types for the exchange TCP server.
//!
//! This module defines:
//! - `ClientId`: a lightweight handle for connected clients
//! - the outbound channel aliases and the client registry
//! - `Protocol`: the wire format a connection speaks

use std::collections::HashMap;
use std::sync::Arc;

use exchange_core::{MatchingEngine, OutputMessage};
use tokio::sync::mpsc;
use tokio::sync::RwLock;

/// Identifier for a connected client.
///
/// This is intentionally opaque; we just guarantee uniqueness
/// over the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub u64);

/// Outbound events from the engine to a given client.
pub type OutboundTx = mpsc::UnboundedSender<OutputMessage>;
pub type OutboundRx = mpsc::UnboundedReceiver<OutputMessage>;

/// Registry of connected clients and their outbound channels.
pub type ClientRegistry = Arc<RwLock<HashMap<ClientId, OutboundTx>>>;

/// The engine, shared by every connection task.
pub type SharedEngine = Arc<MatchingEngine>;

/// Wire format spoken by one connection, in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Newline-terminated CSV lines.
    Csv,
    /// u32 big-endian length prefix followed by a binary frame.
    Binary,
}

impl Protocol {
    /// Guess the protocol from the first byte a client sends.
    ///
    /// CSV lines start with a message kind letter (or a comment or
    /// blank); a binary stream starts with the high byte of a frame
    /// length, which is 0 for any realistic frame.
    pub fn detect(first_byte: u8) -> Self {
        match first_byte {
            b'B' | b'S' | b'C' | b'#' => Protocol::Csv,
            b if b.is_ascii_whitespace() => Protocol::Csv,
            _ => Protocol::Binary,
        }
    }
}
