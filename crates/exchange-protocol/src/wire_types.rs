//! Low-level wire types and constants.
//!
//! This module defines:
//! - Message type IDs for input and output messages.
//! - Protocol versioning.
//! - The instrument symbol length bound.
//!
//! The actual encode/decode logic lives in `binary_codec`.

/// Current protocol version.
pub const PROTOCOL_VERSION: u8 = 1;

/// Size of the common frame header: type, version, two reserved bytes.
pub const HEADER_LEN: usize = 4;

/// Input message types (client → server).
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WireInputType {
    Buy = 0,
    Sell = 1,
    Cancel = 2,
}

impl WireInputType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(WireInputType::Buy),
            1 => Some(WireInputType::Sell),
            2 => Some(WireInputType::Cancel),
            _ => None,
        }
    }
}

/// Output message types (server → client).
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WireOutputType {
    OrderAdded = 10,
    OrderExecuted = 11,
    OrderDeleted = 12,
}

impl WireOutputType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            10 => Some(WireOutputType::OrderAdded),
            11 => Some(WireOutputType::OrderExecuted),
            12 => Some(WireOutputType::OrderDeleted),
            _ => None,
        }
    }
}

/// Maximum instrument symbol length, in bytes, on either protocol.
pub const MAX_INSTRUMENT_LEN: usize = 8;

/// A tiny helper for validating instrument lengths.
pub fn validate_instrument_len(len: usize) -> bool {
    len > 0 && len <= MAX_INSTRUMENT_LEN
}
