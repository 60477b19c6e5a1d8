//! exchange-protocol
//!
//! Byte-level codecs for the exchange. Both codecs map to and from the
//! logical `exchange_core::InputMessage` / `OutputMessage` types.
//!
//! - [`binary_codec`] : fixed-header frames, big-endian integers
//! - [`csv_codec`]    : one message per text line, also used by replay

pub mod wire_types;
pub mod binary_codec;
pub mod csv_codec;

pub use binary_codec::{decode_input, decode_output, encode_input, encode_output, ProtocolError};
pub use csv_codec::CsvError;
