//! Binary encoding/decoding for exchange-core messages.
//!
//! This module converts between:
//! - raw binary frames (`&[u8]`)
//! - high-level `exchange_core::InputMessage` / `OutputMessage`
//!
//! Framing model (single-message buffer, integers big-endian):
//!
//! ```text
//! Header (both directions)
//! ------------------------
//! [0]   : msg_type
//! [1]   : version  (PROTOCOL_VERSION)
//! [2..4]: reserved = 0
//!
//! Input (client → server)
//! -----------------------
//! Buy (type=0) / Sell (type=1):
//!   [4..8]   order_id (u32)
//!   [8..12]  price (u32)
//!   [12..16] quantity (u32)
//!   [16]     instrument_len (u8, 1..=MAX_INSTRUMENT_LEN)
//!   [17..]   instrument bytes (UTF-8)
//!
//! Cancel (type=2):
//!   [4..8]   order_id (u32)
//!
//! Output (server → client)
//! ------------------------
//! OrderAdded (type=10):
//!   [4..8]   order_id (u32)
//!   [8..12]  price (u32)
//!   [12..16] remaining_qty (u32)
//!   [16]     side (0=Buy, 1=Sell)
//!   [17..25] arrival_ts (u64)
//!   [25..33] event_ts (u64)
//!   [33]     instrument_len (u8)
//!   [34..]   instrument bytes
//!
//! OrderExecuted (type=11):
//!   [4..8]   resting_order_id (u32)
//!   [8..12]  incoming_order_id (u32)
//!   [12..16] fill_seq (u32)
//!   [16..20] price (u32)
//!   [20..24] quantity (u32)
//!   [24..32] arrival_ts (u64)
//!   [32..40] event_ts (u64)
//!
//! OrderDeleted (type=12):
//!   [4..8]   order_id (u32)
//!   [8]      found (0/1)
//!   [9..17]  arrival_ts (u64)
//!   [17..25] event_ts (u64)
//! ```
//!
//! A zero quantity is *not* a decode error: the engine owns that rule.
//!
//! NOTE: This module encodes/decodes **one message per buffer**. A TCP
//! stream server is expected to provide its own framing (e.g. length-
//! prefix each frame) using these functions for the payload.

use exchange_core::{
    Cancel, InputMessage, NewOrder, OrderAdded, OrderDeleted, OrderExecuted, OutputMessage, Side,
};
use thiserror::Error;

use crate::wire_types::{
    validate_instrument_len, WireInputType, WireOutputType, HEADER_LEN, PROTOCOL_VERSION,
};

/// Errors that can arise when encoding/decoding a binary frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Buffer too short for the expected fields.
    #[error("buffer truncated")]
    Truncated,

    /// Unknown or unsupported message type.
    #[error("unknown message type: {0}")]
    UnknownMessageType(u8),

    /// Unsupported or mismatched protocol version.
    #[error("protocol version mismatch: got {0}, expected {expected}", expected = PROTOCOL_VERSION)]
    VersionMismatch(u8),

    /// Invalid instrument length or malformed UTF-8.
    #[error("invalid instrument")]
    InvalidInstrument,

    /// Invalid side or other semantic issue.
    #[error("invalid field: {0}")]
    InvalidField(&'static str),
}

// ============================================================================
// INPUT: client → server
// ============================================================================

/// Decode a single input message from a binary buffer.
///
/// The buffer must contain exactly one full message as described above.
pub fn decode_input(buf: &[u8]) -> Result<InputMessage, ProtocolError> {
    let msg_type = read_header(buf)?;
    let wire_type =
        WireInputType::from_u8(msg_type).ok_or(ProtocolError::UnknownMessageType(msg_type))?;

    let mut r = Reader::new(&buf[HEADER_LEN..]);
    match wire_type {
        WireInputType::Buy => decode_new_order(&mut r, Side::Buy),
        WireInputType::Sell => decode_new_order(&mut r, Side::Sell),
        WireInputType::Cancel => Ok(InputMessage::Cancel(Cancel {
            order_id: r.u32()?,
        })),
    }
}

/// Encode a single input message into a binary frame.
///
/// The encoded bytes are appended to `out`.
pub fn encode_input(msg: &InputMessage, out: &mut Vec<u8>) -> Result<(), ProtocolError> {
    match msg {
        InputMessage::NewOrder(n) => {
            let instrument = instrument_bytes(&n.instrument)?;
            let wire_type = match n.side {
                Side::Buy => WireInputType::Buy,
                Side::Sell => WireInputType::Sell,
            };
            write_header(wire_type as u8, out);
            out.extend_from_slice(&n.order_id.to_be_bytes());
            out.extend_from_slice(&n.price.to_be_bytes());
            out.extend_from_slice(&n.quantity.to_be_bytes());
            write_instrument(instrument, out);
        }
        InputMessage::Cancel(c) => {
            write_header(WireInputType::Cancel as u8, out);
            out.extend_from_slice(&c.order_id.to_be_bytes());
        }
    }
    Ok(())
}

fn decode_new_order(r: &mut Reader<'_>, side: Side) -> Result<InputMessage, ProtocolError> {
    let order_id = r.u32()?;
    let price = r.u32()?;
    let quantity = r.u32()?;
    let instrument = r.instrument()?;

    Ok(InputMessage::NewOrder(NewOrder {
        order_id,
        instrument,
        price,
        quantity,
        side,
    }))
}

// ============================================================================
// OUTPUT: server → client
// ============================================================================

/// Encode a single output message into a binary frame.
///
/// The encoded bytes are appended to `out`.
pub fn encode_output(msg: &OutputMessage, out: &mut Vec<u8>) -> Result<(), ProtocolError> {
    match msg {
        OutputMessage::OrderAdded(a) => {
            let instrument = instrument_bytes(&a.instrument)?;
            write_header(WireOutputType::OrderAdded as u8, out);
            out.extend_from_slice(&a.order_id.to_be_bytes());
            out.extend_from_slice(&a.price.to_be_bytes());
            out.extend_from_slice(&a.remaining_qty.to_be_bytes());
            out.push(side_to_byte(a.side));
            out.extend_from_slice(&a.arrival_ts.to_be_bytes());
            out.extend_from_slice(&a.event_ts.to_be_bytes());
            write_instrument(instrument, out);
        }
        OutputMessage::OrderExecuted(e) => {
            write_header(WireOutputType::OrderExecuted as u8, out);
            out.extend_from_slice(&e.resting_order_id.to_be_bytes());
            out.extend_from_slice(&e.incoming_order_id.to_be_bytes());
            out.extend_from_slice(&e.fill_seq.to_be_bytes());
            out.extend_from_slice(&e.price.to_be_bytes());
            out.extend_from_slice(&e.quantity.to_be_bytes());
            out.extend_from_slice(&e.arrival_ts.to_be_bytes());
            out.extend_from_slice(&e.event_ts.to_be_bytes());
        }
        OutputMessage::OrderDeleted(d) => {
            write_header(WireOutputType::OrderDeleted as u8, out);
            out.extend_from_slice(&d.order_id.to_be_bytes());
            out.push(u8::from(d.found));
            out.extend_from_slice(&d.arrival_ts.to_be_bytes());
            out.extend_from_slice(&d.event_ts.to_be_bytes());
        }
    }
    Ok(())
}

/// Decode a single output message from a binary buffer.
///
/// This is useful on the **client** side when reading from the server.
pub fn decode_output(buf: &[u8]) -> Result<OutputMessage, ProtocolError> {
    let msg_type = read_header(buf)?;
    let wire_type =
        WireOutputType::from_u8(msg_type).ok_or(ProtocolError::UnknownMessageType(msg_type))?;

    let mut r = Reader::new(&buf[HEADER_LEN..]);
    let msg = match wire_type {
        WireOutputType::OrderAdded => {
            let order_id = r.u32()?;
            let price = r.u32()?;
            let remaining_qty = r.u32()?;
            let side = side_from_byte(r.u8()?)?;
            let arrival_ts = r.u64()?;
            let event_ts = r.u64()?;
            let instrument = r.instrument()?;
            OutputMessage::OrderAdded(OrderAdded {
                order_id,
                instrument,
                price,
                remaining_qty,
                side,
                arrival_ts,
                event_ts,
            })
        }
        WireOutputType::OrderExecuted => OutputMessage::OrderExecuted(OrderExecuted {
            resting_order_id: r.u32()?,
            incoming_order_id: r.u32()?,
            fill_seq: r.u32()?,
            price: r.u32()?,
            quantity: r.u32()?,
            arrival_ts: r.u64()?,
            event_ts: r.u64()?,
        }),
        WireOutputType::OrderDeleted => OutputMessage::OrderDeleted(OrderDeleted {
            order_id: r.u32()?,
            found: match r.u8()? {
                0 => false,
                1 => true,
                _ => return Err(ProtocolError::InvalidField("found")),
            },
            arrival_ts: r.u64()?,
            event_ts: r.u64()?,
        }),
    };
    Ok(msg)
}

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

fn read_header(buf: &[u8]) -> Result<u8, ProtocolError> {
    if buf.len() < HEADER_LEN {
        return Err(ProtocolError::Truncated);
    }

    let version = buf[1];
    if version != PROTOCOL_VERSION {
        return Err(ProtocolError::VersionMismatch(version));
    }
    Ok(buf[0])
}

fn write_header(msg_type: u8, out: &mut Vec<u8>) {
    out.push(msg_type);
    out.push(PROTOCOL_VERSION);
    out.extend_from_slice(&[0, 0]); // reserved
}

fn instrument_bytes(instrument: &str) -> Result<&[u8], ProtocolError> {
    let bytes = instrument.as_bytes();
    if !validate_instrument_len(bytes.len()) {
        return Err(ProtocolError::InvalidInstrument);
    }
    Ok(bytes)
}

fn write_instrument(bytes: &[u8], out: &mut Vec<u8>) {
    // Length already bounded by `instrument_bytes`.
    out.push(bytes.len() as u8);
    out.extend_from_slice(bytes);
}

fn side_to_byte(side: Side) -> u8 {
    match side {
        Side::Buy => 0,
        Side::Sell => 1,
    }
}

fn side_from_byte(b: u8) -> Result<Side, ProtocolError> {
    match b {
        0 => Ok(Side::Buy),
        1 => Ok(Side::Sell),
        _ => Err(ProtocolError::InvalidField("side")),
    }
}

/// Bounds-checked big-endian cursor over a frame body.
struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Reader { buf }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], ProtocolError> {
        if self.buf.len() < N {
            return Err(ProtocolError::Truncated);
        }
        let buf = self.buf;
        let (head, rest) = buf.split_at(N);
        self.buf = rest;
        let mut arr = [0u8; N];
        arr.copy_from_slice(head);
        Ok(arr)
    }

    fn u8(&mut self) -> Result<u8, ProtocolError> {
        Ok(self.take::<1>()?[0])
    }

    fn u32(&mut self) -> Result<u32, ProtocolError> {
        self.take().map(u32::from_be_bytes)
    }

    fn u64(&mut self) -> Result<u64, ProtocolError> {
        self.take().map(u64::from_be_bytes)
    }

    fn instrument(&mut self) -> Result<String, ProtocolError> {
        let len = usize::from(self.u8()?);
        if !validate_instrument_len(len) {
            return Err(ProtocolError::InvalidInstrument);
        }
        if self.buf.len() < len {
            return Err(ProtocolError::Truncated);
        }
        let buf = self.buf;
        let (head, rest) = buf.split_at(len);
        self.buf = rest;
        std::str::from_utf8(head)
            .map(str::to_string)
            .map_err(|_| ProtocolError::InvalidInstrument)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_order_layout_matches_documented_offsets() {
        let msg = InputMessage::NewOrder(NewOrder {
            order_id: 7,
            instrument: "ABC".to_string(),
            price: 10,
            quantity: 100,
            side: Side::Sell,
        });
        let mut buf = Vec::new();
        encode_input(&msg, &mut buf).unwrap();

        assert_eq!(buf[0], WireInputType::Sell as u8);
        assert_eq!(buf[1], PROTOCOL_VERSION);
        assert_eq!(&buf[4..8], &7u32.to_be_bytes());
        assert_eq!(&buf[12..16], &100u32.to_be_bytes());
        assert_eq!(buf[16], 3);
        assert_eq!(&buf[17..], b"ABC");
        assert_eq!(decode_input(&buf).unwrap(), msg);
    }

    #[test]
    fn zero_quantity_is_left_to_the_engine() {
        let mut buf = vec![WireInputType::Buy as u8, PROTOCOL_VERSION, 0, 0];
        buf.extend_from_slice(&8u32.to_be_bytes());
        buf.extend_from_slice(&5u32.to_be_bytes());
        buf.extend_from_slice(&0u32.to_be_bytes());
        buf.push(3);
        buf.extend_from_slice(b"ABC");

        match decode_input(&buf) {
            Ok(InputMessage::NewOrder(n)) => assert_eq!(n.quantity, 0),
            other => panic!("unexpected decode result: {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_headers_and_bodies() {
        assert_eq!(decode_input(&[0, 1]), Err(ProtocolError::Truncated));
        assert_eq!(decode_input(&[0, 9, 0, 0]), Err(ProtocolError::VersionMismatch(9)));
        assert_eq!(
            decode_input(&[42, PROTOCOL_VERSION, 0, 0]),
            Err(ProtocolError::UnknownMessageType(42))
        );
        assert_eq!(
            decode_input(&[2, PROTOCOL_VERSION, 0, 0, 0, 0]),
            Err(ProtocolError::Truncated)
        );

        let mut long = vec![0, PROTOCOL_VERSION, 0, 0];
        long.extend_from_slice(&[0; 12]);
        long.push(9);
        long.extend_from_slice(b"TOOLONGXX");
        assert_eq!(decode_input(&long), Err(ProtocolError::InvalidInstrument));
    }

    #[test]
    fn encode_rejects_oversized_instrument() {
        let msg = InputMessage::NewOrder(NewOrder {
            order_id: 1,
            instrument: "WAYTOOLONG".to_string(),
            price: 1,
            quantity: 1,
            side: Side::Buy,
        });
        let mut buf = Vec::new();
        assert_eq!(encode_input(&msg, &mut buf), Err(ProtocolError::InvalidInstrument));
    }

    #[test]
    fn output_events_decode_back() {
        let events = vec![
            OutputMessage::OrderAdded(OrderAdded {
                order_id: 1,
                instrument: "ABC".to_string(),
                price: 10,
                remaining_qty: 60,
                side: Side::Buy,
                arrival_ts: 100,
                event_ts: 101,
            }),
            OutputMessage::OrderExecuted(OrderExecuted {
                resting_order_id: 1,
                incoming_order_id: 2,
                fill_seq: 1,
                price: 10,
                quantity: 40,
                arrival_ts: 200,
                event_ts: 202,
            }),
            OutputMessage::OrderDeleted(OrderDeleted {
                order_id: 3,
                found: false,
                arrival_ts: 300,
                event_ts: 301,
            }),
        ];

        for event in events {
            let mut buf = Vec::new();
            encode_output(&event, &mut buf).unwrap();
            assert_eq!(decode_output(&buf).unwrap(), event);
        }
    }
}
