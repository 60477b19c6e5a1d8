// crates/exchange-protocol/src/csv_codec.rs

//! CSV codec.
//!
//! Line-oriented text format for netcat sessions, scripted replays and
//! regression files. Fields are separated by commas; a line without any
//! comma is split on whitespace instead, so `B 1 ABC 10 100` is accepted
//! as well.
//!
//! Input format (lines → `InputMessage`):
//!
//! - Buy:    `B, orderId(int), instrument(string), price(int), qty(int)`
//! - Sell:   `S, orderId(int), instrument(string), price(int), qty(int)`
//! - Cancel: `C, orderId(int)`
//!
//! Output format (`OutputMessage` → line):
//!
//! - OrderAdded:
//!   `A, orderId, instrument, price, remainingQty, side(B/S), arrivalTs, eventTs`
//!
//! - OrderExecuted:
//!   `E, restingId, incomingId, fillSeq, price, qty, arrivalTs, eventTs`
//!
//! - OrderDeleted:
//!   `X, orderId, A(found)/R(not found), arrivalTs, eventTs`
//!
//! The compact form drops the two trailing timestamps.

use std::num::ParseIntError;

use exchange_core::{Cancel, InputMessage, NewOrder, OutputMessage, Side};
use thiserror::Error;

use crate::wire_types::{validate_instrument_len, MAX_INSTRUMENT_LEN};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvError {
    #[error("unknown message kind: {0:?}")]
    UnknownKind(String),

    #[error("expected {expected} fields, got {got}")]
    FieldCount { expected: usize, got: usize },

    #[error("invalid {field}: {source}")]
    InvalidNumber {
        field: &'static str,
        source: ParseIntError,
    },

    #[error("instrument must be 1..={max} bytes: {0:?}", max = MAX_INSTRUMENT_LEN)]
    InvalidInstrument(String),
}

/// Parse a single CSV line into an `InputMessage`.
///
/// Returns `Ok(None)` for blank lines or comments (starting with `#`).
pub fn parse_input_line(line: &str) -> Result<Option<InputMessage>, CsvError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let tokens = split_fields(trimmed);
    let msg = match tokens[0] {
        "B" => parse_new_order(&tokens, Side::Buy)?,
        "S" => parse_new_order(&tokens, Side::Sell)?,
        "C" => parse_cancel(&tokens)?,
        other => return Err(CsvError::UnknownKind(other.to_string())),
    };
    Ok(Some(msg))
}

fn parse_new_order(tokens: &[&str], side: Side) -> Result<InputMessage, CsvError> {
    // B|S, orderId, instrument, price, qty
    expect_fields(tokens, 5)?;

    let order_id = parse_u32("order id", tokens[1])?;
    let instrument = tokens[2];
    if !validate_instrument_len(instrument.len()) {
        return Err(CsvError::InvalidInstrument(instrument.to_string()));
    }
    let price = parse_u32("price", tokens[3])?;
    let quantity = parse_u32("quantity", tokens[4])?;

    Ok(InputMessage::NewOrder(NewOrder {
        order_id,
        instrument: instrument.to_string(),
        price,
        quantity,
        side,
    }))
}

fn parse_cancel(tokens: &[&str]) -> Result<InputMessage, CsvError> {
    // C, orderId
    expect_fields(tokens, 2)?;

    let order_id = parse_u32("order id", tokens[1])?;
    Ok(InputMessage::Cancel(Cancel { order_id }))
}

/// Format an `InputMessage` as a CSV line.
pub fn format_input_csv(msg: &InputMessage) -> String {
    match msg {
        InputMessage::NewOrder(n) => format!(
            "{}, {}, {}, {}, {}",
            n.side.as_char(),
            n.order_id,
            n.instrument,
            n.price,
            n.quantity
        ),
        InputMessage::Cancel(c) => format!("C, {}", c.order_id),
    }
}

/// Format an `OutputMessage` as a CSV line, timestamps included.
pub fn format_output_csv(msg: &OutputMessage) -> String {
    match msg {
        OutputMessage::OrderAdded(a) => format!(
            "{}, {}, {}",
            format_output_compact(msg),
            a.arrival_ts,
            a.event_ts
        ),
        OutputMessage::OrderExecuted(e) => format!(
            "{}, {}, {}",
            format_output_compact(msg),
            e.arrival_ts,
            e.event_ts
        ),
        OutputMessage::OrderDeleted(d) => format!(
            "{}, {}, {}",
            format_output_compact(msg),
            d.arrival_ts,
            d.event_ts
        ),
    }
}

/// Timestamp-free formatter, used for deterministic comparisons.
///
/// - OrderAdded:    `A, orderId, instrument, price, remainingQty, side`
/// - OrderExecuted: `E, restingId, incomingId, fillSeq, price, qty`
/// - OrderDeleted:  `X, orderId, A/R`
pub fn format_output_compact(msg: &OutputMessage) -> String {
    match msg {
        OutputMessage::OrderAdded(a) => format!(
            "A, {}, {}, {}, {}, {}",
            a.order_id,
            a.instrument,
            a.price,
            a.remaining_qty,
            a.side.as_char()
        ),
        OutputMessage::OrderExecuted(e) => format!(
            "E, {}, {}, {}, {}, {}",
            e.resting_order_id, e.incoming_order_id, e.fill_seq, e.price, e.quantity
        ),
        OutputMessage::OrderDeleted(d) => {
            let outcome = if d.found { 'A' } else { 'R' };
            format!("X, {}, {}", d.order_id, outcome)
        }
    }
}

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

fn split_fields(s: &str) -> Vec<&str> {
    if s.contains(',') {
        s.split(',').map(str::trim).collect()
    } else {
        s.split_whitespace().collect()
    }
}

fn expect_fields(tokens: &[&str], expected: usize) -> Result<(), CsvError> {
    if tokens.len() != expected {
        return Err(CsvError::FieldCount {
            expected,
            got: tokens.len(),
        });
    }
    Ok(())
}

fn parse_u32(field: &'static str, s: &str) -> Result<u32, CsvError> {
    s.parse::<u32>()
        .map_err(|source| CsvError::InvalidNumber { field, source })
}
