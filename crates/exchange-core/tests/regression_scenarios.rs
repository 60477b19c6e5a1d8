// crates/exchange-core/tests/regression_scenarios.rs
mod common;

use exchange_core::EngineError;
use exchange_protocol::csv_codec::{format_output_compact, parse_input_line};

const INPUT: &str = include_str!("data/input.csv");
const EXPECTED: &str = include_str!("data/expected_output.csv");

#[test]
fn full_input_matches_reference_output() {
    let engine = common::engine();
    let mut actual_lines: Vec<String> = Vec::new();
    let mut dropped = 0;

    for (lineno, raw_line) in INPUT.lines().enumerate() {
        let input_msg = match parse_input_line(raw_line) {
            Ok(Some(msg)) => msg,
            Ok(None) => continue,
            Err(e) => panic!("line {}: {e}", lineno + 1),
        };

        match engine.process_message(input_msg) {
            Ok(outputs) => actual_lines.extend(outputs.iter().map(format_output_compact)),
            Err(EngineError::InvalidQuantity { .. }) => dropped += 1,
            Err(e) => panic!("line {}: unexpected rejection: {e}", lineno + 1),
        }
    }

    let expected_lines: Vec<&str> = EXPECTED
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    for (i, (actual, expected)) in actual_lines.iter().zip(&expected_lines).enumerate() {
        assert_eq!(actual, expected, "output line {} differs", i + 1);
    }
    assert_eq!(actual_lines.len(), expected_lines.len(), "output length differs");
    assert_eq!(dropped, 1, "exactly one zero-quantity order in the input");

    common::assert_consistent(&engine);
}
