//! Offline replay: run a CSV input stream through a fresh engine and
//! write every event as a CSV line.

use std::io::{BufRead, Write};

use anyhow::Context;
use exchange_core::{Clock, MatchingEngine};
use exchange_protocol::csv_codec::{format_output_csv, parse_input_line};
use tracing::warn;

/// Counters reported at the end of a replay.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    pub processed: usize,
    pub skipped: usize,
    pub rejected: usize,
    pub events: usize,
}

/// Replay `input` line by line. Malformed lines and rejected messages
/// are logged and counted, never fatal.
pub fn replay<C: Clock>(
    engine: &MatchingEngine<C>,
    input: impl BufRead,
    mut output: impl Write,
) -> anyhow::Result<ReplayStats> {
    let mut stats = ReplayStats::default();

    for (lineno, line) in input.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", lineno + 1))?;

        let msg = match parse_input_line(&line) {
            Ok(Some(msg)) => msg,
            Ok(None) => continue,
            Err(e) => {
                warn!(line = lineno + 1, error = %e, "skipping malformed line");
                stats.skipped += 1;
                continue;
            }
        };

        match engine.process_message(msg) {
            Ok(events) => {
                stats.processed += 1;
                stats.events += events.len();
                for event in &events {
                    writeln!(output, "{}", format_output_csv(event))?;
                }
            }
            Err(e) => {
                warn!(line = lineno + 1, error = %e, "message rejected");
                stats.rejected += 1;
            }
        }
    }

    output.flush()?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClock;

    impl Clock for FixedClock {
        fn now_ns(&self) -> u64 {
            42
        }
    }

    #[test]
    fn replays_and_counts() {
        let engine = MatchingEngine::with_clock(FixedClock);
        let input = "\
# resting sell, then a crossing buy
S, 1, ABC, 10, 100
B, 2, ABC, 10, 40
B, 3, ABC, 10, 0
garbage line
C, 1
";
        let mut out = Vec::new();
        let stats = replay(&engine, input.as_bytes(), &mut out).unwrap();

        assert_eq!(
            stats,
            ReplayStats {
                processed: 3,
                skipped: 1,
                rejected: 1,
                events: 3,
            }
        );
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "A, 1, ABC, 10, 100, S, 42, 42",
                "E, 1, 2, 1, 10, 40, 42, 42",
                "X, 1, A, 42, 42",
            ]
        );
    }
}
