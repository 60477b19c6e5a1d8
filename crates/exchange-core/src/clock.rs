//! Timestamp source for arrival and event times.
//!
//! The engine never reads the wall clock directly; it goes through a
//! [`Clock`] so tests can substitute a deterministic one.

use std::time::{SystemTime, UNIX_EPOCH};

/// A source of nanosecond timestamps.
pub trait Clock: Send + Sync {
    /// Current time in nanoseconds since the Unix epoch.
    fn now_ns(&self) -> u64;
}

/// Wall-clock time via [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ns(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        now.as_secs()
            .saturating_mul(1_000_000_000)
            .saturating_add(u64::from(now.subsec_nanos()))
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now_ns(&self) -> u64 {
        (**self).now_ns()
    }
}
