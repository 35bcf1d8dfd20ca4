//! Timeout helpers used across the crate.
//!
//! The blocking send does not own a hard timer: PortManager is expected to
//! call back with a timeout indication. The caller only waits for a bounded
//! number of poll intervals, computed here.

use std::time::Duration;

use crate::constants::DEFAULT_POLL_INTERVAL_MS;

/// Convert milliseconds to Duration.
pub fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Default poll interval of the blocking send.
pub fn default_poll_interval() -> Duration {
    ms(DEFAULT_POLL_INTERVAL_MS)
}

/// Number of poll intervals a blocking send waits before giving up:
/// `ceil(timeout / interval) + 1`. The extra interval covers a callback
/// that lands right at the timeout. A zero interval counts as one
/// microsecond.
pub fn poll_ceiling(timeout_ms: u64, interval: Duration) -> u64 {
    let interval_us = interval.as_micros().max(1);
    let timeout_us = u128::from(timeout_ms) * 1000;
    let polls = timeout_us.div_ceil(interval_us);
    u64::try_from(polls).unwrap_or(u64::MAX).saturating_add(1)
}

/// Longest time a blocking send may wait: `poll_ceiling * interval`.
pub fn max_wait(timeout_ms: u64, interval: Duration) -> Duration {
    let polls = u32::try_from(poll_ceiling(timeout_ms, interval)).unwrap_or(u32::MAX);
    interval.saturating_mul(polls)
}
