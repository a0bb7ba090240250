//! Time-related utilities with clock abstraction for testability.

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get current Unix timestamp (milliseconds)
    fn now_millis(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        now_millis()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: i64,
}

impl FixedClock {
    /// Create a new fixed clock with the given timestamp
    pub fn new(fixed_time_millis: i64) -> Self {
        Self {
            fixed_time: fixed_time_millis,
        }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.fixed_time
    }
}

/// Get current Unix timestamp (milliseconds)
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// UTC offset of the local timezone at the current instant
pub fn local_offset() -> FixedOffset {
    Local::now().offset().fix()
}

/// Convert Unix timestamp (milliseconds) to `HH:MM:SS` in the given offset.
///
/// Returns `None` when the timestamp is out of chrono's representable range.
pub fn timestamp_to_clock_time(timestamp_millis: i64, offset: &FixedOffset) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(timestamp_millis)
        .map(|dt| dt.with_timezone(offset).format("%H:%M:%S").to_string())
}
