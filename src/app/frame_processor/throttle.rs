// SPDX-License-Identifier: GPL-3.0-only

//! Wall-clock throttle shared by the frame analyzers

use std::time::Duration;

/// Minimum interval between two units of work
///
/// Holds the time work was last performed, in milliseconds since the epoch.
/// The owner decides when to `mark`; checking never mutates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Throttle {
    interval_ms: i64,
    /// None until the first unit of work
    last_processed_ms: Option<i64>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval_ms: i64::try_from(interval.as_millis()).unwrap_or(i64::MAX),
            last_processed_ms: None,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms as u64)
    }

    /// Whether work may be performed at `now_ms`
    ///
    /// A clock that went backwards is never due.
    pub fn is_due(&self, now_ms: i64) -> bool {
        match self.last_processed_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        }
    }

    /// Record that work was performed at `now_ms`
    pub fn mark(&mut self, now_ms: i64) {
        self.last_processed_ms = Some(now_ms);
    }

    pub fn last_processed_ms(&self) -> Option<i64> {
        self.last_processed_ms
    }
}
