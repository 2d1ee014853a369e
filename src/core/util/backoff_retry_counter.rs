// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::atomic::{AtomicUsize, Ordering};

// Doubling from 1 second, clamped at 1 minute.
const INTERVALS: &[(u64, &str)] = &[
    (1_000, "1 sec"),
    (2_000, "2 sec"),
    (4_000, "4 sec"),
    (8_000, "8 sec"),
    (16_000, "16 sec"),
    (32_000, "32 sec"),
    (60_000, "1 min"),
];

/// Produces the next reconnect delay in a bounded exponential sequence.
///
/// One counter per table, written only from the reconnect path; the atomic
/// index exists so the facade can hold it behind `&self`, not to support
/// concurrent writers.
#[derive(Debug, Default)]
pub struct BackoffRetryCounter {
    index: AtomicUsize,
}

impl BackoffRetryCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current delay in milliseconds.
    pub fn time_interval_millis(&self) -> u64 {
        INTERVALS[self.index.load(Ordering::Relaxed)].0
    }

    /// Human-readable rendering of the current delay, for diagnostics.
    pub fn time_interval(&self) -> &'static str {
        INTERVALS[self.index.load(Ordering::Relaxed)].1
    }

    /// Advance to the next delay. Idempotent once the ceiling is reached.
    pub fn increment(&self) {
        let _ = self
            .index
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |i| {
                if i + 1 < INTERVALS.len() {
                    Some(i + 1)
                } else {
                    None
                }
            });
    }

    /// Return to the floor after a successful connect.
    pub fn reset(&self) {
        self.index.store(0, Ordering::Relaxed);
    }
}
