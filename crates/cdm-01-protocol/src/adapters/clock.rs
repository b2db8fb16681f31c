//! # Clock Adapters
//!
//! System clock for production wiring and a settable fixed clock for
//! tests (year-rollover scenarios need time control).

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{Datelike, Utc};

use crate::ports::Clock;

/// Wall-clock implementation backed by `chrono`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        Utc::now().timestamp()
    }

    fn current_year(&self) -> u16 {
        Utc::now().year() as u16
    }
}

/// Settable clock for tests.
pub struct FixedClock {
    now_unix: AtomicI64,
}

impl FixedClock {
    pub fn new(now_unix: i64) -> Self {
        Self {
            now_unix: AtomicI64::new(now_unix),
        }
    }

    /// Move the clock to a new timestamp.
    pub fn set(&self, now_unix: i64) {
        self.now_unix.store(now_unix, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_unix(&self) -> i64 {
        self.now_unix.load(Ordering::SeqCst)
    }

    fn current_year(&self) -> u16 {
        chrono::DateTime::from_timestamp(self.now_unix(), 0)
            .map(|t| t.year() as u16)
            .unwrap_or(1970)
    }
}
