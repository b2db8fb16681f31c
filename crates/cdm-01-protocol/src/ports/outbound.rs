//! # Outbound Ports (Driven Ports)
//!
//! SPIs the generator requires: the backend sequence counter and an
//! injectable clock.

use shared_types::BackendError;

/// One counter row as reported by the backing counter store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Raw type code (`"PROC"`, ...). Unrecognized codes are skipped by
    /// the service when mapping to typed statistics.
    pub type_code: String,
    /// Calendar year of the counter.
    pub year: u16,
    /// Numbers issued in total, including before any reset.
    pub total_issued: u64,
    /// Current counter value.
    pub last_sequence: u32,
    /// Unix timestamp of the last counter change.
    pub last_updated: i64,
}

/// Abstract interface over the backend's per-`(type, year)` counters.
///
/// `next` must be atomic: a single increment-and-return round trip.
/// Implementations must never expose a read-then-write window.
#[async_trait::async_trait]
pub trait SequenceCounter: Send + Sync {
    /// Atomically increment and return the new sequence value.
    async fn next(&self, type_code: &str, year: u16) -> Result<u32, BackendError>;

    /// The value `next` would return, without advancing.
    async fn peek(&self, type_code: &str, year: u16) -> Result<u32, BackendError>;

    /// Counter rows, optionally restricted to one year.
    async fn stats(&self, year: Option<u16>) -> Result<Vec<CounterSnapshot>, BackendError>;

    /// Reset a counter to zero; returns the previous value.
    async fn reset(&self, type_code: &str, year: u16) -> Result<u32, BackendError>;
}

/// Abstract interface for time operations (for testability).
pub trait Clock: Send + Sync {
    /// Current unix timestamp in seconds.
    fn now_unix(&self) -> i64;

    /// Current four-digit calendar year (UTC).
    fn current_year(&self) -> u16;
}
