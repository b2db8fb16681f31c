//! # Protocol Generator Subsystem (cdm-01)
//!
//! The protocol generator is the platform's authority for issuing the
//! human-readable sequential identifiers (`TYPE-NNN/YYYY`) that every
//! council record carries. It wraps the backend's atomic counter RPC and
//! adds parsing, validation, statistics, audited resets, and a degraded
//! local fallback with a reconciliation queue.
//!
//! ## Numbering contract
//!
//! - Counters are keyed by the composite `(type, year)`; a new year starts
//!   every type at `001` without touching prior years.
//! - Backend-issued sequences are unique and strictly increasing per key,
//!   gap-free under serial issuance. The backend increment is a single
//!   round-trip increment-and-return, never read-then-write.
//! - Sequences format at three digits and widen to four past `999`; the
//!   generator refuses to issue past `9999` rather than wrap.
//!
//! ## Degraded operation
//!
//! When the backend is unreachable, `generate` falls back to a locally
//! derived number (current unix timestamp modulo 1000). Fallback numbers
//! are **not** collision-free across clients, so they are marked
//! structurally: the formatted string carries a reserved `-P` suffix, the
//! issue carries `Provenance::LocalFallback`, and the number is queued for
//! reconciliation. `reconcile()` later replaces each provisional number
//! with a freshly issued backend number; the backend number is always the
//! authoritative one.
//!
//! ## Hexagonal Architecture
//!
//! - **Domain Layer** (`domain/`): value objects, pure parse/format/validate
//!   logic, no I/O dependencies
//! - **Ports Layer** (`ports/`): inbound API trait, outbound counter/clock
//!   traits
//! - **Adapters Layer** (`adapters/`): bridge to the backend RPC client and
//!   the system clock

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export main types for convenience
pub use domain::{
    parse_protocol, validate_format, IssuedProtocol, ProtocolError, ProtocolNumber, ProtocolType,
    Provenance, Reconciliation, ResetAudit, SequenceStats, FALLBACK_MODULUS, MAX_SEQUENCE,
};

pub use ports::{Clock, CounterSnapshot, ProtocolGeneratorApi, SequenceCounter};

pub use adapters::{FixedClock, RpcSequenceCounter, SystemClock};

pub use service::ProtocolService;
