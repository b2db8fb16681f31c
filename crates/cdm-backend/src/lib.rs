//! # Backend Access Layer (cdm-backend)
//!
//! Port traits for every surface of the hosted backend — relational table
//! queries, protocol remote procedures, authentication, object storage,
//! notification dispatch — plus a deterministic in-memory implementation.
//!
//! ## Design
//!
//! - **No ambient client**: callers receive `Arc<dyn Trait>` values through
//!   their constructors. Nothing here is a process-wide singleton.
//! - **Single source of truth**: the backend owns all persistent state;
//!   [`InMemoryBackend`] plays that role in tests and local operation.
//! - **Atomic counters**: `ProtocolRpc::generate_next_protocol` is a single
//!   increment-and-return. The in-memory implementation performs the whole
//!   read-increment-write inside one lock scope, so concurrent callers can
//!   never observe the same value.
//! - **Failure injection**: `InMemoryBackend::set_available(false)` makes
//!   every call fail with `BackendError::Unavailable`, which is how tests
//!   exercise the degraded protocol-generation path.

pub mod memory;
pub mod ports;

pub use memory::{DispatchedNotification, InMemoryBackend, StoredObject};
pub use ports::{
    AuthProvider, NotificationDispatcher, ObjectStore, ProtocolRpc, ProtocolStatRow, TableStore,
};
