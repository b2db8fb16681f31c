//! # Domain Errors
//!
//! Error taxonomy for the protocol generator.

use shared_types::BackendError;
use thiserror::Error;

use super::value_objects::ProtocolType;

/// Errors surfaced by generator operations.
///
/// `generate` recovers from backend unavailability through the local
/// fallback and therefore does not surface [`ProtocolError::Backend`]
/// for that case; peek, statistics, reset, and reconcile do.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The `(type, year)` counter is past the widest supported field.
    #[error("Sequence exhausted for {protocol_type} in {year}: counter past {max}")]
    SequenceExhausted {
        protocol_type: ProtocolType,
        year: u16,
        max: u32,
    },

    /// Caller's role does not permit the operation.
    #[error("Not authorized: {action} requires the Admin role")]
    NotAuthorized { action: String },

    /// Backend call failed and the operation has no fallback.
    #[error(transparent)]
    Backend(#[from] BackendError),
}
