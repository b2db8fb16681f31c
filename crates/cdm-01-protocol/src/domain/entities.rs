//! # Domain Entities
//!
//! Statistics, audit, and reconciliation records produced by the
//! generator.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::{ProtocolNumber, ProtocolType};

/// Counter statistics for one `(type, year)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceStats {
    /// Protocol type the counter belongs to.
    pub protocol_type: ProtocolType,
    /// Calendar year of the counter.
    pub year: u16,
    /// Numbers issued in total, including before any reset.
    pub total_issued: u64,
    /// Current counter value (0 right after a reset).
    pub last_sequence: u32,
    /// Unix timestamp of the last counter change.
    pub last_updated: i64,
}

/// Audit record produced by every counter reset.
///
/// Resets are rare, privileged, and always leave one of these behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetAudit {
    /// Audit row identifier.
    pub audit_id: Uuid,
    /// Type whose counter was reset.
    pub protocol_type: ProtocolType,
    /// Year whose counter was reset.
    pub year: u16,
    /// Counter value before the reset.
    pub previous_sequence: u32,
    /// Admin user who requested the reset.
    pub requested_by: Uuid,
    /// Display name of the requester, for the audit view.
    pub requested_by_name: String,
    /// Unix timestamp of the reset.
    pub at: i64,
}

/// Mapping produced when a provisional number is replaced by a
/// backend-issued one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// The fallback-issued number being retired.
    pub provisional: ProtocolNumber,
    /// The authoritative backend-issued replacement.
    pub permanent: ProtocolNumber,
}
