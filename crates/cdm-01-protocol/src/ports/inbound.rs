//! # Inbound Ports (Driving Ports)
//!
//! Public API exposed by the protocol generator to other subsystems.

use shared_types::Session;

use crate::domain::{
    IssuedProtocol, ProtocolError, ProtocolNumber, ProtocolType, Reconciliation, ResetAudit,
    SequenceStats,
};

/// Primary API for the protocol generator.
///
/// Parsing and format validation have no state and live as free
/// functions in the domain layer ([`crate::domain::parse_protocol`],
/// [`crate::domain::validate_format`]).
#[async_trait::async_trait]
pub trait ProtocolGeneratorApi: Send + Sync {
    /// Issue the next number for `(protocol_type, current year)`.
    ///
    /// Backend path: one atomic increment-and-return. Degraded path
    /// (backend unavailable): a locally derived provisional number,
    /// marked with `Provenance::LocalFallback` and queued for
    /// reconciliation. Errors only when the counter is exhausted.
    async fn generate(
        &self,
        protocol_type: ProtocolType,
    ) -> Result<IssuedProtocol, ProtocolError>;

    /// The number the next `generate` would issue, without advancing the
    /// counter. No fallback: an unavailable backend is an error, since a
    /// preview the backend did not produce has no value.
    async fn peek_next(
        &self,
        protocol_type: ProtocolType,
    ) -> Result<ProtocolNumber, ProtocolError>;

    /// Counter statistics grouped by `(type, year)`, defaulting to the
    /// current year, ordered by type code.
    async fn statistics(&self, year: Option<u16>) -> Result<Vec<SequenceStats>, ProtocolError>;

    /// Reset the `(type, year)` counter to zero so the next issue is 001.
    ///
    /// Privileged: `requested_by` must hold the Admin role. Every reset
    /// produces an audit record.
    async fn reset_sequence(
        &self,
        protocol_type: ProtocolType,
        year: Option<u16>,
        requested_by: &Session,
    ) -> Result<ResetAudit, ProtocolError>;

    /// Replace queued provisional numbers with backend-issued ones.
    ///
    /// Each replacement is issued against the provisional's own
    /// `(type, year)` counter, so a fallback number stays in the year it
    /// was issued even when reconciliation runs after a rollover.
    /// Returns the mappings achieved this round; numbers the backend
    /// still cannot serve stay queued for a later round or manual review.
    async fn reconcile(&self) -> Vec<Reconciliation>;
}
