//! Domain layer: pure protocol-number logic, no I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::{Reconciliation, ResetAudit, SequenceStats};
pub use errors::ProtocolError;
pub use value_objects::{
    parse_protocol, validate_format, IssuedProtocol, ProtocolNumber, ProtocolType, Provenance,
    FALLBACK_MODULUS, MAX_SEQUENCE,
};
