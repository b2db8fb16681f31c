//! # Shared Types Crate
//!
//! This crate contains the domain entities, query/pagination types, and the
//! backend error taxonomy shared across the CODEMA subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Validated Workflow**: Complaint status transitions are enforced by
//!   `ComplaintStatus::can_advance_to`; callers cannot skip or regress steps.
//! - **No Ambient Client**: Nothing in this crate reaches for a global
//!   backend handle; services receive their collaborators explicitly.

pub mod entities;
pub mod errors;
pub mod query;

pub use entities::*;
pub use errors::*;
pub use query::*;
