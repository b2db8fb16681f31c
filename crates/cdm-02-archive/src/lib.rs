//! # Archive Subsystem (cdm-02)
//!
//! Document listing, retrieval, upload, status transitions, and the
//! dashboard aggregation behind the archive views. Pure CRUD glue over
//! the backend table and object-store ports; the interesting rules
//! (status transitions, protocol numbering) live in `shared-types` and
//! `cdm-01-protocol`.

pub mod dashboard;
pub mod service;

pub use dashboard::{summarize, ArchiveDashboard, KindCount, StatusCount};
pub use service::{ArchiveService, NewDocument};
