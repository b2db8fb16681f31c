//! # Mobile API Subsystem (cdm-04)
//!
//! Read-side aggregation for the mobile client: one dashboard call that
//! combines complaints, meetings, resolutions, and protocol totals, plus
//! complaint registration wired to the protocol generator (OUV numbers).

pub mod service;

pub use service::{
    MobileApiError, MobileApiService, MobileDashboard, NewComplaint, RegisteredComplaint,
    StatusCount,
};
