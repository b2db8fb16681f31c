//! # Notification Subsystem (cdm-03)
//!
//! Notification rule configuration and event dispatch. A rule maps a
//! council event kind to delivery channels and recipient roles; dispatch
//! renders a localized message per channel and reports per-channel
//! outcomes instead of failing the whole dispatch on the first error.

pub mod render;
pub mod service;

pub use render::render_message;
pub use service::{DispatchOutcome, DispatchReport, NotificationService};
