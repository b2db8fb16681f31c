//! # Error Types
//!
//! Defines the backend error taxonomy shared across subsystems.

use thiserror::Error;

/// Errors surfaced by the backend access layer.
///
/// Every failure a subsystem can see from the backend maps onto one of
/// these variants; there are no silent failure paths.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// Backend unreachable (network down, service offline).
    #[error("Backend unavailable: {message}")]
    Unavailable { message: String },

    /// A named remote procedure failed server-side.
    #[error("RPC '{procedure}' failed: {message}")]
    RpcFailed { procedure: String, message: String },

    /// Row or object not found.
    #[error("Not found: {entity}")]
    NotFound { entity: String },

    /// Caller's role does not permit the action.
    #[error("Permission denied: {action}")]
    PermissionDenied { action: String },

    /// Update conflicts with current state (e.g. illegal status transition).
    #[error("Conflict: {message}")]
    Conflict { message: String },
}
