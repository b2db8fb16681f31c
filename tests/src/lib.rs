//! # CODEMA Core Test Suite
//!
//! Cross-subsystem integration tests: protocol generation end to end
//! (including the degraded fallback and reconciliation), concurrency
//! uniqueness against the shared in-memory backend, and the mobile /
//! archive / notification flows that compose multiple subsystems.

#[cfg(test)]
pub mod integration;

/// Install the env-filtered subscriber once per test binary. Safe to
/// call from every test; later calls are no-ops.
#[cfg(test)]
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}
