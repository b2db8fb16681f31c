//! Integration test modules.

pub mod concurrency;
pub mod flows;
