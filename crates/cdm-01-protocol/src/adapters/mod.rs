//! Adapters layer: outbound-port implementations.

pub mod clock;
pub mod rpc;

pub use clock::{FixedClock, SystemClock};
pub use rpc::RpcSequenceCounter;
