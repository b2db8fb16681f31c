//! Ports layer: inbound API and outbound SPI traits.

pub mod inbound;
pub mod outbound;

pub use inbound::ProtocolGeneratorApi;
pub use outbound::{Clock, CounterSnapshot, SequenceCounter};
