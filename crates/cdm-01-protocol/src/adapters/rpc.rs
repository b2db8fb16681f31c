//! # RPC Sequence Counter Adapter
//!
//! Bridges the [`SequenceCounter`] outbound port onto the backend's
//! protocol remote procedures. Thin translation only: each port call maps
//! to exactly one RPC, so the backend's atomicity guarantee carries
//! through unchanged.

use std::sync::Arc;

use cdm_backend::ProtocolRpc;
use shared_types::BackendError;

use crate::ports::{CounterSnapshot, SequenceCounter};

/// [`SequenceCounter`] backed by [`cdm_backend::ProtocolRpc`].
pub struct RpcSequenceCounter {
    rpc: Arc<dyn ProtocolRpc>,
}

impl RpcSequenceCounter {
    pub fn new(rpc: Arc<dyn ProtocolRpc>) -> Self {
        Self { rpc }
    }
}

#[async_trait::async_trait]
impl SequenceCounter for RpcSequenceCounter {
    async fn next(&self, type_code: &str, year: u16) -> Result<u32, BackendError> {
        self.rpc.generate_next_protocol(type_code, year).await
    }

    async fn peek(&self, type_code: &str, year: u16) -> Result<u32, BackendError> {
        self.rpc.peek_next_protocol(type_code, year).await
    }

    async fn stats(&self, year: Option<u16>) -> Result<Vec<CounterSnapshot>, BackendError> {
        let rows = self.rpc.get_protocol_statistics(year).await?;
        Ok(rows
            .into_iter()
            .map(|row| CounterSnapshot {
                type_code: row.type_code,
                year: row.year,
                total_issued: row.total_issued,
                last_sequence: row.last_sequence,
                last_updated: row.last_updated,
            })
            .collect())
    }

    async fn reset(&self, type_code: &str, year: u16) -> Result<u32, BackendError> {
        self.rpc.reset_protocol_sequence(type_code, year).await
    }
}
