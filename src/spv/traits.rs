//! Trait abstraction for the node transport.
//!
//! The verifier never talks to the network itself. Whatever fetches proofs,
//! headers and Merkle paths implements [`NodeClient`] and hands back the raw
//! JSON bytes, which the core parses as untrusted input.

use crate::chain::types::{BlockId, Digest32};
use crate::nipopow::PoPowParams;
use async_trait::async_trait;
use thiserror::Error;

/// Transport failures. Owned by the collaborator; the core only logs or
/// forwards them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Peer unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::Io(err.to_string()),
        }
    }
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Source of proofs, headers and Merkle paths for a set of peers.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// NiPoPoW proof ending at `header_id`, built by `peer` with `params`.
    async fn fetch_proof(
        &self,
        peer: &str,
        params: &PoPowParams,
        header_id: &BlockId,
    ) -> TransportResult<Vec<u8>>;

    /// The header with id `header_id`.
    async fn fetch_header(&self, peer: &str, header_id: &BlockId) -> TransportResult<Vec<u8>>;

    /// Merkle path for `tx_id` inside block `header_id`.
    async fn fetch_merkle_proof(
        &self,
        peer: &str,
        header_id: &BlockId,
        tx_id: &Digest32,
    ) -> TransportResult<Vec<u8>>;
}
