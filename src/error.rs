//! Top-level error type for SPV inclusion checks.

use crate::chain::types::{BlockId, Digest32};
use crate::nipopow::validation::ProofError;
use crate::spv::traits::TransportError;
use thiserror::Error;

/// Errors surfaced to callers of the verifier and the SPV flow.
#[derive(Debug, Error)]
pub enum SpvError {
    #[error("Malformed proof: {0}")]
    MalformedProof(String),

    #[error("Structurally invalid proof: {0}")]
    StructurallyInvalidProof(#[from] ProofError),

    #[error("No valid proof has been processed")]
    NoBestProof,

    #[error("Best proof ends at {found}, expected {expected}")]
    HeadMismatch { expected: BlockId, found: BlockId },

    #[error("Header mismatch: {0}")]
    HeaderMismatch(String),

    #[error("Transaction {tx_id} is not included in block {header_id}")]
    InvalidMerkleProof { tx_id: Digest32, header_id: BlockId },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}

impl From<serde_json::Error> for SpvError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedProof(err.to_string())
    }
}
