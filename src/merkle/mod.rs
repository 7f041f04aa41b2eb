//! Merkle trees and transaction inclusion proofs.
//!
//! The same tree shape backs two commitments in a header: the transactions
//! root and the interlinks root.

pub mod proof;
pub mod tree;

#[cfg(test)]
mod proptests;

pub use proof::{LevelNode, MerkleProof, NodeSide, MAX_PROOF_DEPTH};
pub use tree::{merkle_path, merkle_root, EMPTY_ROOT};
