//! Block headers.

use super::pow::{max_level_of, meets_target};
use super::types::{BlockId, Digest32};
use serde::{Deserialize, Serialize};

/// Height of the genesis block.
pub const GENESIS_HEIGHT: u64 = 1;

/// A block header as served by full nodes.
///
/// The id is not trusted on its own: [`BlockHeader::compute_id`] recomputes it
/// from the remaining fields, and validators reject headers where the two
/// differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    pub id: BlockId,
    pub parent_id: BlockId,
    pub height: u64,
    /// Merkle root of the block's transaction ids.
    pub transactions_root: Digest32,
    /// Merkle root of the block's interlinks vector.
    pub interlinks_root: Digest32,
    /// Compact difficulty target.
    pub n_bits: u32,
    pub timestamp: u64,
    pub nonce: u64,
}

impl BlockHeader {
    /// Canonical id over the header content.
    ///
    /// ```text
    /// SHA-256(parent_id || height LE || transactions_root || interlinks_root
    ///         || n_bits LE || timestamp LE || nonce LE)
    /// ```
    pub fn compute_id(&self) -> BlockId {
        BlockId(Digest32::hash_parts(&[
            self.parent_id.as_bytes(),
            &self.height.to_le_bytes(),
            self.transactions_root.as_bytes(),
            self.interlinks_root.as_bytes(),
            &self.n_bits.to_le_bytes(),
            &self.timestamp.to_le_bytes(),
            &self.nonce.to_le_bytes(),
        ]))
    }

    /// Replace `id` with the canonical id of the current content.
    pub fn seal(mut self) -> Self {
        self.id = self.compute_id();
        self
    }

    /// Whether the declared id matches the content.
    pub fn has_valid_id(&self) -> bool {
        self.id == self.compute_id()
    }

    pub fn is_genesis(&self) -> bool {
        self.height == GENESIS_HEIGHT
    }

    /// The proof-of-work value: the id as a big-endian 256-bit integer.
    pub fn pow_hit(&self) -> &[u8; 32] {
        self.id.as_bytes()
    }

    /// Whether the PoW hit meets the declared difficulty.
    pub fn has_valid_pow(&self) -> bool {
        meets_target(self.n_bits, self.pow_hit())
    }

    /// Superblock level of this header.
    pub fn level(&self) -> u32 {
        max_level_of(self.n_bits, self.pow_hit(), self.is_genesis())
    }
}
