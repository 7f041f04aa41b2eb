//! Merkle inclusion proofs.

use super::tree::{internal_hash, leaf_hash};
use crate::chain::types::Digest32;
use serde::{Deserialize, Serialize};

/// Deepest path accepted. A tree this deep already holds 2^64 leaves.
pub const MAX_PROOF_DEPTH: usize = 64;

/// Side of the parent occupied by the node being authenticated.
///
/// `Left` means the running hash is the left child and the sibling is
/// appended on the right; `Right` is the mirror case. Encoded as `0` / `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum NodeSide {
    Left = 0,
    Right = 1,
}

impl TryFrom<u8> for NodeSide {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Left),
            1 => Ok(Self::Right),
            other => Err(format!("invalid Merkle node side marker: {}", other)),
        }
    }
}

impl From<NodeSide> for u8 {
    fn from(side: NodeSide) -> Self {
        side as u8
    }
}

impl NodeSide {
    pub fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// One step of an authentication path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelNode {
    /// Sibling hash; `None` when the node was promoted without a sibling.
    pub hash: Option<Digest32>,
    pub side: NodeSide,
}

/// Proof that `leaf` (a transaction id) is included under some Merkle root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    pub leaf: Digest32,
    pub levels: Vec<LevelNode>,
}

impl MerkleProof {
    /// Fold the path from the leaf upward.
    ///
    /// Returns `None` for malformed paths: too deep, or a promoted node
    /// claiming to sit on the right.
    pub fn compute_root(&self) -> Option<Digest32> {
        if self.levels.len() > MAX_PROOF_DEPTH {
            return None;
        }

        self.levels
            .iter()
            .try_fold(leaf_hash(self.leaf.as_bytes()), |running, node| {
                match (&node.hash, node.side) {
                    (Some(sibling), NodeSide::Left) => Some(internal_hash(&running, Some(sibling))),
                    (Some(sibling), NodeSide::Right) => Some(internal_hash(sibling, Some(&running))),
                    (None, NodeSide::Left) => Some(internal_hash(&running, None)),
                    (None, NodeSide::Right) => None,
                }
            })
    }

    /// Whether this proof authenticates `leaf` under `root`.
    pub fn is_valid(&self, root: &Digest32) -> bool {
        self.compute_root().as_ref() == Some(root)
    }
}
