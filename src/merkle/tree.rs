//! Binary Merkle tree over arbitrary leaves.
//!
//! ```text
//! leaf      = H(0x00 || data)
//! internal  = H(0x01 || left || right)
//! promoted  = H(0x01 || left)          (odd node at the end of a level)
//! ```
//!
//! The empty tree commits to the all-zero digest.

use super::proof::{LevelNode, MerkleProof, NodeSide};
use crate::chain::types::Digest32;

/// Domain prefix for leaf hashes.
pub const LEAF_PREFIX: u8 = 0;

/// Domain prefix for internal node hashes.
pub const INTERNAL_PREFIX: u8 = 1;

/// Root of a tree with no leaves.
pub const EMPTY_ROOT: Digest32 = Digest32::zero();

pub fn leaf_hash(data: &[u8]) -> Digest32 {
    Digest32::hash_parts(&[&[LEAF_PREFIX], data])
}

/// Hash of an internal node. `right` is `None` for a promoted odd node.
pub fn internal_hash(left: &Digest32, right: Option<&Digest32>) -> Digest32 {
    match right {
        Some(right) => {
            Digest32::hash_parts(&[&[INTERNAL_PREFIX], left.as_bytes(), right.as_bytes()])
        }
        None => Digest32::hash_parts(&[&[INTERNAL_PREFIX], left.as_bytes()]),
    }
}

fn next_level(level: &[Digest32]) -> Vec<Digest32> {
    level
        .chunks(2)
        .map(|pair| internal_hash(&pair[0], pair.get(1)))
        .collect()
}

/// Merkle root of `leaves`.
pub fn merkle_root<T: AsRef<[u8]>>(leaves: &[T]) -> Digest32 {
    let mut level: Vec<Digest32> = leaves.iter().map(|l| leaf_hash(l.as_ref())).collect();
    if level.is_empty() {
        return EMPTY_ROOT;
    }
    while level.len() > 1 {
        level = next_level(&level);
    }
    level[0]
}

/// Authentication path for the leaf at `index`, or `None` if out of range.
pub fn merkle_path<T: AsRef<[u8]>>(leaves: &[T], index: usize) -> Option<Vec<LevelNode>> {
    if index >= leaves.len() {
        return None;
    }

    let mut level: Vec<Digest32> = leaves.iter().map(|l| leaf_hash(l.as_ref())).collect();
    let mut index = index;
    let mut path = Vec::new();

    while level.len() > 1 {
        let node = if index % 2 == 0 {
            LevelNode {
                hash: level.get(index + 1).copied(),
                side: NodeSide::Left,
            }
        } else {
            LevelNode {
                hash: Some(level[index - 1]),
                side: NodeSide::Right,
            }
        };
        path.push(node);
        level = next_level(&level);
        index /= 2;
    }

    Some(path)
}

impl MerkleProof {
    /// Build the inclusion proof for `leaves[index]`.
    pub fn for_leaf(leaves: &[Digest32], index: usize) -> Option<Self> {
        let leaf = *leaves.get(index)?;
        let levels = merkle_path(leaves, index)?;
        Some(Self { leaf, levels })
    }
}
