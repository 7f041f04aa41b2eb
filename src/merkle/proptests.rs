//! Property-based tests for Merkle inclusion proofs
//!
//! Tests for:
//! - Completeness: every leaf of every tree proves against the root
//! - Soundness: any single bit flip in a sibling hash breaks the proof
//! - Soundness: flipping any side marker breaks the proof

use super::proof::MerkleProof;
use super::tree::merkle_root;
use crate::chain::types::Digest32;
use proptest::prelude::*;

/// Distinct leaves, so no two subtrees hash alike.
fn arb_leaves(min: usize) -> impl Strategy<Value = Vec<Digest32>> {
    prop::collection::btree_set(any::<[u8; 32]>(), min..40)
        .prop_map(|set| set.into_iter().map(Digest32).collect())
}

proptest! {
    /// Property: Completeness
    #[test]
    fn prop_every_leaf_verifies(leaves in arb_leaves(1), pick in any::<prop::sample::Index>()) {
        let index = pick.index(leaves.len());
        let root = merkle_root(&leaves);
        let proof = MerkleProof::for_leaf(&leaves, index).unwrap();

        prop_assert!(proof.is_valid(&root));
    }

    /// Property: Soundness under sibling corruption
    #[test]
    fn prop_sibling_bit_flip_rejected(
        leaves in arb_leaves(2),
        pick in any::<prop::sample::Index>(),
        level_pick in any::<prop::sample::Index>(),
        bit in 0usize..256,
    ) {
        let index = pick.index(leaves.len());
        let root = merkle_root(&leaves);
        let mut proof = MerkleProof::for_leaf(&leaves, index).unwrap();

        // Only levels that carry a sibling can be corrupted
        let with_sibling: Vec<usize> = proof
            .levels
            .iter()
            .enumerate()
            .filter(|(_, node)| node.hash.is_some())
            .map(|(i, _)| i)
            .collect();
        prop_assume!(!with_sibling.is_empty());

        let level = with_sibling[level_pick.index(with_sibling.len())];
        let sibling = proof.levels[level].hash.unwrap();
        proof.levels[level].hash = Some(sibling.with_bit_flipped(bit));

        prop_assert!(!proof.is_valid(&root), "Corrupted sibling must not verify");
    }

    /// Property: Soundness under side-marker corruption
    #[test]
    fn prop_side_flip_rejected(
        leaves in arb_leaves(2),
        pick in any::<prop::sample::Index>(),
        level_pick in any::<prop::sample::Index>(),
    ) {
        let index = pick.index(leaves.len());
        let root = merkle_root(&leaves);
        let mut proof = MerkleProof::for_leaf(&leaves, index).unwrap();
        prop_assume!(!proof.levels.is_empty());

        let level = level_pick.index(proof.levels.len());
        proof.levels[level].side = proof.levels[level].side.flipped();

        prop_assert!(!proof.is_valid(&root), "Flipped side must not verify");
    }
}
