//! Interlink vectors.
//!
//! `interlinks[i]` is the id of the most recent ancestor whose level is at
//! least `i`. Entry 0 is always the genesis id, because genesis sits at every
//! level. The genesis block itself carries an empty vector.

use super::header::BlockHeader;
use super::types::{BlockId, ChainError, Digest32};
use crate::merkle::merkle_root;

/// Interlinks of the child of `prev`, given the interlinks `prev` carries.
///
/// ```text
/// prev is genesis        -> [prev.id]
/// level(prev) == 0       -> prev_interlinks
/// level(prev) == l > 0   -> [genesis] ++ [prev.id; l] ++ prev_interlinks[1 + l..]
/// ```
pub fn update_interlinks(
    prev: &BlockHeader,
    prev_interlinks: &[BlockId],
) -> Result<Vec<BlockId>, ChainError> {
    if prev.is_genesis() {
        return Ok(vec![prev.id]);
    }

    let genesis = *prev_interlinks
        .first()
        .ok_or(ChainError::EmptyInterlinks {
            height: prev.height,
        })?;

    let level = prev.level() as usize;
    if level == 0 {
        return Ok(prev_interlinks.to_vec());
    }

    let mut next = Vec::with_capacity((1 + level).max(prev_interlinks.len()));
    next.push(genesis);
    next.extend(std::iter::repeat(prev.id).take(level));
    if let Some(rest) = prev_interlinks.get(1 + level..) {
        next.extend_from_slice(rest);
    }
    Ok(next)
}

/// Commitment stored in `BlockHeader::interlinks_root`.
pub fn interlinks_root(interlinks: &[BlockId]) -> Digest32 {
    merkle_root(interlinks)
}
