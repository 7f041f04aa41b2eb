//! Proof comparison (the KMZ17 "best-arg" rule).

use super::proof::VerifiedProof;
use super::validation::ProofError;
use crate::chain::header::BlockHeader;
use crate::chain::types::BlockId;
use num_bigint::BigUint;
use std::collections::HashMap;

/// Highest level the score walk will consider.
const MAX_SCORED_LEVEL: u32 = 256;

/// Outcome of comparing two proofs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preference {
    First,
    Second,
    Equal,
}

impl Preference {
    /// The same outcome seen from the other side.
    pub fn invert(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
            Self::Equal => Self::Equal,
        }
    }
}

/// Score of a chain segment: `max(2^μ · |C↑μ|)`.
///
/// Level 0 always counts every header. A level μ > 0 contributes only while it
/// holds at least `m` superblocks; the walk stops at the first level that
/// does not.
pub fn best_arg(headers: &[&BlockHeader], m: u32) -> BigUint {
    let mut best = BigUint::from(headers.len());

    let mut level = 1u32;
    while level <= MAX_SCORED_LEVEL {
        let count = headers.iter().filter(|h| h.level() >= level).count();
        if count == 0 || count < m as usize {
            break;
        }
        let score = BigUint::from(count) << level as usize;
        if score > best {
            best = score;
        }
        level += 1;
    }

    best
}

/// Last header of `a` that also appears in `b`.
///
/// Both chains must start at the same block; otherwise they share no anchor
/// and [`ProofError::NoCommonAncestor`] is returned.
pub fn lowest_common_ancestor<'a>(
    a: &[&'a BlockHeader],
    b: &[&BlockHeader],
) -> Result<&'a BlockHeader, ProofError> {
    let mut lca = match (a.first(), b.first()) {
        (Some(x), Some(y)) if x.id == y.id => *x,
        _ => return Err(ProofError::NoCommonAncestor),
    };

    let heights_in_b: HashMap<BlockId, u64> = b.iter().map(|h| (h.id, h.height)).collect();

    for &header in a {
        if heights_in_b.get(&header.id) == Some(&header.height) {
            lca = header;
        }
    }
    Ok(lca)
}

fn above_height<'a>(chain: &[&'a BlockHeader], height: u64) -> Vec<&'a BlockHeader> {
    chain.iter().copied().filter(|h| h.height > height).collect()
}

/// Compare two verified proofs by the work they present after their fork.
pub fn compare(a: &VerifiedProof, b: &VerifiedProof, m: u32) -> Result<Preference, ProofError> {
    let chain_a = a.proof().headers_chain();
    let chain_b = b.proof().headers_chain();

    let lca_height = lowest_common_ancestor(&chain_a, &chain_b)?.height;

    let score_a = best_arg(&above_height(&chain_a, lca_height), m);
    let score_b = best_arg(&above_height(&chain_b, lca_height), m);

    Ok(match score_a.cmp(&score_b) {
        std::cmp::Ordering::Greater => Preference::First,
        std::cmp::Ordering::Less => Preference::Second,
        std::cmp::Ordering::Equal => Preference::Equal,
    })
}
