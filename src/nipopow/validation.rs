//! Structural validation of untrusted proofs.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. the suffix holds exactly `k` headers
//! 2. the suffix is a parent-linked chain of well-formed headers
//! 3. the prefix starts at genesis and every entry's interlinks match its
//!    header commitment
//! 4. consecutive prefix entries are linked by parent or interlink
//! 5. the prefix holds at least `m` entries
//! 6. the last prefix entry is the parent of the first suffix header

use super::proof::{NipopowProof, PoPowHeader, VerifiedProof};
use super::PoPowParams;
use crate::chain::header::BlockHeader;
use crate::chain::pow::within_limit;
use crate::chain::types::BlockId;
use num_bigint::BigUint;
use thiserror::Error;

/// Reasons a proof is structurally invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofError {
    #[error("Suffix length {found}, expected {expected}")]
    SuffixLength { expected: usize, found: usize },

    #[error("Suffix is not a chain at position {index}")]
    BrokenSuffixChain { index: usize },

    #[error("Header {0} does not hash to its id")]
    InvalidHeaderId(BlockId),

    #[error("Header {0} does not meet its difficulty target")]
    InsufficientWork(BlockId),

    #[error("Header {id} declares target {n_bits:#010x}, easier than the proof-of-work limit")]
    TargetAboveLimit { id: BlockId, n_bits: u32 },

    #[error("Header {0} claims genesis height but is not the genesis block")]
    ForeignGenesis(BlockId),

    #[error("Prefix is empty")]
    EmptyPrefix,

    #[error("Prefix starts at {0} instead of genesis")]
    UnanchoredPrefix(BlockId),

    #[error("Interlinks of {0} do not match the header commitment")]
    InterlinksCommitment(BlockId),

    #[error("Interlinks of {0} do not start with genesis")]
    InterlinkGenesisMismatch(BlockId),

    #[error("Prefix is not linked at position {index}")]
    BrokenPrefixChain { index: usize },

    #[error("Prefix has {found} blocks, at least {required} required")]
    InsufficientPrefix { required: usize, found: usize },

    #[error("Suffix does not extend the prefix")]
    DisconnectedSuffix,

    #[error("Proofs share no common ancestor")]
    NoCommonAncestor,
}

/// Id, work and genesis-height checks shared by prefix and suffix headers.
fn check_header(
    header: &BlockHeader,
    genesis: &BlockId,
    pow_limit: &BigUint,
) -> Result<(), ProofError> {
    if !header.has_valid_id() {
        return Err(ProofError::InvalidHeaderId(header.id));
    }
    if header.is_genesis() {
        if header.id != *genesis {
            return Err(ProofError::ForeignGenesis(header.id));
        }
        return Ok(());
    }
    if !within_limit(header.n_bits, pow_limit) {
        return Err(ProofError::TargetAboveLimit {
            id: header.id,
            n_bits: header.n_bits,
        });
    }
    if !header.has_valid_pow() {
        return Err(ProofError::InsufficientWork(header.id));
    }
    Ok(())
}

/// Whether `child` sits directly on top of `parent`.
fn extends(parent: &BlockHeader, child: &BlockHeader) -> bool {
    child.parent_id == parent.id && parent.height.checked_add(1) == Some(child.height)
}

fn check_suffix(
    suffix: &[BlockHeader],
    genesis: &BlockId,
    pow_limit: &BigUint,
) -> Result<(), ProofError> {
    for header in suffix {
        check_header(header, genesis, pow_limit)?;
    }
    for (index, pair) in suffix.windows(2).enumerate() {
        if !extends(&pair[0], &pair[1]) {
            return Err(ProofError::BrokenSuffixChain { index: index + 1 });
        }
    }
    Ok(())
}

fn check_prefix_entries(
    prefix: &[PoPowHeader],
    genesis: &BlockId,
    pow_limit: &BigUint,
) -> Result<(), ProofError> {
    // Comparison needs every proof rooted at the same block
    let first = prefix.first().ok_or(ProofError::EmptyPrefix)?;
    if first.id() != *genesis {
        return Err(ProofError::UnanchoredPrefix(first.id()));
    }

    for entry in prefix {
        check_header(&entry.header, genesis, pow_limit)?;
        if !entry.has_valid_interlinks_commitment() {
            return Err(ProofError::InterlinksCommitment(entry.id()));
        }
        if !entry.header.is_genesis() && entry.interlink_at(0) != Some(genesis) {
            return Err(ProofError::InterlinkGenesisMismatch(entry.id()));
        }
    }
    Ok(())
}

fn check_prefix_links(prefix: &[PoPowHeader]) -> Result<(), ProofError> {
    for (index, pair) in prefix.windows(2).enumerate() {
        let (earlier, later) = (&pair[0], &pair[1]);
        if later.height() <= earlier.height() || !later.connects_to(earlier) {
            return Err(ProofError::BrokenPrefixChain { index: index + 1 });
        }
    }
    Ok(())
}

/// Validate `proof` against `genesis`, returning the first failed check.
pub fn validate_proof(
    proof: &NipopowProof,
    genesis: &BlockId,
    params: &PoPowParams,
) -> Result<(), ProofError> {
    let k = params.k as usize;
    if proof.suffix.len() != k {
        return Err(ProofError::SuffixLength {
            expected: k,
            found: proof.suffix.len(),
        });
    }

    let pow_limit = params.pow_limit_target();
    check_suffix(&proof.suffix, genesis, &pow_limit)?;
    check_prefix_entries(&proof.prefix, genesis, &pow_limit)?;
    check_prefix_links(&proof.prefix)?;

    let m = params.m as usize;
    if proof.prefix.len() < m {
        return Err(ProofError::InsufficientPrefix {
            required: m,
            found: proof.prefix.len(),
        });
    }

    match (proof.prefix.last(), proof.suffix.first()) {
        (Some(last), Some(first)) if extends(&last.header, first) => Ok(()),
        _ => Err(ProofError::DisconnectedSuffix),
    }
}

pub fn is_valid_proof(proof: &NipopowProof, genesis: &BlockId, params: &PoPowParams) -> bool {
    validate_proof(proof, genesis, params).is_ok()
}

impl NipopowProof {
    /// Validate and wrap. On failure the proof is handed back with the reason.
    pub fn verify(
        self,
        genesis: &BlockId,
        params: &PoPowParams,
    ) -> Result<VerifiedProof, (Self, ProofError)> {
        if let Err(err) = validate_proof(&self, genesis, params) {
            return Err((self, err));
        }
        match self.suffix_head().cloned() {
            Some(head) => Ok(VerifiedProof::new_unchecked(self, head)),
            None => {
                let err = ProofError::SuffixLength {
                    expected: params.k as usize,
                    found: 0,
                };
                Err((self, err))
            }
        }
    }
}
