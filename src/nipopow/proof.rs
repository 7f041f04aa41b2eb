//! Proof model: a prefix of superblocks plus a suffix of recent headers.

use crate::chain::header::BlockHeader;
use crate::chain::interlinks::interlinks_root;
use crate::chain::types::BlockId;
use crate::error::SpvError;
use serde::{Deserialize, Serialize};

/// A prefix entry: a header together with the interlinks it commits to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoPowHeader {
    pub header: BlockHeader,
    pub interlinks: Vec<BlockId>,
}

impl PoPowHeader {
    pub fn new(header: BlockHeader, interlinks: Vec<BlockId>) -> Self {
        Self { header, interlinks }
    }

    pub fn id(&self) -> BlockId {
        self.header.id
    }

    pub fn height(&self) -> u64 {
        self.header.height
    }

    pub fn level(&self) -> u32 {
        self.header.level()
    }

    pub fn interlink_at(&self, level: usize) -> Option<&BlockId> {
        self.interlinks.get(level)
    }

    /// Whether the carried interlinks are the ones the header commits to.
    pub fn has_valid_interlinks_commitment(&self) -> bool {
        interlinks_root(&self.interlinks) == self.header.interlinks_root
    }

    /// Whether `earlier` is reachable from this header in one hop.
    ///
    /// Either `earlier` is the parent, or it appears at some interlink index
    /// `i` and is itself a superblock of level at least `i`.
    pub fn connects_to(&self, earlier: &PoPowHeader) -> bool {
        if self.header.parent_id == earlier.id() {
            return true;
        }
        let earlier_level = earlier.level() as usize;
        self.interlinks
            .iter()
            .enumerate()
            .any(|(i, link)| *link == earlier.id() && earlier_level >= i)
    }
}

/// A NiPoPoW proof as sent by a prover.
///
/// Raw proofs are untrusted; only a [`VerifiedProof`] has passed structural
/// validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NipopowProof {
    pub prefix: Vec<PoPowHeader>,
    pub suffix: Vec<BlockHeader>,
}

impl NipopowProof {
    /// Parse a proof from untrusted JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, SpvError> {
        serde_json::from_slice(bytes).map_err(|e| SpvError::MalformedProof(e.to_string()))
    }

    pub fn to_json(&self) -> Result<Vec<u8>, SpvError> {
        serde_json::to_vec(self).map_err(|e| SpvError::MalformedProof(e.to_string()))
    }

    /// The block this proof claims: the last suffix header.
    pub fn suffix_head(&self) -> Option<&BlockHeader> {
        self.suffix.last()
    }

    /// Every header the proof carries, prefix first, in chain order.
    pub fn headers_chain(&self) -> Vec<&BlockHeader> {
        self.prefix
            .iter()
            .map(|p| &p.header)
            .chain(self.suffix.iter())
            .collect()
    }
}

/// A proof that passed structural validation against some genesis.
///
/// Built only by [`NipopowProof::verify`], so the suffix is known to be
/// non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedProof {
    proof: NipopowProof,
    head: BlockHeader,
}

impl VerifiedProof {
    pub(crate) fn new_unchecked(proof: NipopowProof, head: BlockHeader) -> Self {
        Self { proof, head }
    }

    pub fn suffix_head(&self) -> &BlockHeader {
        &self.head
    }

    pub fn proof(&self) -> &NipopowProof {
        &self.proof
    }

    pub fn into_inner(self) -> NipopowProof {
        self.proof
    }
}

impl AsRef<NipopowProof> for VerifiedProof {
    fn as_ref(&self) -> &NipopowProof {
        &self.proof
    }
}
