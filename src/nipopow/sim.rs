//! Deterministic toy chain for tests and benchmarks.
//!
//! Headers are mined against the easiest target, so a valid nonce takes one or
//! two hashes and a level-`μ` superblock roughly `2^(μ+1)`. Forks get a
//! different salt, which changes their transactions and therefore their ids.

use super::proof::{NipopowProof, PoPowHeader, VerifiedProof};
use super::PoPowParams;
use crate::chain::header::{BlockHeader, GENESIS_HEIGHT};
use crate::chain::interlinks::{interlinks_root, update_interlinks};
use crate::chain::types::{BlockId, Digest32};
use crate::merkle::{merkle_root, MerkleProof};

pub use crate::chain::pow::EASIEST_N_BITS;

/// Transactions generated per block. Odd, so trees carry a promoted node.
pub const TXS_PER_BLOCK: u8 = 5;

const BASE_TIMESTAMP: u64 = 1_561_978_800;
const BLOCK_INTERVAL: u64 = 120;

#[derive(Debug, Clone)]
struct SimBlock {
    popow: PoPowHeader,
    transactions: Vec<Digest32>,
}

#[derive(Debug, Clone)]
pub struct SimChain {
    salt: u64,
    n_bits: u32,
    blocks: Vec<SimBlock>,
}

impl SimChain {
    /// Chain holding only a genesis block derived from `seed`.
    pub fn new(seed: u64) -> Self {
        let transactions = generate_transactions(seed, GENESIS_HEIGHT);
        let header = BlockHeader {
            id: BlockId::default(),
            parent_id: BlockId::default(),
            height: GENESIS_HEIGHT,
            transactions_root: merkle_root(&transactions),
            interlinks_root: interlinks_root(&[]),
            n_bits: EASIEST_N_BITS,
            timestamp: BASE_TIMESTAMP,
            nonce: 0,
        }
        .seal();

        Self {
            salt: seed,
            n_bits: EASIEST_N_BITS,
            blocks: vec![SimBlock {
                popow: PoPowHeader::new(header, Vec::new()),
                transactions,
            }],
        }
    }

    pub fn genesis_id(&self) -> BlockId {
        self.blocks[0].popow.id()
    }

    pub fn tip(&self) -> &BlockHeader {
        &self.last_block().popow.header
    }

    pub fn height(&self) -> u64 {
        self.tip().height
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    fn last_block(&self) -> &SimBlock {
        // The genesis block is never removed
        &self.blocks[self.blocks.len() - 1]
    }

    /// Mine one block. With `Some(level)` the block has exactly that level;
    /// with `None` the first valid nonce is kept.
    pub fn mine(&mut self, level: Option<u32>) -> &BlockHeader {
        let prev = &self.last_block().popow;
        let height = prev.height() + 1;
        let interlinks = update_interlinks(&prev.header, &prev.interlinks)
            .unwrap_or_else(|_| vec![self.blocks[0].popow.id()]);
        let transactions = generate_transactions(self.salt, height);

        let mut header = BlockHeader {
            id: BlockId::default(),
            parent_id: prev.id(),
            height,
            transactions_root: merkle_root(&transactions),
            interlinks_root: interlinks_root(&interlinks),
            n_bits: self.n_bits,
            timestamp: BASE_TIMESTAMP + (height - GENESIS_HEIGHT) * BLOCK_INTERVAL,
            nonce: 0,
        };

        loop {
            header.id = header.compute_id();
            if header.has_valid_pow() && level.map_or(true, |l| header.level() == l) {
                break;
            }
            header.nonce = header.nonce.wrapping_add(1);
        }

        self.blocks.push(SimBlock {
            popow: PoPowHeader::new(header, interlinks),
            transactions,
        });
        self.tip()
    }

    /// Mine one block per entry, each at exactly the given level.
    pub fn extend_with_levels(&mut self, levels: &[u32]) {
        for &level in levels {
            self.mine(Some(level));
        }
    }

    /// Mine `count` blocks at whatever level their first valid nonce gives.
    pub fn extend(&mut self, count: usize) {
        for _ in 0..count {
            self.mine(None);
        }
    }

    /// Copy of this chain cut at `height`, mining further blocks with `salt`.
    pub fn fork(&self, height: u64, salt: u64) -> SimChain {
        let keep = height.saturating_sub(GENESIS_HEIGHT) as usize + 1;
        let mut blocks = self.blocks.clone();
        blocks.truncate(keep.max(1));
        SimChain {
            salt,
            n_bits: self.n_bits,
            blocks,
        }
    }

    /// Declare `n_bits` in every block mined from now on.
    pub fn set_n_bits(&mut self, n_bits: u32) {
        self.n_bits = n_bits;
    }

    /// All headers, genesis first.
    pub fn headers(&self) -> Vec<BlockHeader> {
        self.blocks.iter().map(|b| b.popow.header.clone()).collect()
    }

    /// Prefix entry for the block at position `index` (genesis is 0).
    pub fn popow_header(&self, index: usize) -> Option<PoPowHeader> {
        self.blocks.get(index).map(|b| b.popow.clone())
    }

    fn block_by_id(&self, id: &BlockId) -> Option<&SimBlock> {
        self.blocks.iter().find(|b| b.popow.id() == *id)
    }

    pub fn header_by_id(&self, id: &BlockId) -> Option<&BlockHeader> {
        self.block_by_id(id).map(|b| &b.popow.header)
    }

    pub fn transactions(&self, id: &BlockId) -> Option<&[Digest32]> {
        self.block_by_id(id).map(|b| b.transactions.as_slice())
    }

    /// Inclusion proof for the `index`-th transaction of block `id`.
    pub fn merkle_proof(&self, id: &BlockId, index: usize) -> Option<MerkleProof> {
        MerkleProof::for_leaf(self.transactions(id)?, index)
    }

    /// Proof over the `μ`-superchain with a `k`-block suffix.
    ///
    /// The prefix is genesis, every block of level at least `μ` below the
    /// suffix, and the suffix parent. Returns `None` if the chain holds no
    /// more than `k` blocks.
    pub fn proof_at_level(&self, level: u32, k: u32) -> Option<NipopowProof> {
        let k = k as usize;
        if self.blocks.len() <= k {
            return None;
        }
        let split = self.blocks.len() - k;

        let mut prefix = vec![self.blocks[0].popow.clone()];
        prefix.extend(
            self.blocks[1..split]
                .iter()
                .filter(|b| b.popow.level() >= level)
                .map(|b| b.popow.clone()),
        );
        let suffix_parent = &self.blocks[split - 1].popow;
        if prefix.last().map(|p| p.id()) != Some(suffix_parent.id()) {
            prefix.push(suffix_parent.clone());
        }

        let suffix = self.blocks[split..]
            .iter()
            .map(|b| b.popow.header.clone())
            .collect();

        Some(NipopowProof { prefix, suffix })
    }

    /// [`Self::proof_at_level`], validated with `params`.
    pub fn verified_proof(&self, level: u32, params: &PoPowParams) -> Option<VerifiedProof> {
        self.proof_at_level(level, params.k)?
            .verify(&self.genesis_id(), params)
            .ok()
    }
}

fn generate_transactions(salt: u64, height: u64) -> Vec<Digest32> {
    (0..TXS_PER_BLOCK)
        .map(|i| Digest32::hash_parts(&[b"tx", &salt.to_le_bytes(), &height.to_le_bytes(), &[i]]))
        .collect()
}
