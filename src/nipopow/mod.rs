//! Non-interactive proofs of proof-of-work.
//!
//! A light client receives [`NipopowProof`]s from untrusted peers, validates
//! their structure ([`validation`]), and keeps the one backed by the most
//! superblock work ([`algos::compare`]). The [`NipopowVerifier`] holds that
//! state; callers then check that the best proof ends at the block they care
//! about.
//!
//! ## Parameters
//!
//! - `m`: security parameter, the minimum number of superblocks a level must
//!   hold before it counts toward a proof's score (and the minimum prefix size)
//! - `k`: suffix length, the number of most recent headers carried in full

pub mod algos;
pub mod proof;
pub mod sim;
pub mod validation;
pub mod verifier;

#[cfg(test)]
mod proptests;

use crate::chain::pow::{decode_n_bits, EASIEST_N_BITS};
use crate::error::SpvError;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

pub use algos::{best_arg, compare, lowest_common_ancestor, Preference};
pub use proof::{NipopowProof, PoPowHeader, VerifiedProof};
pub use validation::{is_valid_proof, validate_proof, ProofError};
pub use verifier::{NipopowVerifier, ProcessOutcome, SharedVerifier};

/// Default security parameter.
pub const DEFAULT_M: u32 = 5;

/// Default suffix length.
pub const DEFAULT_K: u32 = 6;

/// Proof parameters shared by the prover request and the verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoPowParams {
    pub m: u32,
    pub k: u32,
    /// Easiest compact target a header may declare.
    #[serde(default = "default_pow_limit")]
    pub pow_limit: u32,
}

fn default_pow_limit() -> u32 {
    EASIEST_N_BITS
}

impl Default for PoPowParams {
    fn default() -> Self {
        Self {
            m: DEFAULT_M,
            k: DEFAULT_K,
            pow_limit: EASIEST_N_BITS,
        }
    }
}

impl PoPowParams {
    pub fn new(m: u32, k: u32) -> Result<Self, SpvError> {
        let params = Self {
            m,
            k,
            pow_limit: EASIEST_N_BITS,
        };
        params.validate()?;
        Ok(params)
    }

    /// Same parameters with a different proof-of-work limit.
    pub fn with_pow_limit(self, pow_limit: u32) -> Result<Self, SpvError> {
        let params = Self { pow_limit, ..self };
        params.validate()?;
        Ok(params)
    }

    /// Decoded [`Self::pow_limit`].
    pub fn pow_limit_target(&self) -> BigUint {
        decode_n_bits(self.pow_limit)
    }

    /// A proof with an empty suffix claims no block, so `k` must be positive.
    /// The limit must be a non-zero target that fits in a 256-bit hash, which
    /// keeps every accepted level at or below 256.
    pub fn validate(&self) -> Result<(), SpvError> {
        if self.k == 0 {
            return Err(SpvError::InvalidParams("k must be at least 1".to_string()));
        }
        let limit = self.pow_limit_target();
        if limit.bits() == 0 || limit.bits() > 256 {
            return Err(SpvError::InvalidParams(format!(
                "pow_limit {:#010x} is not a 256-bit target",
                self.pow_limit
            )));
        }
        Ok(())
    }
}
