//! Stateful NiPoPoW verifier.
//!
//! Holds the genesis id it was built with and the best proof seen so far.
//! Invalid proofs are dropped and logged, never raised as errors.

use super::algos::{compare, Preference};
use super::proof::{NipopowProof, VerifiedProof};
use super::validation::ProofError;
use super::PoPowParams;
use crate::chain::types::BlockId;
use crate::error::SpvError;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// What `process` did with a proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The proof became the new best.
    BetterChain,
    /// The proof was valid but did not beat the current best.
    NoBetterChain,
    /// The proof failed structural validation and was dropped.
    Rejected(ProofError),
}

#[derive(Debug)]
pub struct NipopowVerifier {
    genesis: BlockId,
    params: PoPowParams,
    best: Option<VerifiedProof>,
    proofs_processed: u64,
}

impl NipopowVerifier {
    /// Verifier with the default `m = 5`, `k = 6`.
    pub fn new(genesis: BlockId) -> Self {
        Self {
            genesis,
            params: PoPowParams::default(),
            best: None,
            proofs_processed: 0,
        }
    }

    pub fn with_params(genesis: BlockId, params: PoPowParams) -> Result<Self, SpvError> {
        params.validate()?;
        Ok(Self {
            genesis,
            params,
            best: None,
            proofs_processed: 0,
        })
    }

    pub fn genesis(&self) -> &BlockId {
        &self.genesis
    }

    pub fn params(&self) -> &PoPowParams {
        &self.params
    }

    pub fn proofs_processed(&self) -> u64 {
        self.proofs_processed
    }

    /// Validate `proof` and keep it if it beats the current best.
    pub fn process(&mut self, proof: NipopowProof) -> ProcessOutcome {
        self.proofs_processed += 1;

        let candidate = match proof.verify(&self.genesis, &self.params) {
            Ok(verified) => verified,
            Err((_, err)) => {
                warn!(error = %err, "Dropping invalid NiPoPoW proof");
                return ProcessOutcome::Rejected(err);
            }
        };

        let is_better = match &self.best {
            None => true,
            Some(best) => match compare(&candidate, best, self.params.m) {
                Ok(Preference::First) => true,
                Ok(Preference::Second) | Ok(Preference::Equal) => false,
                Err(err) => {
                    warn!(error = %err, "Cannot compare proof against current best");
                    false
                }
            },
        };

        if is_better {
            let head = candidate.suffix_head();
            info!(
                head = %head.id,
                height = head.height,
                proofs_processed = self.proofs_processed,
                "Better chain found"
            );
            self.best = Some(candidate);
            ProcessOutcome::BetterChain
        } else {
            debug!(
                head = %candidate.suffix_head().id,
                proofs_processed = self.proofs_processed,
                "Proof does not improve on current best"
            );
            ProcessOutcome::NoBetterChain
        }
    }

    pub fn best_proof(&self) -> Option<&VerifiedProof> {
        self.best.as_ref()
    }

    /// The best proof, or [`SpvError::NoBestProof`] if none was accepted.
    pub fn require_best(&self) -> Result<&VerifiedProof, SpvError> {
        self.best.as_ref().ok_or(SpvError::NoBestProof)
    }

    /// Forget the current best proof.
    pub fn reset(&mut self) {
        self.best = None;
        self.proofs_processed = 0;
    }
}

/// A verifier shared between tasks.
///
/// The whole validate-compare-replace step of `process` runs under one lock,
/// so no other task observes a half-updated best.
#[derive(Debug, Clone)]
pub struct SharedVerifier {
    inner: Arc<Mutex<NipopowVerifier>>,
}

impl SharedVerifier {
    pub fn new(verifier: NipopowVerifier) -> Self {
        Self {
            inner: Arc::new(Mutex::new(verifier)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, NipopowVerifier> {
        // A panic mid-process leaves the previous best intact
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn process(&self, proof: NipopowProof) -> ProcessOutcome {
        self.lock().process(proof)
    }

    /// Snapshot of the current best proof.
    pub fn best_proof(&self) -> Option<VerifiedProof> {
        self.lock().best_proof().cloned()
    }

    pub fn require_best(&self) -> Result<VerifiedProof, SpvError> {
        self.lock().require_best().cloned()
    }

    pub fn proofs_processed(&self) -> u64 {
        self.lock().proofs_processed()
    }
}
