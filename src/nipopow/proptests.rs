//! Property-based tests for proof comparison and the verifier
//!
//! Tests for:
//! - Comparison: antisymmetry, transitivity over forks of one base
//! - Verifier: idempotence, order independence, rejection of broken suffixes
//! - Adversarial proofs: prefixes cut above genesis, targets past the limit

use super::algos::{compare, Preference};
use super::sim::SimChain;
use super::validation::ProofError;
use super::verifier::{NipopowVerifier, ProcessOutcome};
use super::PoPowParams;
use proptest::prelude::*;

const BASE_BLOCKS: usize = 6;

fn params() -> PoPowParams {
    PoPowParams::new(2, 3).unwrap()
}

/// A base chain plus one fork per entry of `extra`, all cut at the base tip.
fn forks(seed: u64, extra: &[usize]) -> (SimChain, Vec<SimChain>) {
    let mut base = SimChain::new(seed);
    base.extend(BASE_BLOCKS);
    let height = base.height();

    let forks = extra
        .iter()
        .enumerate()
        .map(|(i, &n)| {
            let mut fork = base.fork(height, seed.wrapping_add(1 + i as u64));
            fork.extend(n);
            fork
        })
        .collect();
    (base, forks)
}

fn at_least(p: Preference) -> bool {
    matches!(p, Preference::First | Preference::Equal)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Property: compare(a, b) is the inverse of compare(b, a)
    #[test]
    fn prop_compare_antisymmetric(
        seed in any::<u64>(),
        len_a in 1usize..10,
        len_b in 1usize..10,
        level_a in 0u32..3,
        level_b in 0u32..3,
    ) {
        let (_, forks) = forks(seed, &[len_a, len_b]);
        let a = forks[0].verified_proof(level_a, &params()).unwrap();
        let b = forks[1].verified_proof(level_b, &params()).unwrap();

        let ab = compare(&a, &b, params().m).unwrap();
        let ba = compare(&b, &a, params().m).unwrap();
        prop_assert_eq!(ab, ba.invert());
    }

    /// Property: compare is transitive over forks sharing a fork point
    #[test]
    fn prop_compare_transitive(
        seed in any::<u64>(),
        lens in prop::collection::vec(1usize..10, 3),
    ) {
        let (_, forks) = forks(seed, &lens);
        let proofs: Vec<_> = forks
            .iter()
            .map(|f| f.verified_proof(0, &params()).unwrap())
            .collect();
        let m = params().m;

        let ab = compare(&proofs[0], &proofs[1], m).unwrap();
        let bc = compare(&proofs[1], &proofs[2], m).unwrap();
        let ac = compare(&proofs[0], &proofs[2], m).unwrap();

        if at_least(ab) && at_least(bc) {
            prop_assert!(at_least(ac), "a >= b >= c but a < c");
        }
        if ab == Preference::First && bc == Preference::First {
            prop_assert_eq!(ac, Preference::First);
        }
    }

    /// Property: processing the same proof twice changes nothing
    #[test]
    fn prop_process_idempotent(seed in any::<u64>(), len in 1usize..10) {
        let (base, forks) = forks(seed, &[len]);
        let proof = forks[0].proof_at_level(0, params().k).unwrap();
        let mut verifier = NipopowVerifier::with_params(base.genesis_id(), params()).unwrap();

        prop_assert_eq!(verifier.process(proof.clone()), ProcessOutcome::BetterChain);
        let best = verifier.best_proof().cloned();
        prop_assert_eq!(verifier.process(proof), ProcessOutcome::NoBetterChain);
        prop_assert_eq!(verifier.best_proof().cloned(), best);
    }

    /// Property: a strictly dominant proof wins regardless of arrival order
    #[test]
    fn prop_order_independent(
        seed in any::<u64>(),
        len_a in 1usize..10,
        len_b in 1usize..10,
    ) {
        let (base, forks) = forks(seed, &[len_a, len_b]);
        let a = forks[0].proof_at_level(0, params().k).unwrap();
        let b = forks[1].proof_at_level(0, params().k).unwrap();

        let va = forks[0].verified_proof(0, &params()).unwrap();
        let vb = forks[1].verified_proof(0, &params()).unwrap();
        prop_assume!(compare(&va, &vb, params().m).unwrap() != Preference::Equal);

        let mut forward = NipopowVerifier::with_params(base.genesis_id(), params()).unwrap();
        forward.process(a.clone());
        forward.process(b.clone());

        let mut backward = NipopowVerifier::with_params(base.genesis_id(), params()).unwrap();
        backward.process(b);
        backward.process(a);

        prop_assert_eq!(
            forward.require_best().unwrap().suffix_head().id,
            backward.require_best().unwrap().suffix_head().id
        );
    }

    /// Property: a proof with a tampered suffix header never becomes best
    #[test]
    fn prop_tampered_suffix_rejected(
        seed in any::<u64>(),
        len in 1usize..10,
        pick in any::<prop::sample::Index>(),
        process_valid_first in any::<bool>(),
    ) {
        let (base, forks) = forks(seed, &[len]);
        let valid = forks[0].proof_at_level(0, params().k).unwrap();
        let mut tampered = valid.clone();
        let index = pick.index(tampered.suffix.len());
        tampered.suffix[index].timestamp += 1;

        let mut verifier = NipopowVerifier::with_params(base.genesis_id(), params()).unwrap();
        if process_valid_first {
            verifier.process(valid.clone());
        }
        let outcome = verifier.process(tampered);

        prop_assert!(matches!(outcome, ProcessOutcome::Rejected(_)));
        match verifier.best_proof() {
            Some(best) => {
                prop_assert_eq!(best.proof(), &valid);
            }
            None => {
                prop_assert!(!process_valid_first);
            }
        }
    }

    /// Property: a prefix with its leading entries dropped is rejected and
    /// never displaces an anchored proof
    #[test]
    fn prop_prefix_without_genesis_never_best(
        seed in any::<u64>(),
        len in 1usize..10,
        dropped in 1usize..4,
        headless_first in any::<bool>(),
    ) {
        let (base, forks) = forks(seed, &[len, len + 1]);
        let anchored = forks[0].proof_at_level(0, params().k).unwrap();
        let mut headless = forks[1].proof_at_level(0, params().k).unwrap();
        headless.prefix.drain(..dropped);

        let mut verifier = NipopowVerifier::with_params(base.genesis_id(), params()).unwrap();
        let outcome = if headless_first {
            let outcome = verifier.process(headless);
            verifier.process(anchored.clone());
            outcome
        } else {
            verifier.process(anchored.clone());
            verifier.process(headless)
        };

        prop_assert!(matches!(
            outcome,
            ProcessOutcome::Rejected(ProofError::UnanchoredPrefix(_))
        ));
        prop_assert_eq!(verifier.require_best().unwrap().proof(), &anchored);
    }

    /// Property: a header declaring a target above the limit is rejected even
    /// when its hash meets that target
    #[test]
    fn prop_oversized_target_rejected(
        seed in any::<u64>(),
        len in 1usize..10,
        exponent in 0x22u32..=0xff,
        mantissa in 0x100u32..0x80_0000,
    ) {
        let (base, forks) = forks(seed, &[len]);
        let mut proof = forks[0].proof_at_level(0, params().k).unwrap();
        let last = proof.suffix.len() - 1;
        let mut forged = proof.suffix[last].clone();
        forged.n_bits = (exponent << 24) | mantissa;
        proof.suffix[last] = forged.seal();
        prop_assert!(proof.suffix[last].has_valid_pow());

        let mut verifier = NipopowVerifier::with_params(base.genesis_id(), params()).unwrap();
        let outcome = verifier.process(proof.clone());
        prop_assert_eq!(
            outcome,
            ProcessOutcome::Rejected(ProofError::TargetAboveLimit {
                id: proof.suffix[last].id,
                n_bits: (exponent << 24) | mantissa,
            })
        );
        prop_assert!(verifier.best_proof().is_none());
    }
}
