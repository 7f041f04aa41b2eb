//! Benchmarks for proof validation, comparison and Merkle path checks
//!
//! A light client validates and compares one proof per peer, so each of
//! these runs once per response.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nipopow_spv::nipopow::sim::SimChain;
use nipopow_spv::nipopow::{compare, validate_proof, PoPowParams};

const M: u32 = 3;
const K: u32 = 6;

fn params() -> PoPowParams {
    PoPowParams::new(M, K).unwrap()
}

/// Chain of `len` blocks above genesis at naturally mined levels.
fn chain_of(len: usize, seed: u64) -> SimChain {
    let mut chain = SimChain::new(seed);
    chain.extend(len);
    chain
}

fn benchmark_validate_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_proof_scaling");

    for len in [32, 128, 512] {
        let chain = chain_of(len, 7);
        let proof = chain.proof_at_level(0, K).unwrap();
        let genesis = chain.genesis_id();
        let params = params();

        group.bench_with_input(BenchmarkId::from_parameter(len), &proof, |b, proof| {
            b.iter(|| validate_proof(black_box(proof), &genesis, &params));
        });
    }

    group.finish();
}

fn benchmark_compare_forks(c: &mut Criterion) {
    let params = params();
    let base = chain_of(64, 11);
    let mut left = base.fork(32, 12);
    left.extend(96);
    let mut right = base.fork(32, 13);
    right.extend(64);

    let left = left.verified_proof(0, &params).unwrap();
    let right = right.verified_proof(0, &params).unwrap();

    c.bench_function("compare_forks_at_32", |b| {
        b.iter(|| compare(black_box(&left), black_box(&right), M));
    });
}

fn benchmark_merkle_path(c: &mut Criterion) {
    let chain = chain_of(4, 21);
    let tip = chain.tip().clone();
    let proof = chain.merkle_proof(&tip.id, 4).unwrap();

    c.bench_function("merkle_path_is_valid", |b| {
        b.iter(|| black_box(&proof).is_valid(&tip.transactions_root));
    });
}

criterion_group!(
    benches,
    benchmark_validate_scaling,
    benchmark_compare_forks,
    benchmark_merkle_path
);
criterion_main!(benches);
