//! Proof-of-work strength and superblock levels.
//!
//! A header's PoW hit is its id read as a 256-bit big-endian integer. The level
//! of a header is how many times the difficulty target can be halved while the
//! hit still meets it:
//!
//! ```text
//! level = floor(log2(target / hit))
//! ```
//!
//! A block at level μ is a μ-superblock and also a superblock of every level
//! below μ.

use num_bigint::BigUint;

/// Level assigned to the genesis block: it belongs to every superchain.
pub const GENESIS_LEVEL: u32 = u32::MAX;

/// Easiest compact target: `0xffff << 240`. The default proof-of-work limit.
pub const EASIEST_N_BITS: u32 = 0x2100ffff;

/// Decode the compact `nBits` difficulty encoding into a full target.
///
/// Format is `EEMMMMMM`: one exponent byte and a 23-bit mantissa (the sign bit
/// is ignored). `target = mantissa * 256^(exponent - 3)`.
pub fn decode_n_bits(n_bits: u32) -> BigUint {
    let exponent = (n_bits >> 24) as usize;
    let mantissa = n_bits & 0x007F_FFFF;

    if exponent <= 3 {
        BigUint::from(mantissa >> (8 * (3 - exponent)))
    } else {
        BigUint::from(mantissa) << (8 * (exponent - 3))
    }
}

/// Whether `hit` is strictly below the target encoded by `n_bits`.
pub fn meets_target(n_bits: u32, hit: &[u8; 32]) -> bool {
    BigUint::from_bytes_be(hit) < decode_n_bits(n_bits)
}

/// Whether the target encoded by `n_bits` is no easier than `limit`.
///
/// Headers choose their own `n_bits`, so a verifier bounds them; otherwise a
/// huge declared target turns any hash into a high-level superblock.
pub fn within_limit(n_bits: u32, limit: &BigUint) -> bool {
    decode_n_bits(n_bits) <= *limit
}

/// Superblock level of a header with the given difficulty and PoW hit.
///
/// Hits that do not meet the target are level 0; whether such a header is
/// acceptable at all is decided by [`meets_target`].
pub fn max_level_of(n_bits: u32, hit: &[u8; 32], is_genesis: bool) -> u32 {
    if is_genesis {
        return GENESIS_LEVEL;
    }

    let target = decode_n_bits(n_bits);
    let mut hit = BigUint::from_bytes_be(hit);
    if hit == BigUint::ZERO {
        hit = BigUint::from(1u32);
    }
    if target <= hit {
        return 0;
    }

    let ratio = &target / &hit;
    (ratio.bits().saturating_sub(1)) as u32
}
