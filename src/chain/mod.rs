//! Chain primitives: digests, headers, difficulty and interlinks.

pub mod header;
pub mod interlinks;
pub mod pow;
pub mod types;

pub use header::{BlockHeader, GENESIS_HEIGHT};
pub use interlinks::{interlinks_root, update_interlinks};
pub use pow::{
    decode_n_bits, max_level_of, meets_target, within_limit, EASIEST_N_BITS, GENESIS_LEVEL,
};
pub use types::{BlockId, ChainError, Digest32, DIGEST_SIZE};
