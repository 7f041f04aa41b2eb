//! nipopow-spv - NiPoPoW light-client verifier
//!
//! Lets a light client decide, from compact proofs sent by untrusted peers,
//! which chain carries the most proof-of-work, and then check that a
//! transaction sits in a block at the tip of that chain.
//!
//! Layers, leaf first:
//! - [`chain`]: digests, headers, difficulty levels, interlinks
//! - [`merkle`]: Merkle trees and inclusion proofs
//! - [`nipopow`]: proof model, structural validation, comparison, verifier
//! - [`spv`]: transport trait and the end-to-end inclusion check

pub mod chain;
pub mod error;
pub mod merkle;
pub mod nipopow;
pub mod spv;

pub use error::SpvError;
