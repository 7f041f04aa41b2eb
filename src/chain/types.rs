//! Fixed-width digests and block identifiers.
//!
//! Every hash in the system is a 32-byte SHA-256 digest. On the wire (JSON)
//! digests travel as lowercase hex strings.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Size in bytes of every digest and block id.
pub const DIGEST_SIZE: usize = 32;

/// Errors raised while decoding chain primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Invalid digest length: expected {expected} bytes, found {found}")]
    InvalidLength { expected: usize, found: usize },

    #[error("Interlinks of non-genesis block at height {height} are empty")]
    EmptyInterlinks { height: u64 },
}

/// A 32-byte SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Digest32(pub [u8; DIGEST_SIZE]);

impl Digest32 {
    /// The all-zero digest.
    pub const fn zero() -> Self {
        Self([0u8; DIGEST_SIZE])
    }

    /// Build from a slice, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ChainError> {
        let arr: [u8; DIGEST_SIZE] =
            bytes.try_into().map_err(|_| ChainError::InvalidLength {
                expected: DIGEST_SIZE,
                found: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, ChainError> {
        let bytes = hex::decode(s).map_err(|e| ChainError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    /// SHA-256 over the concatenation of `parts`.
    pub fn hash_parts(parts: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part);
        }
        Self(hasher.finalize().into())
    }

    /// Return a copy with a single bit flipped.
    #[cfg(test)]
    pub(crate) fn with_bit_flipped(&self, bit: usize) -> Self {
        let mut bytes = self.0;
        let bit = bit % (DIGEST_SIZE * 8);
        bytes[bit / 8] ^= 1 << (bit % 8);
        Self(bytes)
    }
}

impl AsRef<[u8]> for Digest32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Digest32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Digest32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest32({})", self.to_hex())
    }
}

impl FromStr for Digest32 {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Digest32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Identifier of a block header: the digest of its canonical encoding.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub Digest32);

impl BlockId {
    pub fn from_hex(s: &str) -> Result<Self, ChainError> {
        Digest32::from_hex(s).map(Self)
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        self.0.as_bytes()
    }

    pub fn digest(&self) -> &Digest32 {
        &self.0
    }
}

impl From<Digest32> for BlockId {
    fn from(digest: Digest32) -> Self {
        Self(digest)
    }
}

impl AsRef<[u8]> for BlockId {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", self.0.to_hex())
    }
}

impl FromStr for BlockId {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
