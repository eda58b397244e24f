//! # Keccak-256 Digests
//!
//! Defines `Hash32`, the 32-byte digest carried by signatures and headers,
//! and the keccak-256 entry points.
//!
//! ## Security Invariant
//!
//! Record content is hashed through [`keccak256_digest()`], which accepts only
//! `&CanonicalBytes`. [`hash_raw()`] exists for fixed-layout buffers that are
//! not records (branch combination, pre-encoded header bytes received from a
//! contract) and must not be used on record content.
//!
//! ## External Form
//!
//! Hashes travel as `0x`-prefixed lowercase hex, the representation used by
//! EVM tooling when reading `bytes32` values from a contract.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};

use crate::canonical::{CanonicalBytes, CanonicalEncode, Encoder};
use crate::error::CoreError;

/// A 32-byte keccak-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash32([u8; 32]);

impl Hash32 {
    /// The all-zero hash. Contracts report this for "no header published".
    pub const ZERO: Hash32 = Hash32([0u8; 32]);

    /// Wrap raw digest bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns true for [`Hash32::ZERO`].
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Lowercase hex without prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Lowercase hex with the `0x` prefix.
    pub fn to_prefixed_hex(&self) -> String {
        format!("0x{}", self.to_hex())
    }

    /// Parse 64 hex chars, with or without a `0x` prefix, in either case.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.len() != 64 {
            return Err(CoreError::MalformedEncoding(format!(
                "expected 64 hex chars for a 32-byte hash, got {}",
                digits.len()
            )));
        }
        let mut out = [0u8; 32];
        hex::decode_to_slice(digits, &mut out)
            .map_err(|e| CoreError::MalformedEncoding(format!("invalid hash hex: {e}")))?;
        Ok(Self(out))
    }

    /// Build from a byte slice that must be exactly 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CoreError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            CoreError::MalformedEncoding(format!(
                "expected 32 bytes for a hash, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }
}

impl From<[u8; 32]> for Hash32 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32(0x{})", self.to_hex())
    }
}

impl FromStr for Hash32 {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Hash32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_prefixed_hex())
    }
}

impl<'de> Deserialize<'de> for Hash32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash32::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl CanonicalEncode for Hash32 {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_bytes(&self.0);
    }
}

/// Compute the keccak-256 digest of canonical bytes.
pub fn keccak256_digest(data: &CanonicalBytes) -> Hash32 {
    hash_raw(data.as_bytes())
}

/// Compute the keccak-256 digest of a canonically encoded value.
pub fn hash_canonical<T: CanonicalEncode + ?Sized>(value: &T) -> Hash32 {
    keccak256_digest(&CanonicalBytes::new(value))
}

/// Compute the keccak-256 digest of raw bytes.
///
/// For fixed-layout buffers only; record content goes through
/// [`keccak256_digest()`].
pub fn hash_raw(data: &[u8]) -> Hash32 {
    Hash32(Keccak256::digest(data).into())
}

/// keccak-256 of the empty byte string, the hash of an empty tree.
pub fn empty_hash() -> Hash32 {
    hash_raw(&[])
}
