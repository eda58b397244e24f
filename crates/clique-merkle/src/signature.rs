//! # Signatures
//!
//! A `Signature` summarizes a subtree: how many records it covers and a
//! keccak-256 hash binding their content and order.
//!
//! ## Combination Layout
//!
//! Branch hashes are computed over a fixed 72-byte buffer, independent of the
//! canonical encoder:
//!
//! ```text
//! le32(left.size) || left.hash || le32(right.size) || right.hash
//! ```
//!
//! Leaf hashes are keccak-256 over the canonical encoding of the record.
//!
//! ## Canonical Form
//!
//! When embedded in a header, a signature contributes three consecutive items
//! `1043, size, hash` with no enclosing array header.

use clique_core::{empty_hash, hash_canonical, hash_raw, CanonicalEncode, Encoder, Hash32};
use serde::{Deserialize, Serialize};

/// Tag written ahead of a signature's size and hash in canonical form.
pub const SIGNATURE_TAG: u64 = 1043;

const COMBINE_BUF_LEN: usize = 72;

/// Size and hash of a committed subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    /// Number of leaf records covered.
    pub size: u32,
    /// keccak-256 commitment to the covered records.
    pub hash: Hash32,
}

impl Signature {
    pub const fn new(size: u32, hash: Hash32) -> Self {
        Self { size, hash }
    }

    /// Signature of an empty tree: size 0, keccak-256 of the empty string.
    pub fn empty() -> Self {
        Self::new(0, empty_hash())
    }

    /// Signature of a single record.
    pub fn leaf<T: CanonicalEncode + ?Sized>(value: &T) -> Self {
        leaf_signature(value)
    }

    /// Combine with a right sibling into the parent signature.
    pub fn combine(&self, right: &Signature) -> Signature {
        combine(self, right)
    }
}

impl CanonicalEncode for Signature {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_unsigned(SIGNATURE_TAG);
        encoder.write_unsigned(u64::from(self.size));
        encoder.write(&self.hash);
    }
}

/// `{ size: 1, hash: keccak256(encode(value)) }`.
pub fn leaf_signature<T: CanonicalEncode + ?Sized>(value: &T) -> Signature {
    Signature::new(1, hash_canonical(value))
}

/// Parent signature of two adjacent subtrees.
///
/// Sizes add modulo 2^32 so the function stays total on untrusted proofs.
pub fn combine(left: &Signature, right: &Signature) -> Signature {
    let mut buf = [0u8; COMBINE_BUF_LEN];
    buf[0..4].copy_from_slice(&left.size.to_le_bytes());
    buf[4..36].copy_from_slice(left.hash.as_bytes());
    buf[36..40].copy_from_slice(&right.size.to_le_bytes());
    buf[40..72].copy_from_slice(right.hash.as_bytes());
    Signature::new(left.size.wrapping_add(right.size), hash_raw(&buf))
}
