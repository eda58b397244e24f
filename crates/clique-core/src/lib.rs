//! # clique-core — Foundational Types for Clique Commitments
//!
//! This crate is the leaf of the workspace dependency graph. It defines the
//! byte-level primitives every commitment depends on.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** All record digests flow through
//!    `CanonicalBytes::new()`, which drives a deterministic CBOR encoder. The
//!    same logical value always hashes to the same digest.
//!
//! 2. **`keccak256_digest()` accepts only `&CanonicalBytes`.** Record hashing
//!    cannot bypass canonicalization. `hash_raw()` is reserved for fixed-layout
//!    buffers.
//!
//! 3. **Fixed-width newtypes.** `Hash32` and `Address` validate length on
//!    construction from untrusted hex and carry a single external form.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `clique-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;

// Re-export primary types for ergonomic imports.
pub use canonical::{encode, Bytes, CanonicalBytes, CanonicalEncode, Encoder};
pub use digest::{empty_hash, hash_canonical, hash_raw, keccak256_digest, Hash32};
pub use error::CoreError;
pub use identity::Address;
