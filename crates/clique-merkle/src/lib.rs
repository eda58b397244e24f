//! # clique-merkle — Selective-Disclosure Commitments
//!
//! Provides the commitment layer built on `clique-core`:
//!
//! - **Signatures**: `(size, keccak-256)` summaries of subtrees, combined over
//!   a fixed 72-byte layout.
//! - **Merkle Tree**: a balanced binary tree over an ordered list of records.
//! - **Proofs**: reveal chosen records while binding the rest; restore,
//!   verify, and narrow them without access to the tree.
//! - **Wire format**: the JSON proof shape exchanged with browser clients.
//! - **Header Chain**: per-participant hash chain of published commitments.
//!
//! ## Crate Policy
//!
//! - Depends only on `clique-core` internally.
//! - No mocking of hashing in tests: all tests use real canonical encoding and
//!   real keccak-256.
//! - Trees and proofs are immutable once built.

pub mod error;
pub mod header;
pub mod proof;
pub mod signature;
pub mod tree;
pub mod wire;

pub use error::{ChainError, MerkleError};
pub use header::{
    genesis_predecessor, next_predecessor, resume_predecessor, verify_chain, Header, HeaderChain,
};
pub use proof::{proof_subset, restore_root, verify_proof, verify_root_hash, ProofNode};
pub use signature::{combine, leaf_signature, Signature};
pub use tree::{MerkleNode, MerkleTree};
