//! # Error Types
//!
//! Proof construction and reconstruction errors, and header-chain link errors.
//! A proof that restores to the wrong signature is not an error: verification
//! returns `false`.

use clique_core::{CoreError, Hash32};
use thiserror::Error;

/// Errors from building, parsing, or narrowing proofs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MerkleError {
    /// A requested index lies outside the committed list.
    #[error("index {index} out of range for tree of size {size}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of records committed.
        size: usize,
    },

    /// A requested index lies inside a pruned subtree of the proof.
    #[error("index {index} is not revealed by this proof")]
    IndexNotRevealed {
        /// The offending index.
        index: usize,
    },

    /// A proof object matched none of the branch, pruned, or leaf shapes.
    #[error("invalid proof shape: {0}")]
    InvalidProofShape(String),

    /// A proof field had the right key but an unusable value.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),

    /// Error from a core type conversion.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Errors from appending to or validating a header chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// A header does not link to the hash of its predecessor.
    #[error("predecessor mismatch at header #{index}: expected {expected}, got {actual}")]
    PredecessorMismatch {
        /// Position of the offending header in the chain.
        index: usize,
        /// The predecessor the chain required.
        expected: Hash32,
        /// The predecessor the header carried.
        actual: Hash32,
    },
}
