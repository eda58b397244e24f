//! # Error Types
//!
//! Errors raised while turning untrusted external input (hex strings, byte
//! slices) into core types. Canonical encoding itself is total and has no
//! error path.

use thiserror::Error;

/// Top-level error type for `clique-core`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Input could not be decoded into a fixed-width core type.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),
}
