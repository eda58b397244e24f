//! # Header Chain
//!
//! Each participant publishes a sequence of commitments. A [`Header`] binds a
//! commitment signature to the hash of the previous header, so the sequence
//! forms an append-only hash chain per participant.
//!
//! ## Genesis
//!
//! The first header's predecessor is the keccak-256 of the participant's
//! identity encoded as a canonical byte string. For a 20-byte address this is
//! keccak over `0x54 || address`.
//!
//! ## Canonical Form
//!
//! ```text
//! [0, predecessor_hash, 1043, size, root_hash]
//! ```
//!
//! A 3-element array header (`0x83`) covering the format discriminator, the
//! predecessor byte string, and the signature, whose three items sit inline.
//!
//! ## Security Invariants
//!
//! - Headers can only be appended to a [`HeaderChain`].
//! - A header's predecessor must equal the hash of the current head.

use clique_core::{hash_canonical, Bytes, CanonicalEncode, Encoder, Hash32};
use serde::{Deserialize, Serialize};

use crate::error::ChainError;
use crate::signature::Signature;

/// Format discriminator written first in a header's canonical form.
pub const HEADER_FORMAT: u64 = 0;

/// One link in a participant's commitment chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Header {
    /// Hash of the previous header, or the genesis predecessor.
    pub predecessor_hash: Hash32,
    /// The committed tree signature.
    pub commitment: Signature,
}

impl Header {
    pub const fn new(predecessor_hash: Hash32, commitment: Signature) -> Self {
        Self {
            predecessor_hash,
            commitment,
        }
    }

    /// Hash of this header, the predecessor of the next one.
    pub fn hash(&self) -> Hash32 {
        hash_canonical(self)
    }

    /// Rebuild the latest header from the values a contract publishes per
    /// participant (previous hash, root hash, size).
    ///
    /// An all-zero `predecessor_hash` means the participant has not published
    /// yet, and yields `None`.
    pub fn from_published(predecessor_hash: Hash32, root_hash: Hash32, size: u32) -> Option<Self> {
        if predecessor_hash.is_zero() {
            return None;
        }
        Some(Self::new(predecessor_hash, Signature::new(size, root_hash)))
    }
}

impl CanonicalEncode for Header {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_array_header(3);
        encoder.write_unsigned(HEADER_FORMAT);
        encoder.write(&self.predecessor_hash);
        encoder.write(&self.commitment);
    }
}

/// Predecessor of a participant's first header.
pub fn genesis_predecessor(identity: &[u8]) -> Hash32 {
    hash_canonical(&Bytes::from(identity))
}

/// Predecessor of the header following `header`.
pub fn next_predecessor(header: &Header) -> Hash32 {
    header.hash()
}

/// Predecessor for a participant's next header, given their latest published
/// header if any.
pub fn resume_predecessor(identity: &[u8], latest: Option<&Header>) -> Hash32 {
    latest.map_or_else(|| genesis_predecessor(identity), next_predecessor)
}

/// Check that `headers` form an unbroken chain seeded by `identity`.
///
/// An empty chain is valid.
///
/// # Errors
///
/// [`ChainError::PredecessorMismatch`] for the first header that does not
/// link to its predecessor.
pub fn verify_chain(identity: &[u8], headers: &[Header]) -> Result<(), ChainError> {
    let mut chain = HeaderChain::new(identity);
    for header in headers {
        chain.append(*header)?;
    }
    Ok(())
}

/// An in-memory append-only chain of one participant's headers.
#[derive(Debug, Clone)]
pub struct HeaderChain {
    genesis: Hash32,
    head: Hash32,
    headers: Vec<Header>,
}

impl HeaderChain {
    /// Empty chain seeded with the genesis predecessor of `identity`.
    pub fn new(identity: &[u8]) -> Self {
        Self::with_genesis(genesis_predecessor(identity))
    }

    /// Empty chain seeded with an explicit genesis predecessor.
    pub fn with_genesis(genesis: Hash32) -> Self {
        Self {
            genesis,
            head: genesis,
            headers: Vec::new(),
        }
    }

    pub fn genesis(&self) -> Hash32 {
        self.genesis
    }

    /// The predecessor the next header must carry.
    pub fn head(&self) -> Hash32 {
        self.head
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// The most recently appended header.
    pub fn latest(&self) -> Option<&Header> {
        self.headers.last()
    }

    /// Append `header`, returning the new head.
    pub fn append(&mut self, header: Header) -> Result<Hash32, ChainError> {
        if header.predecessor_hash != self.head {
            return Err(ChainError::PredecessorMismatch {
                index: self.headers.len(),
                expected: self.head,
                actual: header.predecessor_hash,
            });
        }
        self.head = header.hash();
        self.headers.push(header);
        tracing::debug!(height = self.headers.len(), head = %self.head, "appended header");
        Ok(self.head)
    }

    /// Build and append the header committing to `signature`.
    pub fn commit(&mut self, signature: Signature) -> Header {
        let header = Header::new(self.head, signature);
        self.head = header.hash();
        self.headers.push(header);
        tracing::debug!(height = self.headers.len(), head = %self.head, "committed header");
        header
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::MerkleTree;
    use clique_core::{encode, Address};

    const CONTRACT: &str = "0x7d5f8E5Bbc981F30a0996089A7aAA1A09bC01312";

    fn h(s: &str) -> Hash32 {
        s.parse().unwrap()
    }

    fn identity() -> Address {
        CONTRACT.parse().unwrap()
    }

    fn golden_header() -> Header {
        Header::new(
            h("0x95deefbfdd17d8c322eed5315f46dd45a5b50615392d7e4a1cbc9983afbfc45d"),
            Signature::new(
                5,
                h("0xbcd96efb2dd6c0319c87b149754a00e7c35608ab50c104a649ca0a2be06fac75"),
            ),
        )
    }

    #[test]
    fn test_header_encoding_golden_vector() {
        assert_eq!(
            hex::encode(encode(&golden_header()).as_bytes()),
            "8300582095deefbfdd17d8c322eed5315f46dd45a5b50615392d7e4a1cbc9983afbfc45d\
             190413055820bcd96efb2dd6c0319c87b149754a00e7c35608ab50c104a649ca0a2be06fac75"
        );
    }

    #[test]
    fn test_header_hash_golden_vector() {
        assert_eq!(
            next_predecessor(&golden_header()),
            h("0xb754d3bd368bf5c8940b7733c2587ace11a3aaa37c8bfb6fd0ba21d4040f0658")
        );
    }

    #[test]
    fn test_genesis_for_address() {
        assert_eq!(
            genesis_predecessor(identity().as_bytes()),
            h("0xc7cf7068fd310fc7d617bf34b1a2a4e5ce2dcbd68b25053befe8a6ee14138d20")
        );
    }

    #[test]
    fn test_chain_commits_link() {
        let id = identity();
        let mut chain = HeaderChain::new(id.as_bytes());
        assert!(chain.is_empty());
        assert_eq!(chain.head(), chain.genesis());

        let h0 = chain.commit(MerkleTree::build((1..=9).collect::<Vec<u32>>()).signature());
        let h1 = chain.commit(MerkleTree::build(vec![1u32, 2, 3]).signature());

        assert_eq!(h0.predecessor_hash, genesis_predecessor(id.as_bytes()));
        assert_eq!(h1.predecessor_hash, h0.hash());
        assert_eq!(
            h0.hash(),
            h("0x29c3733aa667e880e2ecf98c1bb3a0afbcfe63e5d894bd0e8abe71d3fd9cce40")
        );
        assert_eq!(
            chain.head(),
            h("0xbda85eff8b86f18a168f7679f6f08aa9c3246fa5ea38cb3a237e2a793af9a0f6")
        );
        assert_eq!(chain.len(), 2);
        assert!(verify_chain(id.as_bytes(), chain.headers()).is_ok());
    }

    #[test]
    fn test_append_rejects_broken_link() {
        let mut chain = HeaderChain::new(identity().as_bytes());
        let err = chain.append(golden_header()).unwrap_err();
        assert_eq!(
            err,
            ChainError::PredecessorMismatch {
                index: 0,
                expected: chain.genesis(),
                actual: golden_header().predecessor_hash,
            }
        );
        assert!(chain.is_empty());
    }

    #[test]
    fn test_verify_chain_reports_first_broken_index() {
        let id = identity();
        let mut chain = HeaderChain::new(id.as_bytes());
        chain.commit(Signature::new(1, Hash32::new([1; 32])));
        chain.commit(Signature::new(2, Hash32::new([2; 32])));
        chain.commit(Signature::new(3, Hash32::new([3; 32])));

        let mut headers = chain.headers().to_vec();
        headers[1].commitment.size = 99;
        let err = verify_chain(id.as_bytes(), &headers).unwrap_err();
        assert!(matches!(err, ChainError::PredecessorMismatch { index: 2, .. }));
    }

    #[test]
    fn test_empty_chain_is_valid() {
        assert!(verify_chain(identity().as_bytes(), &[]).is_ok());
    }

    #[test]
    fn test_from_published_zero_means_none() {
        assert_eq!(Header::from_published(Hash32::ZERO, Hash32::new([1; 32]), 3), None);
        let id = identity();
        assert_eq!(resume_predecessor(id.as_bytes(), None), genesis_predecessor(id.as_bytes()));
    }

    #[test]
    fn test_resume_from_published_header() {
        let golden = golden_header();
        let latest = Header::from_published(
            golden.predecessor_hash,
            golden.commitment.hash,
            golden.commitment.size,
        );
        assert_eq!(latest, Some(golden));
        assert_eq!(
            resume_predecessor(identity().as_bytes(), latest.as_ref()),
            h("0xb754d3bd368bf5c8940b7733c2587ace11a3aaa37c8bfb6fd0ba21d4040f0658")
        );
    }

    #[test]
    fn test_header_serde_roundtrip() {
        let header = golden_header();
        let json = serde_json::to_string(&header).unwrap();
        let back: Header = serde_json::from_str(&json).unwrap();
        assert_eq!(back, header);
    }
}
