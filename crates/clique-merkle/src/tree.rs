//! # Merkle Tree
//!
//! A balanced binary tree built once from an ordered list of records. Each
//! node memoizes its signature at construction, so the root signature and
//! every pruned subtree signature in a proof are read without rehashing.
//!
//! ## Shape
//!
//! A list of `n > 1` records splits at `mid = n / 2`: the left subtree covers
//! `records[..mid]` and the right covers `records[mid..]`. The shape depends
//! only on `n`, so a verifier needs no shape metadata beyond the proof.

use clique_core::CanonicalEncode;

use crate::error::MerkleError;
use crate::proof::ProofNode;
use crate::signature::{combine, leaf_signature, Signature};

/// A node of a built tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MerkleNode<T> {
    /// A single record.
    Leaf {
        value: T,
        signature: Signature,
    },
    /// Two adjacent subtrees.
    Branch {
        left: Box<MerkleNode<T>>,
        right: Box<MerkleNode<T>>,
        signature: Signature,
    },
}

impl<T: CanonicalEncode> MerkleNode<T> {
    fn build(mut records: Vec<T>) -> Option<Self> {
        match records.len() {
            0 => None,
            1 => records.pop().map(|value| {
                let signature = leaf_signature(&value);
                MerkleNode::Leaf { value, signature }
            }),
            n => {
                let right_records = records.split_off(n / 2);
                let left = Self::build(records)?;
                let right = Self::build(right_records)?;
                let signature = combine(left.signature(), right.signature());
                Some(MerkleNode::Branch {
                    left: Box::new(left),
                    right: Box::new(right),
                    signature,
                })
            }
        }
    }
}

impl<T> MerkleNode<T> {
    /// The memoized signature of this subtree.
    pub fn signature(&self) -> &Signature {
        match self {
            MerkleNode::Leaf { signature, .. } => signature,
            MerkleNode::Branch { signature, .. } => signature,
        }
    }

    /// Number of records under this node.
    pub fn size(&self) -> usize {
        self.signature().size as usize
    }

    fn get(&self, index: usize) -> Option<&T> {
        match self {
            MerkleNode::Leaf { value, .. } => (index == 0).then_some(value),
            MerkleNode::Branch { left, right, .. } => {
                let left_size = left.size();
                if index < left_size {
                    left.get(index)
                } else {
                    right.get(index - left_size)
                }
            }
        }
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a T>) {
        match self {
            MerkleNode::Leaf { value, .. } => out.push(value),
            MerkleNode::Branch { left, right, .. } => {
                left.collect(out);
                right.collect(out);
            }
        }
    }
}

impl<T: Clone> MerkleNode<T> {
    /// `indices` are sorted, deduplicated, and all within this node's span
    /// starting at `offset`.
    fn prove(&self, indices: &[usize], offset: usize) -> ProofNode<T> {
        if indices.is_empty() {
            return ProofNode::Pruned(*self.signature());
        }
        match self {
            MerkleNode::Leaf { value, .. } => ProofNode::Leaf(value.clone()),
            MerkleNode::Branch { left, right, .. } => {
                let split = offset + left.size();
                let mid = indices.partition_point(|&i| i < split);
                let (left_ixs, right_ixs) = indices.split_at(mid);
                ProofNode::Branch(
                    Box::new(left.prove(left_ixs, offset)),
                    Box::new(right.prove(right_ixs, split)),
                )
            }
        }
    }
}

/// An immutable Merkle commitment over an ordered list of records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree<T> {
    root: Option<MerkleNode<T>>,
}

impl<T: CanonicalEncode> MerkleTree<T> {
    /// Build the tree over `records`, preserving their order.
    pub fn build(records: Vec<T>) -> Self {
        let count = records.len();
        let root = MerkleNode::build(records);
        if let Some(node) = &root {
            tracing::debug!(
                size = count,
                root = %node.signature().hash,
                "built merkle tree"
            );
        }
        Self { root }
    }
}

impl<T: CanonicalEncode> FromIterator<T> for MerkleTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::build(iter.into_iter().collect())
    }
}

impl<T> MerkleTree<T> {
    /// The root node, absent for an empty tree.
    pub fn root(&self) -> Option<&MerkleNode<T>> {
        self.root.as_ref()
    }

    /// Number of committed records.
    pub fn size(&self) -> usize {
        self.root.as_ref().map_or(0, MerkleNode::size)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The root signature. An empty tree has [`Signature::empty()`].
    pub fn signature(&self) -> Signature {
        self.root
            .as_ref()
            .map_or_else(Signature::empty, |node| *node.signature())
    }

    /// The record at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.size() {
            return None;
        }
        self.root.as_ref().and_then(|node| node.get(index))
    }

    /// All records in commitment order.
    pub fn records(&self) -> Vec<&T> {
        let mut out = Vec::with_capacity(self.size());
        if let Some(node) = &self.root {
            node.collect(&mut out);
        }
        out
    }
}

impl<T: Clone> MerkleTree<T> {
    /// Build a proof revealing exactly the records at `indices`.
    ///
    /// Order and duplicates in `indices` are ignored. Every subtree holding
    /// no requested index is collapsed to its signature. An empty index set
    /// yields the fully pruned root.
    ///
    /// # Errors
    ///
    /// [`MerkleError::IndexOutOfRange`] if any index is `>= self.size()`.
    pub fn make_proof(&self, indices: &[usize]) -> Result<ProofNode<T>, MerkleError> {
        let size = self.size();
        let mut ixs = indices.to_vec();
        ixs.sort_unstable();
        ixs.dedup();
        if let Some(&index) = ixs.iter().find(|&&i| i >= size) {
            return Err(MerkleError::IndexOutOfRange { index, size });
        }

        let proof = match &self.root {
            None => ProofNode::Pruned(Signature::empty()),
            Some(node) => node.prove(&ixs, 0),
        };
        tracing::debug!(size, revealed = ixs.len(), "built merkle proof");
        Ok(proof)
    }
}
