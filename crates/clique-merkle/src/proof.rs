//! # Selective-Disclosure Proofs
//!
//! A proof mirrors the tree it was cut from: paths to revealed records stay
//! expanded, and every subtree holding no revealed record collapses to its
//! signature.
//!
//! ## Security Invariant
//!
//! [`restore_root()`] never trusts a revealed record's claimed position or
//! hash. Leaf signatures are recomputed from the record content; only pruned
//! signatures are taken as given, and those are bound by the root hash. A
//! verifier must compare the restored signature against a root obtained from
//! an independent trusted source (e.g. the escrow contract).
//!
//! ## Narrowing
//!
//! [`ProofNode::subset()`] derives a smaller proof from a larger one without
//! access to the tree. Revealed leaves outside the requested set are pruned to
//! their recomputed signatures, so the narrowed proof restores to the same
//! root.

use clique_core::{CanonicalEncode, Hash32};

use crate::error::MerkleError;
use crate::signature::{combine, leaf_signature, Signature};

/// A node of a selective-disclosure proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofNode<T> {
    /// A revealed record.
    Leaf(T),
    /// A subtree with no revealed records, summarized by its signature.
    Pruned(Signature),
    /// Two adjacent subtrees, at least one holding a revealed record.
    Branch(Box<ProofNode<T>>, Box<ProofNode<T>>),
}

impl<T> ProofNode<T> {
    /// Number of records the proof covers, as claimed by its structure.
    ///
    /// Agrees with `restore_root(self).size` without hashing.
    pub fn size(&self) -> usize {
        self.size_u32() as usize
    }

    fn size_u32(&self) -> u32 {
        match self {
            ProofNode::Leaf(_) => 1,
            ProofNode::Pruned(sig) => sig.size,
            ProofNode::Branch(left, right) => left.size_u32().wrapping_add(right.size_u32()),
        }
    }

    /// Revealed records, left to right.
    pub fn values(&self) -> Vec<&T> {
        self.revealed().into_iter().map(|(_, value)| value).collect()
    }

    /// Revealed records paired with their index in the committed list.
    pub fn revealed(&self) -> Vec<(usize, &T)> {
        let mut out = Vec::new();
        self.collect_revealed(0, &mut out);
        out
    }

    fn collect_revealed<'a>(&'a self, offset: usize, out: &mut Vec<(usize, &'a T)>) {
        match self {
            ProofNode::Leaf(value) => out.push((offset, value)),
            ProofNode::Pruned(_) => {}
            ProofNode::Branch(left, right) => {
                left.collect_revealed(offset, out);
                right.collect_revealed(offset + left.size(), out);
            }
        }
    }
}

impl<T: CanonicalEncode> ProofNode<T> {
    /// See [`restore_root()`].
    pub fn restore_root(&self) -> Signature {
        restore_root(self)
    }

    /// See [`verify_proof()`].
    pub fn verify(&self, expected: &Signature) -> bool {
        verify_proof(self, expected)
    }
}

impl<T: CanonicalEncode + Clone> ProofNode<T> {
    /// Derive the minimal proof revealing only `indices`.
    ///
    /// Order and duplicates in `indices` are ignored. The result restores to
    /// the same signature as `self`.
    ///
    /// # Errors
    ///
    /// - [`MerkleError::IndexOutOfRange`] if an index is `>= self.size()`.
    /// - [`MerkleError::IndexNotRevealed`] if an index falls in a pruned subtree.
    pub fn subset(&self, indices: &[usize]) -> Result<ProofNode<T>, MerkleError> {
        let size = self.size();
        let mut ixs = indices.to_vec();
        ixs.sort_unstable();
        ixs.dedup();
        if let Some(&index) = ixs.iter().find(|&&i| i >= size) {
            return Err(MerkleError::IndexOutOfRange { index, size });
        }
        tracing::trace!(size, requested = ?ixs, "narrowing proof");
        self.narrow(&ixs, 0)
    }

    fn narrow(&self, indices: &[usize], offset: usize) -> Result<ProofNode<T>, MerkleError> {
        let Some(&first) = indices.first() else {
            return Ok(ProofNode::Pruned(restore_root(self)));
        };
        match self {
            ProofNode::Leaf(value) => match indices.iter().find(|&&i| i != offset) {
                // Only reachable when a hostile proof's sizes disagree with its shape.
                Some(&index) => Err(MerkleError::IndexNotRevealed { index }),
                None => Ok(ProofNode::Leaf(value.clone())),
            },
            ProofNode::Pruned(_) => Err(MerkleError::IndexNotRevealed { index: first }),
            ProofNode::Branch(left, right) => {
                let split = offset + left.size();
                let mid = indices.partition_point(|&i| i < split);
                let (left_ixs, right_ixs) = indices.split_at(mid);
                Ok(ProofNode::Branch(
                    Box::new(left.narrow(left_ixs, offset)?),
                    Box::new(right.narrow(right_ixs, split)?),
                ))
            }
        }
    }
}

/// Recompute the root signature a proof commits to.
///
/// Total: any well-formed proof yields a signature. Revealed records are
/// rehashed; pruned signatures are used as given.
pub fn restore_root<T: CanonicalEncode>(proof: &ProofNode<T>) -> Signature {
    match proof {
        ProofNode::Leaf(value) => leaf_signature(value),
        ProofNode::Pruned(sig) => *sig,
        ProofNode::Branch(left, right) => combine(&restore_root(left), &restore_root(right)),
    }
}

/// True iff `proof` restores to `expected` on both size and hash.
pub fn verify_proof<T: CanonicalEncode>(proof: &ProofNode<T>, expected: &Signature) -> bool {
    let restored = restore_root(proof);
    let ok = restored == *expected;
    if !ok {
        tracing::debug!(
            expected_size = expected.size,
            expected_hash = %expected.hash,
            restored_size = restored.size,
            restored_hash = %restored.hash,
            "proof does not restore to expected signature"
        );
    }
    ok
}

/// True iff `proof` restores to a signature whose hash is `expected`.
///
/// For trusted sources that publish only the root hash.
pub fn verify_root_hash<T: CanonicalEncode>(proof: &ProofNode<T>, expected: &Hash32) -> bool {
    let restored = restore_root(proof);
    let ok = restored.hash == *expected;
    if !ok {
        tracing::debug!(
            expected_hash = %expected,
            restored_hash = %restored.hash,
            "proof does not restore to expected root hash"
        );
    }
    ok
}

/// Derive the minimal proof for the single already-revealed `index`.
pub fn proof_subset<T: CanonicalEncode + Clone>(
    proof: &ProofNode<T>,
    index: usize,
) -> Result<ProofNode<T>, MerkleError> {
    proof.subset(&[index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::MerkleTree;

    fn nine() -> MerkleTree<u32> {
        MerkleTree::build((1..=9).collect())
    }

    #[test]
    fn test_scenario_proofs_verify() {
        let tree = nine();
        let root = tree.signature();
        for ixs in [vec![0], vec![1], vec![2], vec![3, 4], vec![5, 6]] {
            let proof = tree.make_proof(&ixs).unwrap();
            assert!(verify_proof(&proof, &root), "proof for {ixs:?} failed");
            assert!(verify_root_hash(&proof, &root.hash));
            assert_eq!(proof.size(), 9);
        }
    }

    #[test]
    fn test_proof_reveals_exactly_requested() {
        let proof = nine().make_proof(&[3, 4]).unwrap();
        assert_eq!(proof.revealed(), vec![(3, &4), (4, &5)]);
        assert_eq!(proof.values(), vec![&4, &5]);
    }

    #[test]
    fn test_fully_pruned_proof_restores_root() {
        let tree = nine();
        let proof = tree.make_proof(&[]).unwrap();
        assert_eq!(restore_root(&proof), tree.signature());
        assert!(proof.values().is_empty());
    }

    #[test]
    fn test_tampered_leaf_fails() {
        let tree = nine();
        let proof = tree.make_proof(&[0]).unwrap();
        let tampered = match proof {
            ProofNode::Branch(l, r) => match *l {
                ProofNode::Branch(ll, lr) => match *ll {
                    ProofNode::Branch(_, lllr) => ProofNode::Branch(
                        Box::new(ProofNode::Branch(
                            Box::new(ProofNode::Branch(Box::new(ProofNode::Leaf(42)), lllr)),
                            lr,
                        )),
                        r,
                    ),
                    other => panic!("unexpected {other:?}"),
                },
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        };
        assert!(!verify_proof(&tampered, &tree.signature()));
    }

    #[test]
    fn test_wrong_size_fails_full_verify_but_not_hash_only() {
        let tree = nine();
        let proof = tree.make_proof(&[2]).unwrap();
        let mut expected = tree.signature();
        expected.size = 10;
        assert!(!verify_proof(&proof, &expected));
        assert!(verify_root_hash(&proof, &expected.hash));
    }

    #[test]
    fn test_subset_matches_direct_proof() {
        let tree = nine();
        let big = tree.make_proof(&[3, 4, 5, 6]).unwrap();
        for i in [3, 4, 5, 6] {
            let narrowed = proof_subset(&big, i).unwrap();
            assert_eq!(narrowed, tree.make_proof(&[i]).unwrap());
            assert_eq!(restore_root(&narrowed), tree.signature());
        }
        let pair = big.subset(&[6, 4]).unwrap();
        assert_eq!(pair, tree.make_proof(&[4, 6]).unwrap());
    }

    #[test]
    fn test_subset_of_pruned_index_fails() {
        let big = nine().make_proof(&[3, 4]).unwrap();
        assert_eq!(
            proof_subset(&big, 0).unwrap_err(),
            MerkleError::IndexNotRevealed { index: 0 }
        );
    }

    #[test]
    fn test_subset_out_of_range_fails() {
        let big = nine().make_proof(&[3, 4]).unwrap();
        assert_eq!(
            proof_subset(&big, 9).unwrap_err(),
            MerkleError::IndexOutOfRange { index: 9, size: 9 }
        );
    }

    #[test]
    fn test_subset_empty_set_prunes_everything() {
        let tree = nine();
        let big = tree.make_proof(&[1, 7]).unwrap();
        assert_eq!(big.subset(&[]).unwrap(), ProofNode::Pruned(tree.signature()));
    }

    #[test]
    fn test_single_leaf_tree_proof() {
        let tree = MerkleTree::build(vec!["only".to_string()]);
        let proof = tree.make_proof(&[0]).unwrap();
        assert_eq!(proof, ProofNode::Leaf("only".to_string()));
        assert!(proof.verify(&tree.signature()));
    }

    #[test]
    fn test_empty_tree_proof_verifies() {
        let tree: MerkleTree<u32> = MerkleTree::build(vec![]);
        let proof = tree.make_proof(&[]).unwrap();
        assert!(verify_proof(&proof, &Signature::empty()));
        assert_eq!(proof.size(), 0);
    }
}
