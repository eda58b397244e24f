//! # Proof Property Tests
//!
//! Randomized checks of the commitment invariants over arbitrary record
//! lists and index sets:
//!
//! - round trip: a proof for any valid index set restores the tree signature;
//! - non-disclosure: exactly the requested records are revealed;
//! - subset consistency: narrowing agrees with building directly;
//! - tamper sensitivity: changing a revealed record or any byte of a pruned
//!   hash breaks verification;
//! - size additivity and determinism of tree construction.

use clique_core::Hash32;
use clique_merkle::{restore_root, verify_proof, MerkleError, MerkleTree, ProofNode};
use proptest::prelude::*;
use serde_json::Value;

/// A record list with a valid (possibly empty) index subset.
fn records_and_indices() -> impl Strategy<Value = (Vec<u64>, Vec<usize>)> {
    prop::collection::vec(any::<u64>(), 1..64).prop_flat_map(|records| {
        let n = records.len();
        (
            Just(records),
            prop::collection::vec(0..n, 0..8),
        )
    })
}

fn sorted_unique(mut ixs: Vec<usize>) -> Vec<usize> {
    ixs.sort_unstable();
    ixs.dedup();
    ixs
}

fn pruned_count<T>(node: &ProofNode<T>) -> usize {
    match node {
        ProofNode::Leaf(_) => 0,
        ProofNode::Pruned(_) => 1,
        ProofNode::Branch(left, right) => pruned_count(left) + pruned_count(right),
    }
}

/// Xor `mask` into byte `byte` of the `target`-th pruned hash, counted left
/// to right. Returns whether a pruned node was reached.
fn flip_pruned<T>(node: &mut ProofNode<T>, target: &mut usize, byte: usize, mask: u8) -> bool {
    match node {
        ProofNode::Leaf(_) => false,
        ProofNode::Pruned(sig) => {
            if *target > 0 {
                *target -= 1;
                return false;
            }
            let mut bytes = *sig.hash.as_bytes();
            bytes[byte] ^= mask;
            sig.hash = Hash32::new(bytes);
            true
        }
        ProofNode::Branch(left, right) => {
            flip_pruned(left, target, byte, mask) || flip_pruned(right, target, byte, mask)
        }
    }
}

proptest! {
    #[test]
    fn proof_restores_tree_signature((records, ixs) in records_and_indices()) {
        let tree = MerkleTree::build(records);
        let proof = tree.make_proof(&ixs).unwrap();
        prop_assert_eq!(restore_root(&proof), tree.signature());
        prop_assert!(verify_proof(&proof, &tree.signature()));
    }

    #[test]
    fn proof_reveals_exactly_requested((records, ixs) in records_and_indices()) {
        let tree = MerkleTree::build(records.clone());
        let proof = tree.make_proof(&ixs).unwrap();
        let expected: Vec<(usize, &u64)> = sorted_unique(ixs)
            .into_iter()
            .map(|i| (i, &records[i]))
            .collect();
        prop_assert_eq!(proof.revealed(), expected);
        prop_assert_eq!(proof.size(), records.len());
    }

    #[test]
    fn subset_matches_direct_proof((records, ixs) in records_and_indices()) {
        let tree = MerkleTree::build(records);
        let big = tree.make_proof(&ixs).unwrap();
        for &i in &ixs {
            let narrowed = big.subset(&[i]).unwrap();
            prop_assert_eq!(&narrowed, &tree.make_proof(&[i]).unwrap());
            prop_assert_eq!(restore_root(&narrowed), restore_root(&big));
        }
    }

    #[test]
    fn subset_outside_revealed_fails((records, ixs) in records_and_indices()) {
        let tree = MerkleTree::build(records.clone());
        let big = tree.make_proof(&ixs).unwrap();
        let revealed = sorted_unique(ixs);
        for i in (0..records.len()).filter(|i| !revealed.contains(i)) {
            prop_assert_eq!(
                big.subset(&[i]).unwrap_err(),
                MerkleError::IndexNotRevealed { index: i }
            );
        }
    }

    #[test]
    fn tampered_leaf_fails_verification(
        (records, ixs) in records_and_indices(),
        delta in 1u64..,
    ) {
        prop_assume!(!ixs.is_empty());
        let tree = MerkleTree::build(records.clone());
        let target = ixs[0];
        let mut tampered = records;
        tampered[target] = tampered[target].wrapping_add(delta);
        let forged = MerkleTree::build(tampered).make_proof(&ixs).unwrap();
        prop_assert!(!verify_proof(&forged, &tree.signature()));
    }

    #[test]
    fn tampered_pruned_hash_fails_verification(
        (records, ixs) in records_and_indices(),
        byte in 0usize..32,
        mask in 1u8..=255,
    ) {
        let tree = MerkleTree::build(records);
        let proof = tree.make_proof(&ixs).unwrap();
        for k in 0..pruned_count(&proof) {
            let mut tampered = proof.clone();
            prop_assert!(flip_pruned(&mut tampered, &mut k.clone(), byte, mask));
            prop_assert!(!verify_proof(&tampered, &tree.signature()));
        }
    }

    #[test]
    fn size_is_additive(left in prop::collection::vec(any::<u32>(), 0..32),
                        right in prop::collection::vec(any::<u32>(), 0..32)) {
        let l = MerkleTree::build(left.clone()).size();
        let r = MerkleTree::build(right.clone()).size();
        let mut all = left;
        all.extend(right);
        let tree = MerkleTree::build(all);
        prop_assert_eq!(tree.size(), l + r);
        prop_assert_eq!(tree.signature().size as usize, l + r);
    }

    #[test]
    fn build_is_deterministic(records in prop::collection::vec(".{0,12}", 0..32)) {
        let a = MerkleTree::build(records.clone());
        let b = MerkleTree::build(records);
        prop_assert_eq!(a.signature(), b.signature());
    }

    #[test]
    fn out_of_range_index_rejected(records in prop::collection::vec(any::<u8>(), 0..32),
                                   extra in 0usize..8) {
        let tree = MerkleTree::build(records);
        let size = tree.size();
        let index = size + extra;
        prop_assert_eq!(
            tree.make_proof(&[index]).unwrap_err(),
            MerkleError::IndexOutOfRange { index, size }
        );
    }

    #[test]
    fn wire_roundtrip_preserves_proof((records, ixs) in records_and_indices()) {
        let tree = MerkleTree::build(records);
        let proof = tree.make_proof(&ixs).unwrap();
        let json: Value = serde_json::to_value(&proof).unwrap();
        let back: ProofNode<u64> = ProofNode::from_json(json).unwrap();
        prop_assert_eq!(back, proof);
    }
}
