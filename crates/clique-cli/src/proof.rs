//! # Proof CLI — cut, narrow, inspect, and verify proofs.
//!
//! ```bash
//! clique prove records.json --index 3 --index 4 > proof.json
//! clique subset proof.json --index 4 > one.json
//! clique values proof.json
//! clique verify one.json --hash 0x890d…e506 --size 9
//! ```
//!
//! `verify` exits with status 2 and prints `invalid` when the proof does not
//! restore to the given root.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use clique_core::Hash32;
use clique_merkle::{verify_proof, verify_root_hash, ProofNode, Signature};
use serde::Serialize;
use serde_json::Value;

use crate::commit::load_tree;
use crate::config::Config;
use crate::{print_json, read_json, EXIT_INVALID};

/// Arguments for `clique prove`.
#[derive(Args, Debug)]
pub struct ProveArgs {
    /// JSON file holding an array of records.
    pub records: PathBuf,

    /// Index of a record to reveal. Repeat for several.
    #[arg(short, long = "index")]
    pub indices: Vec<usize>,
}

/// Arguments for `clique subset`.
#[derive(Args, Debug)]
pub struct SubsetArgs {
    /// Proof JSON file.
    pub proof: PathBuf,

    /// Index of an already-revealed record to keep. Repeat for several.
    #[arg(short, long = "index", required = true)]
    pub indices: Vec<usize>,
}

/// Arguments for `clique values`.
#[derive(Args, Debug)]
pub struct ValuesArgs {
    /// Proof JSON file.
    pub proof: PathBuf,
}

/// Arguments for `clique verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Proof JSON file.
    pub proof: PathBuf,

    /// Published root hash (0x-prefixed hex).
    #[arg(long)]
    pub hash: Hash32,

    /// Published record count. Without it only the hash is compared.
    #[arg(long)]
    pub size: Option<u32>,
}

/// A revealed record and its position in the committed list.
#[derive(Debug, Serialize, PartialEq)]
pub struct RevealedRecord {
    pub index: usize,
    pub value: Value,
}

/// Load a proof file.
pub fn load_proof(path: &Path) -> Result<ProofNode<Value>> {
    let raw: Value = read_json(path)?;
    ProofNode::from_json(raw).with_context(|| format!("invalid proof in {}", path.display()))
}

/// Build a proof revealing `indices` of the records in `path`.
pub fn prove_file(path: &Path, indices: &[usize]) -> Result<ProofNode<Value>> {
    let tree = load_tree(path)?;
    Ok(tree.make_proof(indices)?)
}

/// Narrow the proof in `path` to `indices`.
pub fn subset_file(path: &Path, indices: &[usize]) -> Result<ProofNode<Value>> {
    let proof = load_proof(path)?;
    Ok(proof.subset(indices)?)
}

/// Records revealed by the proof in `path`.
pub fn values_file(path: &Path) -> Result<Vec<RevealedRecord>> {
    let proof = load_proof(path)?;
    Ok(proof
        .revealed()
        .into_iter()
        .map(|(index, value)| RevealedRecord {
            index,
            value: value.clone(),
        })
        .collect())
}

/// Whether the proof in `path` restores to the given root.
pub fn verify_file(path: &Path, hash: Hash32, size: Option<u32>) -> Result<bool> {
    let proof = load_proof(path)?;
    let ok = match size {
        Some(size) => verify_proof(&proof, &Signature::new(size, hash)),
        None => verify_root_hash(&proof, &hash),
    };
    Ok(ok)
}

/// Execute `clique prove`.
pub fn run_prove(args: &ProveArgs, config: &Config) -> Result<u8> {
    let proof = prove_file(&args.records, &args.indices)?;
    print_json(&proof, config.pretty)?;
    Ok(0)
}

/// Execute `clique subset`.
pub fn run_subset(args: &SubsetArgs, config: &Config) -> Result<u8> {
    let proof = subset_file(&args.proof, &args.indices)?;
    print_json(&proof, config.pretty)?;
    Ok(0)
}

/// Execute `clique values`.
pub fn run_values(args: &ValuesArgs, config: &Config) -> Result<u8> {
    print_json(&values_file(&args.proof)?, config.pretty)?;
    Ok(0)
}

/// Execute `clique verify`.
pub fn run_verify(args: &VerifyArgs, _config: &Config) -> Result<u8> {
    if verify_file(&args.proof, args.hash, args.size)? {
        println!("valid");
        Ok(0)
    } else {
        println!("invalid");
        Ok(EXIT_INVALID)
    }
}
