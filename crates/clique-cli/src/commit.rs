//! # Commit CLI — build a tree over a record file.
//!
//! ```bash
//! # Print {"size": n, "hash": "0x…"} for the records in a JSON array:
//! clique commit records.json
//!
//! # Show the tree shape with abbreviated signatures:
//! clique inspect records.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Args;
use clique_merkle::{MerkleTree, Signature};
use serde_json::Value;

use crate::config::Config;
use crate::render::render_tree;
use crate::{print_json, read_json};

/// Arguments shared by `commit` and `inspect`.
#[derive(Args, Debug)]
pub struct CommitArgs {
    /// JSON file holding an array of records.
    pub records: PathBuf,
}

/// Load a record file and build its tree.
pub fn load_tree(path: &Path) -> Result<MerkleTree<Value>> {
    let records = match read_json::<Value>(path)? {
        Value::Array(items) => items,
        other => bail!(
            "{} must hold a JSON array of records, found {}",
            path.display(),
            match other {
                Value::Object(_) => "an object",
                _ => "a scalar",
            }
        ),
    };
    tracing::info!(path = %path.display(), records = records.len(), "loaded records");
    Ok(MerkleTree::build(records))
}

/// Signature of the tree over the records in `path`.
pub fn commit_file(path: &Path) -> Result<Signature> {
    Ok(load_tree(path)?.signature())
}

/// Execute `clique commit`.
pub fn run_commit(args: &CommitArgs, config: &Config) -> Result<u8> {
    let signature = commit_file(&args.records)?;
    print_json(&signature, config.pretty)?;
    Ok(0)
}

/// Execute `clique inspect`.
pub fn run_inspect(args: &CommitArgs, _config: &Config) -> Result<u8> {
    let tree = load_tree(&args.records)?;
    print!("{}", render_tree(&tree));
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn commit_matches_reference_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "records.json", "[1,2,3,4,5,6,7,8,9]");
        let sig = commit_file(&path).unwrap();
        assert_eq!(sig.size, 9);
        assert_eq!(
            sig.hash.to_prefixed_hex(),
            "0x890d3333ebfd94964bcccea4196314c1c1312dfc16654dc7d02b19a7d517e506"
        );
    }

    #[test]
    fn commit_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "records.json", "[]");
        assert_eq!(commit_file(&path).unwrap(), Signature::empty());
    }

    #[test]
    fn non_array_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "records.json", r#"{"a": 1}"#);
        let err = commit_file(&path).unwrap_err();
        assert!(err.to_string().contains("JSON array"));
    }
}
