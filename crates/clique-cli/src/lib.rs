//! # clique-cli — Command-Line Interface for Clique Commitments
//!
//! Provides the `clique` binary for working with commitments over JSON
//! record files.
//!
//! ## Subcommands
//!
//! - `clique commit` / `clique inspect`: Build a tree and print its signature or shape.
//! - `clique prove` / `clique subset`: Cut a proof, or narrow an existing one.
//! - `clique verify` / `clique values`: Check a proof against a published root; list what it reveals.
//! - `clique header` / `clique genesis` / `clique chain`: Header-chain helpers.
//!
//! ```bash
//! clique commit records.json
//! clique prove records.json --index 3 --index 4 > proof.json
//! clique verify proof.json --hash 0x890d…e506 --size 9
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing and output live here; commitment logic lives in
//!   `clique-merkle`.
//! - JSON goes to stdout, logs go to stderr.

pub mod chain;
pub mod commit;
pub mod config;
pub mod proof;
pub mod render;

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Exit status for a proof or chain that failed verification.
pub const EXIT_INVALID: u8 = 2;

/// Read and parse a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON in {}", path.display()))
}

/// Serialize `value` as JSON text.
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    text.context("failed to serialize output")
}

/// Print `value` as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    println!("{}", to_json(value, pretty)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn read_json_reports_path_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let err = read_json::<Value>(&path).unwrap_err();
        assert!(format!("{err:#}").contains("missing.json"));
    }

    #[test]
    fn read_json_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = read_json::<Value>(&path).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse JSON"));
    }

    #[test]
    fn to_json_compact_and_pretty() {
        let v = json!({"a": 1});
        assert_eq!(to_json(&v, false).unwrap(), r#"{"a":1}"#);
        assert!(to_json(&v, true).unwrap().contains('\n'));
    }
}
