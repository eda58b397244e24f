//! # Header Chain CLI
//!
//! ```bash
//! # Genesis predecessor for a participant:
//! clique genesis --identity 0x7d5f…1312
//!
//! # Encode a header and compute the next predecessor:
//! clique header --size 9 --hash 0x890d…e506 --identity 0x7d5f…1312
//! clique header --size 3 --hash 0xa653…665f --prev 0x29c3…ce40
//!
//! # Validate a chain of headers:
//! clique chain headers.json --identity 0x7d5f…1312
//! ```
//!
//! `--identity` falls back to the configured identity.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use clique_core::{encode, Address, Hash32};
use clique_merkle::{genesis_predecessor, verify_chain, ChainError, Header, Signature};
use serde::Serialize;

use crate::config::Config;
use crate::{print_json, read_json, EXIT_INVALID};

/// Arguments for `clique header`.
#[derive(Args, Debug)]
pub struct HeaderArgs {
    /// Record count of the committed tree.
    #[arg(long)]
    pub size: u32,

    /// Root hash of the committed tree.
    #[arg(long)]
    pub hash: Hash32,

    /// Hash of the previous header.
    #[arg(long, conflicts_with = "identity")]
    pub prev: Option<Hash32>,

    /// Participant address; the header links to its genesis predecessor.
    #[arg(long)]
    pub identity: Option<Address>,
}

/// Arguments for `clique genesis`.
#[derive(Args, Debug)]
pub struct GenesisArgs {
    /// Participant address.
    #[arg(long)]
    pub identity: Option<Address>,
}

/// Arguments for `clique chain`.
#[derive(Args, Debug)]
pub struct ChainArgs {
    /// JSON file holding an array of headers, oldest first.
    pub headers: PathBuf,

    /// Participant address seeding the chain.
    #[arg(long)]
    pub identity: Option<Address>,
}

/// Output of `clique header`.
#[derive(Debug, Serialize, PartialEq)]
pub struct HeaderReport {
    pub header: Header,
    /// Canonical encoding, lowercase hex.
    pub encoding: String,
    /// Hash of the header, the next predecessor.
    pub hash: Hash32,
}

/// Output of a successful `clique chain`.
#[derive(Debug, Serialize, PartialEq)]
pub struct ChainReport {
    pub length: usize,
    pub genesis: Hash32,
    /// Predecessor the next header must carry.
    pub head: Hash32,
}

fn require_identity(flag: Option<Address>, config: &Config) -> Result<Address> {
    config
        .identity_or(flag)
        .context("no identity given: pass --identity or set it in the config")
}

/// Build the header for `signature` linked to `prev`.
pub fn build_header(signature: Signature, prev: Hash32) -> HeaderReport {
    let header = Header::new(prev, signature);
    HeaderReport {
        header,
        encoding: hex::encode(encode(&header).as_bytes()),
        hash: header.hash(),
    }
}

/// Validate the headers in `path` against the chain seeded by `identity`.
pub fn check_chain_file(path: &Path, identity: &Address) -> Result<Result<ChainReport, ChainError>> {
    let headers: Vec<Header> = read_json(path)?;
    let genesis = genesis_predecessor(identity.as_bytes());
    Ok(verify_chain(identity.as_bytes(), &headers).map(|()| ChainReport {
        length: headers.len(),
        genesis,
        head: headers.last().map_or(genesis, Header::hash),
    }))
}

/// Execute `clique header`.
pub fn run_header(args: &HeaderArgs, config: &Config) -> Result<u8> {
    let prev = match args.prev {
        Some(prev) => prev,
        None => genesis_predecessor(require_identity(args.identity, config)?.as_bytes()),
    };
    let report = build_header(Signature::new(args.size, args.hash), prev);
    print_json(&report, config.pretty)?;
    Ok(0)
}

/// Execute `clique genesis`.
pub fn run_genesis(args: &GenesisArgs, config: &Config) -> Result<u8> {
    let identity = require_identity(args.identity, config)?;
    println!("{}", genesis_predecessor(identity.as_bytes()));
    Ok(0)
}

/// Execute `clique chain`.
pub fn run_chain(args: &ChainArgs, config: &Config) -> Result<u8> {
    let identity = require_identity(args.identity, config)?;
    match check_chain_file(&args.headers, &identity)? {
        Ok(report) => {
            print_json(&report, config.pretty)?;
            Ok(0)
        }
        Err(e) => {
            tracing::warn!(error = %e, "header chain is broken");
            println!("invalid: {e}");
            Ok(EXIT_INVALID)
        }
    }
}
