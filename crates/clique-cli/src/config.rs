//! CLI configuration.
//!
//! Settings come from an optional YAML file named by `--config`, overridden
//! by environment variables, overridden in turn by command-line flags at the
//! point of use.
//!
//! ```yaml
//! identity: "0x7d5f8E5Bbc981F30a0996089A7aAA1A09bC01312"
//! pretty: false
//! ```
//!
//! Variables:
//! - `CLIQUE_IDENTITY`: default participant address for `header`, `genesis`, `chain`.
//! - `CLIQUE_PRETTY`: `true`/`false`, pretty-print JSON output (default: true).

use std::path::{Path, PathBuf};

use clique_core::{Address, CoreError};
use serde::Deserialize;

pub const ENV_IDENTITY: &str = "CLIQUE_IDENTITY";
pub const ENV_PRETTY: &str = "CLIQUE_PRETTY";

/// Contents of the YAML configuration file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub identity: Option<String>,
    pub pretty: Option<bool>,
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Default participant identity.
    pub identity: Option<Address>,
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            identity: None,
            pretty: true,
        }
    }
}

impl Config {
    /// Load the file at `path` (if any), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => read_file(p)?,
            None => FileConfig::default(),
        };
        Self::from_sources(file, |var| std::env::var(var).ok())
    }

    /// Merge a parsed file with an environment lookup.
    pub fn from_sources(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let identity = match env(ENV_IDENTITY).or(file.identity) {
            Some(raw) => Some(
                raw.parse::<Address>()
                    .map_err(|source| ConfigError::InvalidIdentity { raw, source })?,
            ),
            None => None,
        };
        let pretty = match env(ENV_PRETTY) {
            Some(raw) => parse_bool(ENV_PRETTY, &raw)?,
            None => file.pretty.unwrap_or(true),
        };
        Ok(Self { identity, pretty })
    }

    /// `flag` if given, else the configured identity.
    pub fn identity_or(&self, flag: Option<Address>) -> Option<Address> {
        flag.or(self.identity)
    }
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    // An empty YAML document parses as null.
    if text.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var: var.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid identity {raw:?}: {source}")]
    InvalidIdentity { raw: String, source: CoreError },
    #[error("{var} must be a boolean, got {value:?}")]
    InvalidBool { var: String, value: String },
}
