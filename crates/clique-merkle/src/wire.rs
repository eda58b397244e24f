//! # Proof Wire Format
//!
//! Proofs travel between the record server and verifiers as JSON:
//!
//! ```text
//! Branch  {"left": <node>, "right": <node>}
//! Pruned  {"sig": {"size": n, "hash": {"type": "Buffer", "data": [32 bytes]}}}
//! Leaf    {"value": <record>}
//! ```
//!
//! The hash shape is how the browser client's `Buffer` serializes. On input a
//! `0x`-prefixed hex string is accepted in its place.
//!
//! Parsing checks `left`, then `sig`, then `value`, and the chosen form must
//! be the whole object: a branch carries exactly `left` and `right`, the other
//! two forms their single key. Any other object is rejected as
//! [`MerkleError::InvalidProofShape`]; a recognized key with an unusable value
//! is [`MerkleError::MalformedEncoding`].

use clique_core::Hash32;
use serde::de::{DeserializeOwned, Error as _};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::MerkleError;
use crate::proof::ProofNode;
use crate::signature::Signature;

const BUFFER_TYPE: &str = "Buffer";

impl<T: DeserializeOwned> ProofNode<T> {
    /// Parse a proof from its JSON wire form.
    pub fn from_json(value: Value) -> Result<Self, MerkleError> {
        let mut map = match value {
            Value::Object(map) => map,
            other => {
                return Err(MerkleError::InvalidProofShape(format!(
                    "expected object, got {}",
                    kind(&other)
                )))
            }
        };

        if let Some(left) = map.remove("left") {
            let right = map.remove("right").ok_or_else(|| {
                MerkleError::InvalidProofShape("branch is missing \"right\"".to_string())
            })?;
            reject_leftover("branch", &map)?;
            return Ok(ProofNode::Branch(
                Box::new(Self::from_json(left)?),
                Box::new(Self::from_json(right)?),
            ));
        }
        if let Some(sig) = map.remove("sig") {
            reject_leftover("pruned", &map)?;
            return Ok(ProofNode::Pruned(parse_signature(sig)?));
        }
        if let Some(value) = map.remove("value") {
            reject_leftover("leaf", &map)?;
            let record = T::deserialize(value)
                .map_err(|e| MerkleError::MalformedEncoding(format!("leaf value: {e}")))?;
            return Ok(ProofNode::Leaf(record));
        }
        Err(MerkleError::InvalidProofShape(
            "object has none of \"left\", \"sig\", \"value\"".to_string(),
        ))
    }

    /// Parse a proof from JSON text.
    pub fn from_json_str(s: &str) -> Result<Self, MerkleError> {
        let value: Value = serde_json::from_str(s)
            .map_err(|e| MerkleError::MalformedEncoding(format!("proof json: {e}")))?;
        Self::from_json(value)
    }
}

fn reject_leftover(form: &str, rest: &Map<String, Value>) -> Result<(), MerkleError> {
    if rest.is_empty() {
        return Ok(());
    }
    let keys: Vec<&str> = rest.keys().map(String::as_str).collect();
    Err(MerkleError::InvalidProofShape(format!(
        "{form} node has unexpected keys: {}",
        keys.join(", ")
    )))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse_signature(value: Value) -> Result<Signature, MerkleError> {
    let mut map = match value {
        Value::Object(map) => map,
        other => {
            return Err(MerkleError::MalformedEncoding(format!(
                "sig must be an object, got {}",
                kind(&other)
            )))
        }
    };
    let size = map
        .remove("size")
        .ok_or_else(|| MerkleError::MalformedEncoding("sig is missing \"size\"".to_string()))?;
    let size = size
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| MerkleError::MalformedEncoding(format!("sig.size is not a u32: {size}")))?;
    let hash = map
        .remove("hash")
        .ok_or_else(|| MerkleError::MalformedEncoding("sig is missing \"hash\"".to_string()))?;
    Ok(Signature::new(size, parse_hash(hash)?))
}

fn parse_hash(value: Value) -> Result<Hash32, MerkleError> {
    match value {
        Value::String(s) => Ok(Hash32::from_hex(&s)?),
        Value::Object(map) => parse_buffer(map),
        other => Err(MerkleError::MalformedEncoding(format!(
            "sig.hash must be a Buffer or hex string, got {}",
            kind(&other)
        ))),
    }
}

fn parse_buffer(mut map: Map<String, Value>) -> Result<Hash32, MerkleError> {
    if let Some(ty) = map.remove("type") {
        if ty.as_str() != Some(BUFFER_TYPE) {
            return Err(MerkleError::MalformedEncoding(format!(
                "sig.hash.type must be \"{BUFFER_TYPE}\", got {ty}"
            )));
        }
    }
    let Some(Value::Array(items)) = map.remove("data") else {
        return Err(MerkleError::MalformedEncoding(
            "sig.hash.data must be an array".to_string(),
        ));
    };
    if items.len() != 32 {
        return Err(MerkleError::MalformedEncoding(format!(
            "sig.hash.data must hold 32 bytes, got {}",
            items.len()
        )));
    }
    let mut bytes = [0u8; 32];
    for (slot, item) in bytes.iter_mut().zip(&items) {
        *slot = item
            .as_u64()
            .and_then(|n| u8::try_from(n).ok())
            .ok_or_else(|| {
                MerkleError::MalformedEncoding(format!("sig.hash.data entry is not a byte: {item}"))
            })?;
    }
    Ok(Hash32::new(bytes))
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

struct WireSignature<'a>(&'a Signature);

struct WireBuffer<'a>(&'a [u8; 32]);

impl Serialize for WireBuffer<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", BUFFER_TYPE)?;
        map.serialize_entry("data", &self.0[..])?;
        map.end()
    }
}

impl Serialize for WireSignature<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("size", &self.0.size)?;
        map.serialize_entry("hash", &WireBuffer(self.0.hash.as_bytes()))?;
        map.end()
    }
}

impl<T: Serialize> Serialize for ProofNode<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ProofNode::Branch(left, right) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("left", left)?;
                map.serialize_entry("right", right)?;
                map.end()
            }
            ProofNode::Pruned(sig) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("sig", &WireSignature(sig))?;
                map.end()
            }
            ProofNode::Leaf(value) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("value", value)?;
                map.end()
            }
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for ProofNode<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ProofNode::from_json(value).map_err(D::Error::custom)
    }
}
