//! # Canonical Encoding — Deterministic CBOR for Hashing
//!
//! This module defines `CanonicalBytes`, the sole construction path for bytes
//! used in leaf and header digest computation.
//!
//! ## Security Invariant
//!
//! `CanonicalBytes` has a private inner field. It can only be produced by
//! [`CanonicalBytes::new()`] or [`Encoder::finish()`], both of which drive the
//! deterministic encoder below. Every function that hashes record content
//! accepts `&CanonicalBytes`, so no digest can be computed over bytes that
//! bypassed canonicalization.
//!
//! ## Encoding Rules
//!
//! The output is CBOR (RFC 8949) restricted to a deterministic subset. Item
//! heads, strings, and float widths are produced by `ciborium_ll`; the rules
//! it does not decide are applied here.
//!
//!
//! 1. **Integers** use the shortest argument width. Negative integers use
//!    major type 1 (`-1 - n`).
//! 2. **Strings and byte strings** are definite-length. Raw bytes are only
//!    emitted as a byte string when wrapped in [`Bytes`] (or a fixed-width
//!    hash/address type); a `Vec<u8>` is a sequence of integers.
//! 3. **Maps** are definite-length with entries ordered by the bytewise
//!    lexicographic order of their encoded keys (RFC 8949 §4.2.1). Insertion
//!    order never reaches the output.
//! 4. **Floats** with an integral value in the safe-integer range encode as
//!    integers. Other floats take the shortest of half, single, or double
//!    precision that reproduces the value exactly.
//!
//! Record types opt in through the [`CanonicalEncode`] trait. The special
//! record kinds (`Signature`, `Header`) implement it in `clique-merkle` with
//! their own fixed layouts.

use std::collections::BTreeMap;
use std::convert::Infallible;

use ciborium_io::Write;
use ciborium_ll::{simple, Header};
use serde_json::Value;

/// Largest integer a double can hold without losing precision (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Bytes produced exclusively by the deterministic encoder.
///
/// # Invariants
///
/// - The only constructors are [`CanonicalBytes::new()`] and [`Encoder::finish()`].
/// - Equal logical values always produce identical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonically encode a value.
    ///
    /// Encoding is total over every [`CanonicalEncode`] type, so this
    /// constructor cannot fail.
    pub fn new<T: CanonicalEncode + ?Sized>(value: &T) -> Self {
        let mut encoder = Encoder::new();
        value.encode(&mut encoder);
        encoder.finish()
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the wrapper and return the owned bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Canonically encode a value. Shorthand for [`CanonicalBytes::new()`].
pub fn encode<T: CanonicalEncode + ?Sized>(value: &T) -> CanonicalBytes {
    CanonicalBytes::new(value)
}

/// A type with a fixed canonical encoding.
///
/// Implementations must be deterministic: two values that are logically
/// equal must write the same items in the same order.
pub trait CanonicalEncode {
    /// Write this value's canonical items into `encoder`.
    fn encode(&self, encoder: &mut Encoder);
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// Growable output for `ciborium_ll`. Appending to a `Vec` cannot fail.
struct BufferSink<'a>(&'a mut Vec<u8>);

impl Write for BufferSink<'_> {
    type Error = Infallible;

    fn write_all(&mut self, data: &[u8]) -> Result<(), Infallible> {
        self.0.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

fn settle(result: Result<(), Infallible>) {
    match result {
        Ok(()) => {}
        Err(never) => match never {},
    }
}

/// Streaming writer for the deterministic CBOR subset.
///
/// Item heads, strings, and floats go through `ciborium_ll`, which already
/// picks the shortest argument width and the narrowest exact float. This type
/// adds what CBOR leaves to the application: sorted map keys, integral floats
/// collapsed to integers, and items written without an enclosing container.
///
/// Callers implementing [`CanonicalEncode`] for their own record types push
/// items in order; container headers must be written with the exact item
/// count that follows.
#[derive(Debug, Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    /// Create an empty encoder.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Finish encoding and seal the output as canonical bytes.
    pub fn finish(self) -> CanonicalBytes {
        CanonicalBytes(self.buf)
    }

    /// Encode any canonical value as the next item(s).
    pub fn write<T: CanonicalEncode + ?Sized>(&mut self, value: &T) {
        value.encode(self);
    }

    /// Write an unsigned integer.
    pub fn write_unsigned(&mut self, n: u64) {
        self.push(Header::Positive(n));
    }

    /// Write a signed integer, using major type 1 for negatives.
    pub fn write_signed(&mut self, n: i64) {
        if n >= 0 {
            self.push(Header::Positive(n as u64));
        } else {
            // ciborium_ll takes the complemented magnitude, i.e. -1 - n.
            self.push(Header::Negative(!n as u64));
        }
    }

    /// Write a definite-length byte string.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        settle(self.cbor().bytes(bytes, None::<usize>));
    }

    /// Write a definite-length UTF-8 string.
    pub fn write_text(&mut self, text: &str) {
        settle(self.cbor().text(text, None::<usize>));
    }

    /// Write an array header announcing `len` items.
    pub fn write_array_header(&mut self, len: usize) {
        self.push(Header::Array(Some(len)));
    }

    /// Write a boolean.
    pub fn write_bool(&mut self, value: bool) {
        self.push(Header::Simple(if value { simple::TRUE } else { simple::FALSE }));
    }

    /// Write `null`.
    pub fn write_null(&mut self) {
        self.push(Header::Simple(simple::NULL));
    }

    /// Write a floating-point number.
    ///
    /// Integral values in the safe-integer range are written as integers;
    /// everything else takes the narrowest exact float width. Every NaN is
    /// written as the canonical quiet NaN `f97e00`.
    pub fn write_float(&mut self, value: f64) {
        if value.is_nan() {
            self.push(Header::Float(f64::NAN));
            return;
        }
        let negative_zero = value == 0.0 && value.is_sign_negative();
        if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER && !negative_zero {
            self.write_signed(value as i64);
            return;
        }
        self.push(Header::Float(value));
    }

    /// Write a map whose entries are sorted by encoded key bytes.
    pub fn write_map<'a, K, V, I>(&mut self, entries: I)
    where
        K: CanonicalEncode + ?Sized + 'a,
        V: CanonicalEncode + ?Sized + 'a,
        I: IntoIterator<Item = (&'a K, &'a V)>,
    {
        let mut encoded: Vec<(CanonicalBytes, CanonicalBytes)> = entries
            .into_iter()
            .map(|(k, v)| (encode(k), encode(v)))
            .collect();
        encoded.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

        self.push(Header::Map(Some(encoded.len())));
        for (key, value) in encoded {
            self.buf.extend_from_slice(key.as_bytes());
            self.buf.extend_from_slice(value.as_bytes());
        }
    }

    fn cbor(&mut self) -> ciborium_ll::Encoder<BufferSink<'_>> {
        ciborium_ll::Encoder::from(BufferSink(&mut self.buf))
    }

    fn push(&mut self, header: Header) {
        settle(self.cbor().push(header));
    }
}

// ---------------------------------------------------------------------------
// Byte strings
// ---------------------------------------------------------------------------

/// An owned byte string that encodes as a CBOR byte string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    /// Borrow the raw bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Bytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl CanonicalEncode for Bytes {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_bytes(&self.0);
    }
}

// ---------------------------------------------------------------------------
// Standard implementations
// ---------------------------------------------------------------------------

macro_rules! encode_unsigned {
    ($($t:ty),*) => {$(
        impl CanonicalEncode for $t {
            fn encode(&self, encoder: &mut Encoder) {
                encoder.write_unsigned(*self as u64);
            }
        }
    )*};
}

macro_rules! encode_signed {
    ($($t:ty),*) => {$(
        impl CanonicalEncode for $t {
            fn encode(&self, encoder: &mut Encoder) {
                encoder.write_signed(*self as i64);
            }
        }
    )*};
}

encode_unsigned!(u8, u16, u32, u64, usize);
encode_signed!(i8, i16, i32, i64, isize);

impl CanonicalEncode for bool {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_bool(*self);
    }
}

impl CanonicalEncode for f32 {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_float(*self as f64);
    }
}

impl CanonicalEncode for f64 {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_float(*self);
    }
}

impl CanonicalEncode for str {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_text(self);
    }
}

impl CanonicalEncode for String {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_text(self);
    }
}

impl<T: CanonicalEncode + ?Sized> CanonicalEncode for &T {
    fn encode(&self, encoder: &mut Encoder) {
        (**self).encode(encoder);
    }
}

impl<T: CanonicalEncode> CanonicalEncode for Option<T> {
    fn encode(&self, encoder: &mut Encoder) {
        match self {
            Some(value) => value.encode(encoder),
            None => encoder.write_null(),
        }
    }
}

impl<T: CanonicalEncode> CanonicalEncode for [T] {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_array_header(self.len());
        for item in self {
            item.encode(encoder);
        }
    }
}

impl<T: CanonicalEncode> CanonicalEncode for Vec<T> {
    fn encode(&self, encoder: &mut Encoder) {
        self.as_slice().encode(encoder);
    }
}

impl<V: CanonicalEncode> CanonicalEncode for BTreeMap<String, V> {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_map(self.iter());
    }
}

impl CanonicalEncode for Value {
    fn encode(&self, encoder: &mut Encoder) {
        match self {
            Value::Null => encoder.write_null(),
            Value::Bool(b) => encoder.write_bool(*b),
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    encoder.write_unsigned(u);
                } else if let Some(i) = n.as_i64() {
                    encoder.write_signed(i);
                } else if let Some(f) = n.as_f64() {
                    encoder.write_float(f);
                }
            }
            Value::String(s) => encoder.write_text(s),
            Value::Array(items) => items.as_slice().encode(encoder),
            Value::Object(map) => encoder.write_map(map.iter()),
        }
    }
}
