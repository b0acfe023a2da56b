//! # Canonical Binary Serializer
//!
//! A minimal RLP encoder. Every byte a signer ever sees passes through
//! [`encode`], so the rules here are fixed:
//!
//! - a single byte `<= 0x7f` encodes as itself;
//! - a byte string shorter than 56 bytes gets the header `0x80 + len`;
//! - a longer byte string gets `0xb7 + len_of_len` followed by the
//!   big-endian length;
//! - lists follow the same two tiers with bases `0xc0` and `0xf7`;
//! - integers become their minimal big-endian bytes first, so zero is the
//!   empty string (`0x80`), never `0x00`.
//!
//! Text is encoded as its UTF-8 bytes. Nothing in this layer guesses that a
//! string is hex; callers decode hex before building an [`RlpItem`].
//!
//! The item tree and integer normalisation live here; the header and
//! byte-string framing is `alloy_rlp`'s. Only encoding is provided. The SDK
//! never needs to read RLP back.

use alloy_rlp::{Encodable, Header};
use num_bigint::{BigInt, Sign};
use thiserror::Error;

/// Errors raised while encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The format has no representation for negative integers.
    #[error("cannot encode negative integer {value}")]
    NegativeInteger { value: BigInt },
}

/// A node in an RLP tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlpItem {
    /// Raw bytes, encoded verbatim.
    Bytes(Vec<u8>),
    /// UTF-8 text, encoded as its bytes.
    Text(String),
    /// An integer. Must be non-negative to encode.
    Integer(BigInt),
    /// An ordered list of child nodes.
    List(Vec<RlpItem>),
}

impl RlpItem {
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(data.into())
    }

    pub fn uint(value: u64) -> Self {
        Self::Integer(BigInt::from(value))
    }

    pub fn list(items: impl IntoIterator<Item = RlpItem>) -> Self {
        Self::List(items.into_iter().collect())
    }
}

impl From<u64> for RlpItem {
    fn from(value: u64) -> Self {
        Self::uint(value)
    }
}

impl From<u32> for RlpItem {
    fn from(value: u32) -> Self {
        Self::uint(u64::from(value))
    }
}

impl From<BigInt> for RlpItem {
    fn from(value: BigInt) -> Self {
        Self::Integer(value)
    }
}

impl From<Vec<u8>> for RlpItem {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<&[u8]> for RlpItem {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl From<&str> for RlpItem {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RlpItem {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<RlpItem>> for RlpItem {
    fn from(value: Vec<RlpItem>) -> Self {
        Self::List(value)
    }
}

/// Encodes an item tree into its canonical bytes.
pub fn encode(item: &RlpItem) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    encode_into(item, &mut out)?;
    Ok(out)
}

/// Encodes a sequence of items as one list. Equivalent to
/// `encode(&RlpItem::List(items.to_vec()))` without the clone.
pub fn encode_list(items: &[RlpItem]) -> Result<Vec<u8>, EncodeError> {
    let payload = encode_children(items)?;
    let mut out = Vec::with_capacity(payload.len() + 9);
    write_list(&payload, &mut out);
    Ok(out)
}

fn encode_into(item: &RlpItem, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    match item {
        RlpItem::Bytes(bytes) => bytes.as_slice().encode(out),
        RlpItem::Text(text) => text.as_bytes().encode(out),
        RlpItem::Integer(value) => integer_bytes(value)?.as_slice().encode(out),
        RlpItem::List(items) => write_list(&encode_children(items)?, out),
    }
    Ok(())
}

fn encode_children(items: &[RlpItem]) -> Result<Vec<u8>, EncodeError> {
    let mut payload = Vec::new();
    for child in items {
        encode_into(child, &mut payload)?;
    }
    Ok(payload)
}

fn write_list(payload: &[u8], out: &mut Vec<u8>) {
    Header {
        list: true,
        payload_length: payload.len(),
    }
    .encode(out);
    out.extend_from_slice(payload);
}

fn integer_bytes(value: &BigInt) -> Result<Vec<u8>, EncodeError> {
    match value.sign() {
        Sign::Minus => Err(EncodeError::NegativeInteger {
            value: value.clone(),
        }),
        Sign::NoSign => Ok(Vec::new()),
        Sign::Plus => Ok(value.magnitude().to_bytes_be()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
