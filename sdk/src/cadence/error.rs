//! Errors for the typed-value codec.

use thiserror::Error;

use super::types::TypeTag;
use crate::address::AddressError;

/// Errors raised when a wire value or a typed value cannot be decoded.
///
/// Every variant is local to the one value being decoded; callers can reject
/// it and carry on with the rest of their input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The input is not parseable JSON at all.
    #[error("malformed JSON: {0}")]
    Json(String),

    /// The `type` field names no known kind.
    #[error("unknown type tag: {tag}")]
    UnknownType { tag: String },

    /// A required object member is absent.
    #[error("{context}: missing field `{field}`")]
    MissingField {
        context: &'static str,
        field: &'static str,
    },

    /// The payload does not have the shape the tag requires.
    #[error("{tag}: expected {expected}")]
    InvalidShape {
        tag: &'static str,
        expected: &'static str,
    },

    /// An integer payload is not a decimal-digit string.
    #[error("{tag}: invalid integer literal {literal:?}")]
    InvalidInteger { tag: TypeTag, literal: String },

    /// An integer payload does not fit the width its tag declares.
    #[error("{tag}: value {literal} out of range")]
    OutOfRange { tag: TypeTag, literal: String },

    /// A fixed-point payload is malformed or would lose precision.
    #[error("{tag}: invalid fixed-point literal {literal:?}: {reason}")]
    InvalidFixedPoint {
        tag: TypeTag,
        literal: String,
        reason: &'static str,
    },

    /// A `Character` payload is not exactly one character.
    #[error("invalid character literal {literal:?}")]
    InvalidCharacter { literal: String },

    #[error(transparent)]
    InvalidAddress(#[from] AddressError),

    /// Two fields of one composite share a name.
    #[error("composite {id}: duplicate field `{name}`")]
    DuplicateField { id: String, name: String },

    /// Two dictionary entries lower to the same host key.
    #[error("dictionary: duplicate key {key}")]
    DuplicateKey { key: String },

    /// Dictionary keys do not all carry the first key's tag.
    #[error("dictionary: key of type {found} after keys of type {expected}")]
    HeterogeneousKeys { expected: TypeTag, found: TypeTag },

    /// The key kind has no host map representation.
    #[error("dictionary: unsupported key type {tag}")]
    UnsupportedKey { tag: TypeTag },

    /// A typed value was asked to lower into an incompatible host type.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: TypeTag,
    },

    /// Every numeric candidate failed to fit the requested width.
    #[error("value {value} does not fit in {target}")]
    NumericOverflow { target: &'static str, value: String },

    /// No numeric candidate could be derived from the value at all.
    #[error("{found} has no numeric representation")]
    NotNumeric { found: TypeTag },
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
