//! The typed value model.
//!
//! [`Value`] is a closed sum type: one variant per ledger kind, each holding
//! exactly the payload its tag implies. Adding a kind means adding a variant,
//! and the compiler then points at every `match` that needs updating.

use num_bigint::{BigInt, BigUint};
use std::fmt;
use std::str::FromStr;

use super::error::DecodeError;
use super::types::TypeTag;
use crate::address::Address;
use crate::config::{FIX64_DECIMALS, FIX64_SCALE};

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A ledger value together with its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Void,
    Optional(Option<Box<Value>>),
    Bool(bool),
    String(String),
    /// A single user-perceived character. May span several code points.
    Character(String),
    Address(Address),
    Int(BigInt),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Int128(i128),
    /// Must lie within the signed 256-bit range; see [`Value::int256`].
    Int256(BigInt),
    UInt(BigUint),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    UInt128(u128),
    /// Must fit in 256 bits; see [`Value::uint256`].
    UInt256(BigUint),
    Word8(u8),
    Word16(u16),
    Word32(u32),
    Word64(u64),
    Fix64(Fix64),
    UFix64(UFix64),
    Array(Vec<Value>),
    /// Entries in insertion order.
    Dictionary(Vec<DictionaryEntry>),
    Struct(Composite),
    Resource(Composite),
    Event(Composite),
    Contract(Composite),
    Enum(Composite),
    Path(Path),
    Capability(Capability),
    Type(TypeValue),
    Reference(Reference),
}

impl Value {
    /// The tag this value is written with on the wire.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Self::Void => TypeTag::Void,
            Self::Optional(_) => TypeTag::Optional,
            Self::Bool(_) => TypeTag::Bool,
            Self::String(_) => TypeTag::String,
            Self::Character(_) => TypeTag::Character,
            Self::Address(_) => TypeTag::Address,
            Self::Int(_) => TypeTag::Int,
            Self::Int8(_) => TypeTag::Int8,
            Self::Int16(_) => TypeTag::Int16,
            Self::Int32(_) => TypeTag::Int32,
            Self::Int64(_) => TypeTag::Int64,
            Self::Int128(_) => TypeTag::Int128,
            Self::Int256(_) => TypeTag::Int256,
            Self::UInt(_) => TypeTag::UInt,
            Self::UInt8(_) => TypeTag::UInt8,
            Self::UInt16(_) => TypeTag::UInt16,
            Self::UInt32(_) => TypeTag::UInt32,
            Self::UInt64(_) => TypeTag::UInt64,
            Self::UInt128(_) => TypeTag::UInt128,
            Self::UInt256(_) => TypeTag::UInt256,
            Self::Word8(_) => TypeTag::Word8,
            Self::Word16(_) => TypeTag::Word16,
            Self::Word32(_) => TypeTag::Word32,
            Self::Word64(_) => TypeTag::Word64,
            Self::Fix64(_) => TypeTag::Fix64,
            Self::UFix64(_) => TypeTag::UFix64,
            Self::Array(_) => TypeTag::Array,
            Self::Dictionary(_) => TypeTag::Dictionary,
            Self::Struct(_) => TypeTag::Struct,
            Self::Resource(_) => TypeTag::Resource,
            Self::Event(_) => TypeTag::Event,
            Self::Contract(_) => TypeTag::Contract,
            Self::Enum(_) => TypeTag::Enum,
            Self::Path(_) => TypeTag::Path,
            Self::Capability(_) => TypeTag::Capability,
            Self::Type(_) => TypeTag::Type,
            Self::Reference(_) => TypeTag::Reference,
        }
    }

    /// `Some(v)` wrapped as an optional.
    pub fn some(value: Value) -> Self {
        Self::Optional(Some(Box::new(value)))
    }

    /// The absent optional.
    pub fn none() -> Self {
        Self::Optional(None)
    }

    /// A character value. Fails unless `text` is exactly one `char`.
    ///
    /// Multi-code-point grapheme clusters arriving from the wire are
    /// accepted by the decoder as-is; this constructor is the strict path
    /// for values built locally.
    pub fn character(text: &str) -> Result<Self, DecodeError> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(_), None) => Ok(Self::Character(text.to_string())),
            _ => Err(DecodeError::InvalidCharacter {
                literal: text.to_string(),
            }),
        }
    }

    /// A range-checked `Int256`.
    pub fn int256(value: BigInt) -> Result<Self, DecodeError> {
        if fits_signed_bits(&value, 256) {
            Ok(Self::Int256(value))
        } else {
            Err(DecodeError::OutOfRange {
                tag: TypeTag::Int256,
                literal: value.to_string(),
            })
        }
    }

    /// A range-checked `UInt256`.
    pub fn uint256(value: BigUint) -> Result<Self, DecodeError> {
        if value.bits() <= 256 {
            Ok(Self::UInt256(value))
        } else {
            Err(DecodeError::OutOfRange {
                tag: TypeTag::UInt256,
                literal: value.to_string(),
            })
        }
    }

    /// The exact integer carried by any integer kind, `None` otherwise.
    pub fn as_big_int(&self) -> Option<BigInt> {
        let value = match self {
            Self::Int(v) | Self::Int256(v) => v.clone(),
            Self::Int8(v) => BigInt::from(*v),
            Self::Int16(v) => BigInt::from(*v),
            Self::Int32(v) => BigInt::from(*v),
            Self::Int64(v) => BigInt::from(*v),
            Self::Int128(v) => BigInt::from(*v),
            Self::UInt(v) | Self::UInt256(v) => BigInt::from(v.clone()),
            Self::UInt8(v) | Self::Word8(v) => BigInt::from(*v),
            Self::UInt16(v) | Self::Word16(v) => BigInt::from(*v),
            Self::UInt32(v) | Self::Word32(v) => BigInt::from(*v),
            Self::UInt64(v) | Self::Word64(v) => BigInt::from(*v),
            Self::UInt128(v) => BigInt::from(*v),
            _ => return None,
        };
        Some(value)
    }
}

pub(crate) fn fits_signed_bits(value: &BigInt, bits: u64) -> bool {
    let limit = BigInt::from(1u8) << (bits - 1);
    let min = -limit.clone();
    *value >= min && *value < limit
}

// ---------------------------------------------------------------------------
// Nested records
// ---------------------------------------------------------------------------

/// One `key => value` pair of a dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    pub key: Value,
    pub value: Value,
}

impl DictionaryEntry {
    pub fn new(key: impl Into<Value>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A named field of a composite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: Value,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The shared payload of struct, resource, event, contract and enum values:
/// a fully-qualified type identifier and the fields in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composite {
    pub id: String,
    pub fields: Vec<Field>,
}

impl Composite {
    pub fn new(id: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// The first field with the given name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }
}

/// A storage path such as `/storage/flowTokenVault`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path {
    pub domain: String,
    pub identifier: String,
}

impl Path {
    pub fn new(domain: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            identifier: identifier.into(),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.domain, self.identifier)
    }
}

/// A capability to a path in some account's storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    pub path: Path,
    pub address: Address,
    pub borrow_type: String,
}

/// A run-time type value, identified by its type id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeValue {
    pub static_type: String,
}

/// A reference into an account, identified by its type id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub address: Address,
    pub type_id: String,
}

// ---------------------------------------------------------------------------
// Fixed point
// ---------------------------------------------------------------------------

/// Signed 64-bit fixed-point number with 8 fractional decimal digits.
///
/// Stored as the raw scaled integer: `Fix64::from_raw(150_000_000)` is 1.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fix64(i64);

/// Unsigned 64-bit fixed-point number with 8 fractional decimal digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UFix64(u64);

impl Fix64 {
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> i64 {
        self.0
    }

    /// `Some(n)` if the value is a whole number.
    pub fn whole(&self) -> Option<i64> {
        (self.0 % FIX64_SCALE as i64 == 0).then(|| self.0 / FIX64_SCALE as i64)
    }
}

impl UFix64 {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }

    pub fn whole(&self) -> Option<u64> {
        (self.0 % FIX64_SCALE == 0).then(|| self.0 / FIX64_SCALE)
    }
}

/// Reasons a decimal literal is rejected, shared by both fixed-point kinds.
fn parse_decimal(literal: &str, tag: TypeTag) -> Result<(bool, i128), DecodeError> {
    let invalid = |reason| DecodeError::InvalidFixedPoint {
        tag,
        literal: literal.to_string(),
        reason,
    };

    let (negative, body) = match literal.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, literal),
    };
    let (whole, frac) = match body.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (body, None),
    };

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("integer part must be decimal digits"));
    }
    let frac = match frac {
        Some(f) if f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit()) => {
            return Err(invalid("fractional part must be decimal digits"));
        }
        Some(f) if f.len() > FIX64_DECIMALS as usize => {
            return Err(invalid("more than 8 fractional digits"));
        }
        Some(f) => f,
        None => "",
    };

    let whole: i128 = whole.parse().map_err(|_| invalid("integer part too large"))?;
    let padded = format!("{:0<width$}", frac, width = FIX64_DECIMALS as usize);
    let frac: i128 = padded.parse().map_err(|_| invalid("invalid fraction"))?;

    let raw = whole
        .checked_mul(FIX64_SCALE as i128)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| invalid("integer part too large"))?;
    Ok((negative, raw))
}

fn format_decimal(negative: bool, magnitude: u128, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let scale = FIX64_SCALE as u128;
    write!(
        f,
        "{}{}.{:0width$}",
        if negative { "-" } else { "" },
        magnitude / scale,
        magnitude % scale,
        width = FIX64_DECIMALS as usize
    )
}

impl FromStr for Fix64 {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, magnitude) = parse_decimal(s, TypeTag::Fix64)?;
        let raw = if negative { -magnitude } else { magnitude };
        i64::try_from(raw)
            .map(Self)
            .map_err(|_| DecodeError::OutOfRange {
                tag: TypeTag::Fix64,
                literal: s.to_string(),
            })
    }
}

impl FromStr for UFix64 {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, magnitude) = parse_decimal(s, TypeTag::UFix64)?;
        if negative && magnitude != 0 {
            return Err(DecodeError::OutOfRange {
                tag: TypeTag::UFix64,
                literal: s.to_string(),
            });
        }
        u64::try_from(magnitude)
            .map(Self)
            .map_err(|_| DecodeError::OutOfRange {
                tag: TypeTag::UFix64,
                literal: s.to_string(),
            })
    }
}

impl fmt::Display for Fix64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_decimal(self.0 < 0, self.0.unsigned_abs() as u128, f)
    }
}

impl fmt::Display for UFix64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_decimal(false, self.0 as u128, f)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
