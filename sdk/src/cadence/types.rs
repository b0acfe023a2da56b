//! Type tags for ledger values.
//!
//! Every [`Value`](super::Value) variant has exactly one tag, and every tag
//! has exactly one spelling on the wire.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::error::DecodeError;

/// The `type` discriminant of a wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    Void,
    Optional,
    Bool,
    String,
    Character,
    Address,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Int128,
    Int256,
    UInt,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    UInt128,
    UInt256,
    Word8,
    Word16,
    Word32,
    Word64,
    Fix64,
    UFix64,
    Array,
    Dictionary,
    Struct,
    Resource,
    Event,
    Contract,
    Enum,
    Path,
    Capability,
    Type,
    Reference,
}

impl TypeTag {
    /// Every tag, in declaration order.
    pub const ALL: [TypeTag; 37] = [
        TypeTag::Void,
        TypeTag::Optional,
        TypeTag::Bool,
        TypeTag::String,
        TypeTag::Character,
        TypeTag::Address,
        TypeTag::Int,
        TypeTag::Int8,
        TypeTag::Int16,
        TypeTag::Int32,
        TypeTag::Int64,
        TypeTag::Int128,
        TypeTag::Int256,
        TypeTag::UInt,
        TypeTag::UInt8,
        TypeTag::UInt16,
        TypeTag::UInt32,
        TypeTag::UInt64,
        TypeTag::UInt128,
        TypeTag::UInt256,
        TypeTag::Word8,
        TypeTag::Word16,
        TypeTag::Word32,
        TypeTag::Word64,
        TypeTag::Fix64,
        TypeTag::UFix64,
        TypeTag::Array,
        TypeTag::Dictionary,
        TypeTag::Struct,
        TypeTag::Resource,
        TypeTag::Event,
        TypeTag::Contract,
        TypeTag::Enum,
        TypeTag::Path,
        TypeTag::Capability,
        TypeTag::Type,
        TypeTag::Reference,
    ];

    /// The wire spelling of this tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Void => "Void",
            Self::Optional => "Optional",
            Self::Bool => "Bool",
            Self::String => "String",
            Self::Character => "Character",
            Self::Address => "Address",
            Self::Int => "Int",
            Self::Int8 => "Int8",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Int128 => "Int128",
            Self::Int256 => "Int256",
            Self::UInt => "UInt",
            Self::UInt8 => "UInt8",
            Self::UInt16 => "UInt16",
            Self::UInt32 => "UInt32",
            Self::UInt64 => "UInt64",
            Self::UInt128 => "UInt128",
            Self::UInt256 => "UInt256",
            Self::Word8 => "Word8",
            Self::Word16 => "Word16",
            Self::Word32 => "Word32",
            Self::Word64 => "Word64",
            Self::Fix64 => "Fix64",
            Self::UFix64 => "UFix64",
            Self::Array => "Array",
            Self::Dictionary => "Dictionary",
            Self::Struct => "Struct",
            Self::Resource => "Resource",
            Self::Event => "Event",
            Self::Contract => "Contract",
            Self::Enum => "Enum",
            Self::Path => "Path",
            Self::Capability => "Capability",
            Self::Type => "Type",
            Self::Reference => "Reference",
        }
    }

    /// `true` for every integer kind, fixed width or arbitrary precision.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Int
                | Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::Int128
                | Self::Int256
                | Self::UInt
                | Self::UInt8
                | Self::UInt16
                | Self::UInt32
                | Self::UInt64
                | Self::UInt128
                | Self::UInt256
                | Self::Word8
                | Self::Word16
                | Self::Word32
                | Self::Word64
        )
    }

    pub fn is_fixed_point(&self) -> bool {
        matches!(self, Self::Fix64 | Self::UFix64)
    }

    /// `true` for the five kinds sharing the `{id, fields}` payload.
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            Self::Struct | Self::Resource | Self::Event | Self::Contract | Self::Enum
        )
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| DecodeError::UnknownType { tag: s.to_string() })
    }
}

impl Serialize for TypeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TypeTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
