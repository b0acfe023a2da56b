//! Conversions between typed values and host (Rust) values.
//!
//! Three directions live here:
//!
//! - [`Value::to_native`] lowers any value into the dynamic [`NativeValue`]
//!   tree.
//! - [`FromValue`] lowers into a concrete Rust type chosen by the caller.
//! - `From<T> for Value` lifts host values. Each host type maps to exactly
//!   one kind; `Word*`, `Int256`, `UInt256`, composites and the record kinds
//!   have no host counterpart and must be built explicitly.
//!
//! [`decode_flexible`] sits beside them: it coerces any numeric-looking value
//! into a requested integer width, trying candidate representations in a
//! caller-supplied order.

use num_bigint::{BigInt, BigUint};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use super::error::DecodeError;
use super::types::TypeTag;
use super::value::{Capability, DictionaryEntry, Fix64, Path, Reference, UFix64, Value};
use crate::address::Address;
use crate::config::SdkConfig;

// ---------------------------------------------------------------------------
// NativeValue
// ---------------------------------------------------------------------------

/// A value lowered into host primitives and collections.
///
/// Every integer kind collapses into [`NativeValue::Integer`]; composites
/// collapse into a name-to-value map and lose their field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeValue {
    /// `Void`.
    Unit,
    /// An absent optional.
    Null,
    Bool(bool),
    Integer(BigInt),
    Fix64(Fix64),
    UFix64(UFix64),
    /// `String` and `Character` both lower to text.
    Text(String),
    Address(Address),
    Array(Vec<NativeValue>),
    Map(NativeMap),
    Record(NativeRecord),
    Path(Path),
    Capability(Capability),
    /// The type id of a `Type` value.
    Type(String),
    Reference(Reference),
}

/// A lowered dictionary, grouped by the host type of its keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeMap {
    /// An empty dictionary commits to no key type.
    Empty,
    Integer(BTreeMap<BigInt, NativeValue>),
    Text(BTreeMap<String, NativeValue>),
    Bool(BTreeMap<bool, NativeValue>),
    Address(BTreeMap<Address, NativeValue>),
    Path(BTreeMap<Path, NativeValue>),
}

impl NativeMap {
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Integer(m) => m.len(),
            Self::Text(m) => m.len(),
            Self::Bool(m) => m.len(),
            Self::Address(m) => m.len(),
            Self::Path(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A lowered composite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeRecord {
    /// Which composite kind this came from.
    pub kind: TypeTag,
    pub id: String,
    pub fields: BTreeMap<String, NativeValue>,
}

impl Value {
    /// Recursively lowers this value into host primitives.
    ///
    /// Fails on composites with duplicate field names, on dictionaries whose
    /// keys do not all share the first key's tag, on duplicate keys, and on
    /// key kinds that have no ordered host representation.
    pub fn to_native(&self) -> Result<NativeValue, DecodeError> {
        let native = match self {
            Self::Void => NativeValue::Unit,
            Self::Optional(None) => NativeValue::Null,
            Self::Optional(Some(inner)) => inner.to_native()?,
            Self::Bool(b) => NativeValue::Bool(*b),
            Self::String(s) | Self::Character(s) => NativeValue::Text(s.clone()),
            Self::Address(a) => NativeValue::Address(*a),
            Self::Fix64(v) => NativeValue::Fix64(*v),
            Self::UFix64(v) => NativeValue::UFix64(*v),
            Self::Array(items) => NativeValue::Array(
                items
                    .iter()
                    .map(Value::to_native)
                    .collect::<Result<_, _>>()?,
            ),
            Self::Dictionary(entries) => NativeValue::Map(lower_dictionary(entries)?),
            Self::Struct(c)
            | Self::Resource(c)
            | Self::Event(c)
            | Self::Contract(c)
            | Self::Enum(c) => {
                let mut fields = BTreeMap::new();
                for field in &c.fields {
                    if fields
                        .insert(field.name.clone(), field.value.to_native()?)
                        .is_some()
                    {
                        return Err(DecodeError::DuplicateField {
                            id: c.id.clone(),
                            name: field.name.clone(),
                        });
                    }
                }
                NativeValue::Record(NativeRecord {
                    kind: self.type_tag(),
                    id: c.id.clone(),
                    fields,
                })
            }
            Self::Path(p) => NativeValue::Path(p.clone()),
            Self::Capability(c) => NativeValue::Capability(c.clone()),
            Self::Type(t) => NativeValue::Type(t.static_type.clone()),
            Self::Reference(r) => NativeValue::Reference(r.clone()),
            Self::Int(v) | Self::Int256(v) => NativeValue::Integer(v.clone()),
            Self::UInt(v) | Self::UInt256(v) => NativeValue::Integer(BigInt::from(v.clone())),
            Self::Int8(v) => NativeValue::Integer(BigInt::from(*v)),
            Self::Int16(v) => NativeValue::Integer(BigInt::from(*v)),
            Self::Int32(v) => NativeValue::Integer(BigInt::from(*v)),
            Self::Int64(v) => NativeValue::Integer(BigInt::from(*v)),
            Self::Int128(v) => NativeValue::Integer(BigInt::from(*v)),
            Self::UInt8(v) | Self::Word8(v) => NativeValue::Integer(BigInt::from(*v)),
            Self::UInt16(v) | Self::Word16(v) => NativeValue::Integer(BigInt::from(*v)),
            Self::UInt32(v) | Self::Word32(v) => NativeValue::Integer(BigInt::from(*v)),
            Self::UInt64(v) | Self::Word64(v) => NativeValue::Integer(BigInt::from(*v)),
            Self::UInt128(v) => NativeValue::Integer(BigInt::from(*v)),
        };
        Ok(native)
    }

    /// Lowers into a concrete host type.
    pub fn decode<T: FromValue>(&self) -> Result<T, DecodeError> {
        T::from_value(self)
    }
}

/// Lowers every key first, then groups the values under the host key type
/// implied by the first key's tag.
fn lower_dictionary(entries: &[DictionaryEntry]) -> Result<NativeMap, DecodeError> {
    let Some(first) = entries.first() else {
        return Ok(NativeMap::Empty);
    };
    let key_tag = first.key.type_tag();
    for entry in entries {
        let found = entry.key.type_tag();
        if found != key_tag {
            return Err(DecodeError::HeterogeneousKeys {
                expected: key_tag,
                found,
            });
        }
    }

    if key_tag.is_integer() {
        return group(entries, |k| k.as_big_int()).map(NativeMap::Integer);
    }
    match key_tag {
        TypeTag::String | TypeTag::Character => group(entries, |k| match k {
            Value::String(s) | Value::Character(s) => Some(s.clone()),
            _ => None,
        })
        .map(NativeMap::Text),
        TypeTag::Bool => group(entries, |k| match k {
            Value::Bool(b) => Some(*b),
            _ => None,
        })
        .map(NativeMap::Bool),
        TypeTag::Address => group(entries, |k| match k {
            Value::Address(a) => Some(*a),
            _ => None,
        })
        .map(NativeMap::Address),
        TypeTag::Path => group(entries, |k| match k {
            Value::Path(p) => Some(p.clone()),
            _ => None,
        })
        .map(NativeMap::Path),
        other => Err(DecodeError::UnsupportedKey { tag: other }),
    }
}

fn group<K, F>(
    entries: &[DictionaryEntry],
    key_of: F,
) -> Result<BTreeMap<K, NativeValue>, DecodeError>
where
    K: Ord + std::fmt::Debug,
    F: Fn(&Value) -> Option<K>,
{
    let keys = entries
        .iter()
        .map(|e| {
            key_of(&e.key).ok_or(DecodeError::UnsupportedKey {
                tag: e.key.type_tag(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut map = BTreeMap::new();
    for (key, entry) in keys.into_iter().zip(entries) {
        let rendered = format!("{key:?}");
        if map.insert(key, entry.value.to_native()?).is_some() {
            return Err(DecodeError::DuplicateKey { key: rendered });
        }
    }
    Ok(map)
}

// ---------------------------------------------------------------------------
// FromValue
// ---------------------------------------------------------------------------

/// Host types a [`Value`] can be lowered into.
///
/// Integer impls are strict: `u8` accepts only `UInt8` and `Word8`. Use
/// [`decode_flexible`] to coerce across kinds.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, DecodeError>;
}

fn mismatch(expected: &'static str, found: &Value) -> DecodeError {
    DecodeError::TypeMismatch {
        expected,
        found: found.type_tag(),
    }
}

macro_rules! from_value_exact {
    ($host:ty, $expected:literal, $($variant:ident),+) => {
        impl FromValue for $host {
            fn from_value(value: &Value) -> Result<Self, DecodeError> {
                match value {
                    $(Value::$variant(v) => Ok(v.clone()),)+
                    other => Err(mismatch($expected, other)),
                }
            }
        }
    };
}

from_value_exact!(i8, "Int8", Int8);
from_value_exact!(i16, "Int16", Int16);
from_value_exact!(i32, "Int32", Int32);
from_value_exact!(i64, "Int64", Int64);
from_value_exact!(i128, "Int128", Int128);
from_value_exact!(u8, "UInt8 or Word8", UInt8, Word8);
from_value_exact!(u16, "UInt16 or Word16", UInt16, Word16);
from_value_exact!(u32, "UInt32 or Word32", UInt32, Word32);
from_value_exact!(u64, "UInt64 or Word64", UInt64, Word64);
from_value_exact!(u128, "UInt128", UInt128);
from_value_exact!(bool, "Bool", Bool);
from_value_exact!(String, "String or Character", String, Character);
from_value_exact!(Address, "Address", Address);
from_value_exact!(Fix64, "Fix64", Fix64);
from_value_exact!(UFix64, "UFix64", UFix64);
from_value_exact!(Path, "Path", Path);
from_value_exact!(Capability, "Capability", Capability);

impl FromValue for BigInt {
    /// Any integer kind; the conversion is always lossless.
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        value.as_big_int().ok_or_else(|| mismatch("an integer", value))
    }
}

impl FromValue for BigUint {
    /// Any unsigned or word kind.
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::UInt(v) | Value::UInt256(v) => Ok(v.clone()),
            Value::UInt8(_)
            | Value::UInt16(_)
            | Value::UInt32(_)
            | Value::UInt64(_)
            | Value::UInt128(_)
            | Value::Word8(_)
            | Value::Word16(_)
            | Value::Word32(_)
            | Value::Word64(_) => value
                .as_big_int()
                .and_then(|v| v.to_biguint())
                .ok_or_else(|| mismatch("an unsigned integer", value)),
            other => Err(mismatch("an unsigned integer", other)),
        }
    }
}

impl FromValue for () {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::Void => Ok(()),
            other => Err(mismatch("Void", other)),
        }
    }
}

impl FromValue for NativeValue {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        value.to_native()
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::Optional(None) => Ok(None),
            Value::Optional(Some(inner)) => T::from_value(inner).map(Some),
            other => Err(mismatch("Optional", other)),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::Array(items) => items.iter().map(T::from_value).collect(),
            other => Err(mismatch("Array", other)),
        }
    }
}

impl<K, V> FromValue for BTreeMap<K, V>
where
    K: FromValue + Ord + std::fmt::Debug,
    V: FromValue,
{
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let entries = dictionary_entries(value)?;
        let mut map = BTreeMap::new();
        for entry in entries {
            let key = K::from_value(&entry.key)?;
            let rendered = format!("{key:?}");
            if map.insert(key, V::from_value(&entry.value)?).is_some() {
                return Err(DecodeError::DuplicateKey { key: rendered });
            }
        }
        Ok(map)
    }
}

impl<K, V> FromValue for HashMap<K, V>
where
    K: FromValue + Eq + Hash + std::fmt::Debug,
    V: FromValue,
{
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let entries = dictionary_entries(value)?;
        let mut map = HashMap::with_capacity(entries.len());
        for entry in entries {
            let key = K::from_value(&entry.key)?;
            let rendered = format!("{key:?}");
            if map.insert(key, V::from_value(&entry.value)?).is_some() {
                return Err(DecodeError::DuplicateKey { key: rendered });
            }
        }
        Ok(map)
    }
}

fn dictionary_entries(value: &Value) -> Result<&[DictionaryEntry], DecodeError> {
    match value {
        Value::Dictionary(entries) => Ok(entries),
        other => Err(mismatch("Dictionary", other)),
    }
}

// ---------------------------------------------------------------------------
// Host -> Value
// ---------------------------------------------------------------------------

macro_rules! value_from_host {
    ($($host:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$host> for Value {
                fn from(v: $host) -> Self {
                    Value::$variant(v)
                }
            }
        )+
    };
}

value_from_host! {
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    i128 => Int128,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    u128 => UInt128,
    BigInt => Int,
    BigUint => UInt,
    bool => Bool,
    String => String,
    Address => Address,
    Fix64 => Fix64,
    UFix64 => UFix64,
    Path => Path,
    Capability => Capability,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Character(v.to_string())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Void
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        Value::Optional(v.map(|inner| Box::new(inner.into())))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

/// Ordered maps become dictionaries in key order. Unordered maps are not
/// supported: their iteration order would leak into signed bytes.
impl<K: Into<Value>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(v: BTreeMap<K, V>) -> Self {
        Value::Dictionary(
            v.into_iter()
                .map(|(key, value)| DictionaryEntry::new(key, value))
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// Flexible numeric decoding
// ---------------------------------------------------------------------------

/// A representation [`decode_flexible`] may read a number from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericSource {
    /// Any integer kind, read exactly.
    Integer,
    /// A `Fix64`/`UFix64` with no fractional part.
    FixedPoint,
    /// A `String` holding a decimal integer literal.
    Text,
}

impl NumericSource {
    fn candidate(&self, value: &Value) -> Option<BigInt> {
        match self {
            Self::Integer => value.as_big_int(),
            Self::FixedPoint => match value {
                Value::Fix64(v) => v.whole().map(BigInt::from),
                Value::UFix64(v) => v.whole().map(BigInt::from),
                _ => None,
            },
            Self::Text => match value {
                Value::String(s) => {
                    let digits = s.strip_prefix('-').unwrap_or(s);
                    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                        return None;
                    }
                    s.parse().ok()
                }
                _ => None,
            },
        }
    }
}

/// Coerces a numeric value into the integer type `T`.
///
/// Sources are tried in `priority` order. The first source that yields a
/// candidate which also fits `T` without loss wins. A value carries at most
/// one representation per source, so two sources never disagree about the
/// same value; the order decides which representations are acceptable at
/// all (a source missing from `priority` is never consulted).
///
/// Fails with [`DecodeError::NumericOverflow`] when a candidate exists but
/// does not fit, and with [`DecodeError::NotNumeric`] when no source yields
/// a candidate.
pub fn decode_flexible<T>(value: &Value, priority: &[NumericSource]) -> Result<T, DecodeError>
where
    T: TryFrom<BigInt>,
{
    let mut rejected: Option<BigInt> = None;
    for source in priority {
        if let Some(candidate) = source.candidate(value) {
            let literal = candidate.clone();
            match T::try_from(candidate) {
                Ok(v) => return Ok(v),
                Err(_) => rejected = Some(literal),
            }
        }
    }
    match rejected {
        Some(v) => Err(DecodeError::NumericOverflow {
            target: std::any::type_name::<T>(),
            value: v.to_string(),
        }),
        None => Err(DecodeError::NotNumeric {
            found: value.type_tag(),
        }),
    }
}

impl Value {
    /// [`decode_flexible`] with the source priority carried by `config`.
    pub fn decode_numeric<T>(&self, config: &SdkConfig) -> Result<T, DecodeError>
    where
        T: TryFrom<BigInt>,
    {
        decode_flexible(self, &config.numeric_priority)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cadence::value::{Composite, Field};
    use crate::config::{DEFAULT_NUMERIC_PRIORITY, FIX64_SCALE};

    fn ufix64_from_units(units: u64) -> Option<UFix64> {
        units.checked_mul(FIX64_SCALE).map(UFix64::from_raw)
    }

    #[test]
    fn scalars_lower_to_primitives() {
        assert_eq!(Value::Void.to_native().unwrap(), NativeValue::Unit);
        assert_eq!(Value::none().to_native().unwrap(), NativeValue::Null);
        assert_eq!(
            Value::some(Value::Bool(true)).to_native().unwrap(),
            NativeValue::Bool(true)
        );
        assert_eq!(
            Value::Word32(9).to_native().unwrap(),
            NativeValue::Integer(BigInt::from(9))
        );
        assert_eq!(
            Value::Character("x".into()).to_native().unwrap(),
            NativeValue::Text("x".into())
        );
    }

    #[test]
    fn composite_lowers_to_record() {
        let value = Value::Resource(Composite::new(
            "A.1.NFT.NFT",
            vec![
                Field::new("id", Value::UInt64(42)),
                Field::new("name", Value::String("kitty".into())),
            ],
        ));
        let NativeValue::Record(record) = value.to_native().unwrap() else {
            panic!("expected a record");
        };
        assert_eq!(record.kind, TypeTag::Resource);
        assert_eq!(record.id, "A.1.NFT.NFT");
        assert_eq!(record.fields["id"], NativeValue::Integer(BigInt::from(42)));
        assert_eq!(record.fields.len(), 2);
    }

    #[test]
    fn duplicate_field_names_fail() {
        let value = Value::Struct(Composite::new(
            "S.x",
            vec![Field::new("a", Value::Int8(1)), Field::new("a", Value::Int8(2))],
        ));
        assert_eq!(
            value.to_native().unwrap_err(),
            DecodeError::DuplicateField {
                id: "S.x".into(),
                name: "a".into()
            }
        );
    }

    #[test]
    fn dictionary_groups_by_first_key_type() {
        let value = Value::Dictionary(vec![
            DictionaryEntry::new(Value::String("b".into()), Value::Int8(2)),
            DictionaryEntry::new(Value::String("a".into()), Value::Int8(1)),
        ]);
        let NativeValue::Map(NativeMap::Text(map)) = value.to_native().unwrap() else {
            panic!("expected a text-keyed map");
        };
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], NativeValue::Integer(BigInt::from(1)));
    }

    #[test]
    fn integer_keyed_dictionary() {
        let value = Value::Dictionary(vec![
            DictionaryEntry::new(Value::UInt64(10), Value::Bool(true)),
            DictionaryEntry::new(Value::UInt64(5), Value::Bool(false)),
        ]);
        let NativeValue::Map(NativeMap::Integer(map)) = value.to_native().unwrap() else {
            panic!("expected an integer-keyed map");
        };
        assert_eq!(map.keys().cloned().collect::<Vec<_>>(), vec![
            BigInt::from(5),
            BigInt::from(10)
        ]);
    }

    #[test]
    fn empty_dictionary_has_no_key_type() {
        assert_eq!(
            Value::Dictionary(vec![]).to_native().unwrap(),
            NativeValue::Map(NativeMap::Empty)
        );
    }

    #[test]
    fn heterogeneous_keys_fail() {
        let value = Value::Dictionary(vec![
            DictionaryEntry::new(Value::String("a".into()), Value::Int8(1)),
            DictionaryEntry::new(Value::UInt8(1), Value::Int8(2)),
        ]);
        assert_eq!(
            value.to_native().unwrap_err(),
            DecodeError::HeterogeneousKeys {
                expected: TypeTag::String,
                found: TypeTag::UInt8
            }
        );
    }

    #[test]
    fn duplicate_keys_fail() {
        let value = Value::Dictionary(vec![
            DictionaryEntry::new(Value::Bool(true), Value::Int8(1)),
            DictionaryEntry::new(Value::Bool(true), Value::Int8(2)),
        ]);
        assert!(matches!(
            value.to_native(),
            Err(DecodeError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn unsupported_key_kind_fails() {
        let value = Value::Dictionary(vec![DictionaryEntry::new(
            Value::UFix64(UFix64::from_raw(1)),
            Value::Int8(1),
        )]);
        assert_eq!(
            value.to_native().unwrap_err(),
            DecodeError::UnsupportedKey {
                tag: TypeTag::UFix64
            }
        );
    }

    #[test]
    fn typed_decode_is_strict() {
        assert_eq!(Value::UInt8(5).decode::<u8>().unwrap(), 5);
        assert_eq!(Value::Word8(5).decode::<u8>().unwrap(), 5);
        assert!(Value::UInt16(5).decode::<u8>().is_err());
        assert!(Value::Int8(5).decode::<u8>().is_err());
    }

    #[test]
    fn typed_decode_collections() {
        let value = Value::Array(vec![Value::some(Value::Int32(1)), Value::none()]);
        let decoded: Vec<Option<i32>> = value.decode().unwrap();
        assert_eq!(decoded, vec![Some(1), None]);

        let dict = Value::Dictionary(vec![DictionaryEntry::new("k", Value::UInt64(1))]);
        let map: HashMap<String, u64> = dict.decode().unwrap();
        assert_eq!(map["k"], 1);
    }

    #[test]
    fn big_integers_accept_any_matching_kind() {
        assert_eq!(
            Value::Int8(-3).decode::<BigInt>().unwrap(),
            BigInt::from(-3)
        );
        assert_eq!(
            Value::Word64(3).decode::<BigUint>().unwrap(),
            BigUint::from(3u8)
        );
        assert!(Value::Int8(3).decode::<BigUint>().is_err());
    }

    #[test]
    fn host_values_lift_to_one_kind() {
        assert_eq!(Value::from(7u8), Value::UInt8(7));
        assert_eq!(Value::from(-7i64), Value::Int64(-7));
        assert_eq!(Value::from("hi"), Value::String("hi".into()));
        assert_eq!(Value::from('c'), Value::Character("c".into()));
        assert_eq!(Value::from(()), Value::Void);
        assert_eq!(Value::from(Some(true)), Value::some(Value::Bool(true)));
        assert_eq!(Value::from(None::<bool>), Value::none());
        assert_eq!(
            Value::from(vec![1u16, 2]),
            Value::Array(vec![Value::UInt16(1), Value::UInt16(2)])
        );
    }

    #[test]
    fn ordered_map_lifts_in_key_order() {
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), 2i32);
        map.insert("a".to_string(), 1i32);
        assert_eq!(
            Value::from(map),
            Value::Dictionary(vec![
                DictionaryEntry::new("a", 1i32),
                DictionaryEntry::new("b", 2i32),
            ])
        );
    }

    #[test]
    fn lift_then_lower_is_identity() {
        let original = vec![Some(1u64), None, Some(u64::MAX)];
        let value = Value::from(original.clone());
        assert_eq!(value.decode::<Vec<Option<u64>>>().unwrap(), original);
    }

    #[test]
    fn flexible_300_does_not_fit_u8() {
        let value = Value::UInt16(300);
        let err = decode_flexible::<u8>(&value, &DEFAULT_NUMERIC_PRIORITY).unwrap_err();
        assert_eq!(
            err,
            DecodeError::NumericOverflow {
                target: "u8",
                value: "300".into()
            }
        );
        assert_eq!(
            decode_flexible::<u16>(&value, &DEFAULT_NUMERIC_PRIORITY).unwrap(),
            300
        );
    }

    #[test]
    fn decode_numeric_follows_config_priority() {
        let text = Value::String("42".into());
        let config = SdkConfig::default();
        assert_eq!(text.decode_numeric::<u8>(&config).unwrap(), 42);

        let integers_only = SdkConfig {
            numeric_priority: vec![NumericSource::Integer],
            ..SdkConfig::default()
        };
        assert_eq!(
            text.decode_numeric::<u8>(&integers_only).unwrap_err(),
            DecodeError::NotNumeric {
                found: TypeTag::String
            }
        );
        assert_eq!(Value::Word8(7).decode_numeric::<u64>(&integers_only).unwrap(), 7);
    }

    #[test]
    fn flexible_reads_whole_fixed_point() {
        let value = Value::UFix64(ufix64_from_units(300).unwrap());
        assert_eq!(
            decode_flexible::<i32>(&value, &DEFAULT_NUMERIC_PRIORITY).unwrap(),
            300
        );
        let fractional = Value::UFix64(UFix64::from_raw(1));
        assert!(matches!(
            decode_flexible::<i32>(&fractional, &DEFAULT_NUMERIC_PRIORITY),
            Err(DecodeError::NotNumeric { .. })
        ));
    }

    #[test]
    fn flexible_reads_decimal_text() {
        let value = Value::String("-12".into());
        assert_eq!(
            decode_flexible::<i64>(&value, &DEFAULT_NUMERIC_PRIORITY).unwrap(),
            -12
        );
        assert!(decode_flexible::<u64>(&value, &DEFAULT_NUMERIC_PRIORITY).is_err());
    }

    #[test]
    fn flexible_respects_priority_membership() {
        let value = Value::String("5".into());
        assert!(matches!(
            decode_flexible::<u8>(&value, &[NumericSource::Integer]),
            Err(DecodeError::NotNumeric {
                found: TypeTag::String
            })
        ));
        assert_eq!(
            decode_flexible::<u8>(&value, &[NumericSource::Text]).unwrap(),
            5
        );
    }

    #[test]
    fn flexible_negative_into_unsigned_fails() {
        let value = Value::Int(BigInt::from(-1));
        assert!(matches!(
            decode_flexible::<u32>(&value, &DEFAULT_NUMERIC_PRIORITY),
            Err(DecodeError::NumericOverflow { .. })
        ));
    }

    #[test]
    fn flexible_into_big_int_never_overflows() {
        let huge = Value::UInt(BigUint::from(1u8) << 512u32);
        let v: BigInt = decode_flexible(&huge, &DEFAULT_NUMERIC_PRIORITY).unwrap();
        assert_eq!(v.bits(), 513);
    }
}
