//! JSON interchange codec.
//!
//! Every value travels as `{"type": <tag>, "value": <payload>}`. Integers
//! and fixed-point numbers are decimal strings so that 64-bit and
//! arbitrary-precision kinds survive JSON parsers that only know `f64`.
//!
//! Encoding never fails. Decoding checks that the payload has exactly the
//! shape its tag requires and that numeric payloads fit their declared width.
//!
//! Object members are emitted in a fixed order (`type` before `value`,
//! `id` before `fields`, ...). The encoded bytes of a transaction argument
//! are signed, so this order is part of the format.

use num_bigint::{BigInt, BigUint};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value as Json};

use super::error::DecodeError;
use super::types::TypeTag;
use super::value::{
    Capability, Composite, DictionaryEntry, Field, Fix64, Path, Reference, TypeValue, UFix64,
    Value,
};
use crate::address::Address;

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

impl Value {
    /// Encodes this value as a wire JSON tree.
    pub fn to_json(&self) -> Json {
        let tag = self.type_tag().as_str();
        let payload = match self {
            Self::Void => return json!({ "type": tag }),
            Self::Optional(None) => Json::Null,
            Self::Optional(Some(inner)) => inner.to_json(),
            Self::Bool(b) => Json::Bool(*b),
            Self::String(s) | Self::Character(s) => Json::String(s.clone()),
            Self::Address(a) => Json::String(a.to_prefixed_hex()),
            Self::Int(v) | Self::Int256(v) => Json::String(v.to_string()),
            Self::Int8(v) => Json::String(v.to_string()),
            Self::Int16(v) => Json::String(v.to_string()),
            Self::Int32(v) => Json::String(v.to_string()),
            Self::Int64(v) => Json::String(v.to_string()),
            Self::Int128(v) => Json::String(v.to_string()),
            Self::UInt(v) | Self::UInt256(v) => Json::String(v.to_string()),
            Self::UInt8(v) | Self::Word8(v) => Json::String(v.to_string()),
            Self::UInt16(v) | Self::Word16(v) => Json::String(v.to_string()),
            Self::UInt32(v) | Self::Word32(v) => Json::String(v.to_string()),
            Self::UInt64(v) | Self::Word64(v) => Json::String(v.to_string()),
            Self::UInt128(v) => Json::String(v.to_string()),
            Self::Fix64(v) => Json::String(v.to_string()),
            Self::UFix64(v) => Json::String(v.to_string()),
            Self::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Self::Dictionary(entries) => Json::Array(
                entries
                    .iter()
                    .map(|e| json!({ "key": e.key.to_json(), "value": e.value.to_json() }))
                    .collect(),
            ),
            Self::Struct(c)
            | Self::Resource(c)
            | Self::Event(c)
            | Self::Contract(c)
            | Self::Enum(c) => {
                composite_to_json(c)
            }
            Self::Path(p) => path_payload(p),
            Self::Capability(cap) => json!({
                "path": Value::Path(cap.path.clone()).to_json(),
                "address": cap.address.to_prefixed_hex(),
                "borrowType": cap.borrow_type,
            }),
            Self::Type(t) => json!({ "staticType": t.static_type }),
            Self::Reference(r) => json!({
                "address": r.address.to_prefixed_hex(),
                "type": r.type_id,
            }),
        };
        json!({ "type": tag, "value": payload })
    }

    /// Compact JSON bytes of the wire form. This is what a transaction
    /// argument contributes to the signed payload.
    pub fn to_json_bytes(&self) -> Vec<u8> {
        self.to_json().to_string().into_bytes()
    }
}

fn composite_to_json(c: &Composite) -> Json {
    json!({
        "id": c.id,
        "fields": c
            .fields
            .iter()
            .map(|f| json!({ "name": f.name, "value": f.value.to_json() }))
            .collect::<Vec<_>>(),
    })
}

fn path_payload(p: &Path) -> Json {
    json!({ "domain": p.domain, "identifier": p.identifier })
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

impl Value {
    /// Decodes a wire JSON tree.
    pub fn from_json(json: &Json) -> Result<Self, DecodeError> {
        let obj = json.as_object().ok_or(DecodeError::InvalidShape {
            tag: "value",
            expected: "an object with `type` and `value`",
        })?;
        let tag_str = obj
            .get("type")
            .ok_or(DecodeError::MissingField {
                context: "value",
                field: "type",
            })?
            .as_str()
            .ok_or(DecodeError::InvalidShape {
                tag: "value",
                expected: "`type` to be a string",
            })?;
        let tag: TypeTag = tag_str.parse()?;
        let payload = obj.get("value").unwrap_or(&Json::Null);
        decode_payload(tag, payload)
    }

    /// Parses wire JSON from a string.
    pub fn from_json_str(input: &str) -> Result<Self, DecodeError> {
        let json: Json = serde_json::from_str(input)?;
        Self::from_json(&json)
    }

    /// Parses wire JSON from bytes.
    pub fn from_json_slice(input: &[u8]) -> Result<Self, DecodeError> {
        let json: Json = serde_json::from_slice(input)?;
        Self::from_json(&json)
    }
}

fn decode_payload(tag: TypeTag, payload: &Json) -> Result<Value, DecodeError> {
    let value = match tag {
        TypeTag::Void => match payload {
            Json::Null => Value::Void,
            _ => return Err(shape(tag, "no payload")),
        },
        TypeTag::Optional => match payload {
            Json::Null => Value::Optional(None),
            inner => Value::some(Value::from_json(inner)?),
        },
        TypeTag::Bool => Value::Bool(payload.as_bool().ok_or_else(|| shape(tag, "a boolean"))?),
        TypeTag::String => Value::String(expect_str(tag, payload)?.to_string()),
        TypeTag::Character => {
            let s = expect_str(tag, payload)?;
            if s.is_empty() {
                return Err(DecodeError::InvalidCharacter {
                    literal: String::new(),
                });
            }
            Value::Character(s.to_string())
        }
        TypeTag::Address => Value::Address(Address::from_hex(expect_str(tag, payload)?)?),
        TypeTag::Int => Value::Int(parse_integer(tag, payload)?),
        TypeTag::Int8 => Value::Int8(narrow(tag, payload)?),
        TypeTag::Int16 => Value::Int16(narrow(tag, payload)?),
        TypeTag::Int32 => Value::Int32(narrow(tag, payload)?),
        TypeTag::Int64 => Value::Int64(narrow(tag, payload)?),
        TypeTag::Int128 => Value::Int128(narrow(tag, payload)?),
        TypeTag::Int256 => Value::int256(parse_integer(tag, payload)?)?,
        TypeTag::UInt => Value::UInt(narrow::<BigUint>(tag, payload)?),
        TypeTag::UInt8 => Value::UInt8(narrow(tag, payload)?),
        TypeTag::UInt16 => Value::UInt16(narrow(tag, payload)?),
        TypeTag::UInt32 => Value::UInt32(narrow(tag, payload)?),
        TypeTag::UInt64 => Value::UInt64(narrow(tag, payload)?),
        TypeTag::UInt128 => Value::UInt128(narrow(tag, payload)?),
        TypeTag::UInt256 => Value::uint256(narrow::<BigUint>(tag, payload)?)?,
        TypeTag::Word8 => Value::Word8(narrow(tag, payload)?),
        TypeTag::Word16 => Value::Word16(narrow(tag, payload)?),
        TypeTag::Word32 => Value::Word32(narrow(tag, payload)?),
        TypeTag::Word64 => Value::Word64(narrow(tag, payload)?),
        TypeTag::Fix64 => Value::Fix64(expect_str(tag, payload)?.parse::<Fix64>()?),
        TypeTag::UFix64 => Value::UFix64(expect_str(tag, payload)?.parse::<UFix64>()?),
        TypeTag::Array => {
            let items = payload.as_array().ok_or_else(|| shape(tag, "an array"))?;
            Value::Array(items.iter().map(Value::from_json).collect::<Result<_, _>>()?)
        }
        TypeTag::Dictionary => Value::Dictionary(decode_entries(payload)?),
        TypeTag::Struct => Value::Struct(decode_composite(tag, payload)?),
        TypeTag::Resource => Value::Resource(decode_composite(tag, payload)?),
        TypeTag::Event => Value::Event(decode_composite(tag, payload)?),
        TypeTag::Contract => Value::Contract(decode_composite(tag, payload)?),
        TypeTag::Enum => Value::Enum(decode_composite(tag, payload)?),
        TypeTag::Path => Value::Path(decode_path(payload)?),
        TypeTag::Capability => {
            let obj = expect_object(tag, payload)?;
            let path = match Value::from_json(member(obj, "Capability", "path")?)? {
                Value::Path(p) => p,
                _ => return Err(shape(tag, "`path` to be a Path value")),
            };
            Value::Capability(Capability {
                path,
                address: Address::from_hex(member_str(obj, "Capability", "address")?)?,
                borrow_type: member_str(obj, "Capability", "borrowType")?.to_string(),
            })
        }
        TypeTag::Type => {
            let obj = expect_object(tag, payload)?;
            Value::Type(TypeValue {
                static_type: member_str(obj, "Type", "staticType")?.to_string(),
            })
        }
        TypeTag::Reference => {
            let obj = expect_object(tag, payload)?;
            Value::Reference(Reference {
                address: Address::from_hex(member_str(obj, "Reference", "address")?)?,
                type_id: member_str(obj, "Reference", "type")?.to_string(),
            })
        }
    };
    Ok(value)
}

fn shape(tag: TypeTag, expected: &'static str) -> DecodeError {
    DecodeError::InvalidShape {
        tag: tag.as_str(),
        expected,
    }
}

fn expect_str(tag: TypeTag, payload: &Json) -> Result<&str, DecodeError> {
    payload.as_str().ok_or_else(|| shape(tag, "a string"))
}

fn expect_object(tag: TypeTag, payload: &Json) -> Result<&Map<String, Json>, DecodeError> {
    payload.as_object().ok_or_else(|| shape(tag, "an object"))
}

fn member<'a>(
    obj: &'a Map<String, Json>,
    context: &'static str,
    field: &'static str,
) -> Result<&'a Json, DecodeError> {
    obj.get(field)
        .ok_or(DecodeError::MissingField { context, field })
}

fn member_str<'a>(
    obj: &'a Map<String, Json>,
    context: &'static str,
    field: &'static str,
) -> Result<&'a str, DecodeError> {
    member(obj, context, field)?
        .as_str()
        .ok_or(DecodeError::InvalidShape {
            tag: context,
            expected: "string members",
        })
}

/// Parses a decimal-digit string with an optional leading `-`.
fn parse_integer(tag: TypeTag, payload: &Json) -> Result<BigInt, DecodeError> {
    let literal = expect_str(tag, payload)?;
    let digits = literal.strip_prefix('-').unwrap_or(literal);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::InvalidInteger {
            tag,
            literal: literal.to_string(),
        });
    }
    literal
        .parse::<BigInt>()
        .map_err(|_| DecodeError::InvalidInteger {
            tag,
            literal: literal.to_string(),
        })
}

/// Parses an integer payload and narrows it to the tag's host width.
fn narrow<T: TryFrom<BigInt>>(tag: TypeTag, payload: &Json) -> Result<T, DecodeError> {
    let value = parse_integer(tag, payload)?;
    let literal = value.to_string();
    T::try_from(value).map_err(|_| DecodeError::OutOfRange { tag, literal })
}

fn decode_entries(payload: &Json) -> Result<Vec<DictionaryEntry>, DecodeError> {
    let items = payload
        .as_array()
        .ok_or_else(|| shape(TypeTag::Dictionary, "an array of {key, value} objects"))?;
    items
        .iter()
        .map(|item| {
            let obj = item
                .as_object()
                .ok_or_else(|| shape(TypeTag::Dictionary, "an array of {key, value} objects"))?;
            Ok(DictionaryEntry {
                key: Value::from_json(member(obj, "Dictionary", "key")?)?,
                value: Value::from_json(member(obj, "Dictionary", "value")?)?,
            })
        })
        .collect()
}

fn decode_composite(tag: TypeTag, payload: &Json) -> Result<Composite, DecodeError> {
    let obj = expect_object(tag, payload)?;
    let id = member(obj, "Composite", "id")?
        .as_str()
        .ok_or_else(|| shape(tag, "`id` to be a string"))?
        .to_string();
    let fields = member(obj, "Composite", "fields")?
        .as_array()
        .ok_or_else(|| shape(tag, "`fields` to be an array"))?
        .iter()
        .map(|field| {
            let f = field
                .as_object()
                .ok_or_else(|| shape(tag, "fields of {name, value} objects"))?;
            Ok(Field {
                name: member_str(f, "Field", "name")?.to_string(),
                value: Value::from_json(member(f, "Field", "value")?)?,
            })
        })
        .collect::<Result<_, DecodeError>>()?;
    Ok(Composite { id, fields })
}

fn decode_path(payload: &Json) -> Result<Path, DecodeError> {
    let obj = expect_object(TypeTag::Path, payload)?;
    Ok(Path {
        domain: member_str(obj, "Path", "domain")?.to_string(),
        identifier: member_str(obj, "Path", "identifier")?.to_string(),
    })
}

// ---------------------------------------------------------------------------
// serde integration
// ---------------------------------------------------------------------------

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = Json::deserialize(deserializer)?;
        Value::from_json(&json).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
