//! # Typed Values
//!
//! The ledger's value model and its JSON interchange codec.
//!
//! ## Architecture
//!
//! ```text
//! types.rs  — TypeTag, the wire discriminant of every value kind
//! value.rs  — Value (closed sum type), composites, fixed-point numbers
//! json.rs   — {"type", "value"} encode/decode and serde integration
//! native.rs — lowering to host types, lifting from them, flexible numerics
//! error.rs  — DecodeError
//! ```
//!
//! All of it is pure and reentrant: no I/O, no shared state.

pub mod error;
pub mod json;
pub mod native;
pub mod types;
pub mod value;

pub use error::DecodeError;
pub use native::{decode_flexible, FromValue, NativeMap, NativeRecord, NativeValue, NumericSource};
pub use types::TypeTag;
pub use value::{
    Capability, Composite, DictionaryEntry, Field, Fix64, Path, Reference, TypeValue, UFix64,
    Value,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A transaction or script argument.
///
/// The type tag is always the wrapped value's own tag, so an argument can
/// never claim one kind and carry another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    value: Value,
}

impl Argument {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn type_tag(&self) -> TypeTag {
        self.value.type_tag()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The JSON bytes that go into the signed payload.
    pub fn encode(&self) -> Vec<u8> {
        self.value.to_json_bytes()
    }

    /// Parses an argument from its JSON bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        Value::from_json_slice(bytes).map(Self::new)
    }
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        Self { value }
    }
}

impl Serialize for Argument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Argument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::new)
    }
}
