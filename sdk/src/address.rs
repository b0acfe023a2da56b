//! Fixed-width account addresses.
//!
//! An address is exactly 8 bytes, big-endian. Its text form is always `0x`
//! followed by 16 lowercase hex digits; parsing is more lenient and accepts
//! short forms like `0x1`, left-padding with zeros.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::ADDRESS_LENGTH;

/// Errors raised when a string or byte slice is not a valid address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,

    #[error("address has {digits} hex digits, at most 16 allowed")]
    TooLong { digits: usize },

    #[error("address is not valid hex: {input}")]
    InvalidHex { input: String },

    #[error("address must be exactly 8 bytes, got {len}")]
    InvalidLength { len: usize },
}

/// An 8-byte ledger account address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// Wraps raw address bytes.
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Builds an address from a slice that must be exactly 8 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddressError> {
        let arr: [u8; ADDRESS_LENGTH] = bytes
            .try_into()
            .map_err(|_| AddressError::InvalidLength { len: bytes.len() })?;
        Ok(Self(arr))
    }

    /// Parses a hex address with or without the `0x` prefix.
    ///
    /// Short inputs are left-padded, so `"0x1"` and
    /// `"0x0000000000000001"` name the same account.
    pub fn from_hex(input: &str) -> Result<Self, AddressError> {
        let digits = input
            .strip_prefix("0x")
            .or_else(|| input.strip_prefix("0X"))
            .unwrap_or(input);

        if digits.is_empty() {
            return Err(AddressError::Empty);
        }
        if digits.len() > ADDRESS_LENGTH * 2 {
            return Err(AddressError::TooLong {
                digits: digits.len(),
            });
        }

        let padded = format!("{:0>width$}", digits, width = ADDRESS_LENGTH * 2);
        let bytes = hex::decode(&padded).map_err(|_| AddressError::InvalidHex {
            input: input.to_string(),
        })?;
        Self::from_bytes(&bytes)
    }

    /// Raw bytes, big-endian.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Lowercase hex without the `0x` prefix. This is the form the access
    /// node REST API expects.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// `0x`-prefixed lowercase hex, the wire form for typed values.
    pub fn to_prefixed_hex(&self) -> String {
        format!("0x{}", self.to_hex())
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LENGTH]
    }
}

impl From<[u8; ADDRESS_LENGTH]> for Address {
    fn from(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Self(value.to_be_bytes())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_prefixed_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_width_hex() {
        let addr = Address::from_hex("0xf8d6e0586b0a20c7").unwrap();
        assert_eq!(
            addr.as_bytes(),
            &[0xf8, 0xd6, 0xe0, 0x58, 0x6b, 0x0a, 0x20, 0xc7]
        );
        assert_eq!(addr.to_string(), "0xf8d6e0586b0a20c7");
    }

    #[test]
    fn short_form_is_left_padded() {
        let short = Address::from_hex("0x1").unwrap();
        let long = Address::from_hex("0000000000000001").unwrap();
        assert_eq!(short, long);
        assert_eq!(short, Address::from(1u64));
        assert_eq!(short.to_prefixed_hex(), "0x0000000000000001");
    }

    #[test]
    fn uppercase_input_renders_lowercase() {
        let addr = Address::from_hex("0xF8D6E0586B0A20C7").unwrap();
        assert_eq!(addr.to_hex(), "f8d6e0586b0a20c7");
    }

    #[test]
    fn rejects_too_long() {
        assert_eq!(
            Address::from_hex("0x01f8d6e0586b0a20c7"),
            Err(AddressError::TooLong { digits: 18 })
        );
    }

    #[test]
    fn rejects_empty_and_non_hex() {
        assert_eq!(Address::from_hex("0x"), Err(AddressError::Empty));
        assert!(matches!(
            Address::from_hex("0xzz"),
            Err(AddressError::InvalidHex { .. })
        ));
    }

    #[test]
    fn from_bytes_requires_exact_length() {
        assert!(Address::from_bytes(&[1, 2, 3]).is_err());
        assert!(Address::from_bytes(&[0u8; 9]).is_err());
        assert!(Address::from_bytes(&[0u8; 8]).unwrap().is_zero());
    }

    #[test]
    fn serde_uses_prefixed_hex() {
        let addr = Address::from(0x01cf0e2f2f715450u64);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0x01cf0e2f2f715450\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, back);
    }
}
