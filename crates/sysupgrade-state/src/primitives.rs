// STATE PRIMITIVES
// Fixed-width account addresses and 32-byte words
//
// Textual form is lowercase hex with a `0x` prefix. Parsing accepts the
// prefix as optional and either case, but rejects any length other than
// the exact width.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid hex in {0}: {1}")]
    InvalidHex(String, String),

    #[error("Expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Strip an optional `0x` / `0X` prefix.
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

fn parse_fixed<const N: usize>(s: &str) -> Result<[u8; N], ParseError> {
    let bytes = hex::decode(strip_hex_prefix(s))
        .map_err(|e| ParseError::InvalidHex(s.to_string(), e.to_string()))?;

    if bytes.len() != N {
        return Err(ParseError::InvalidLength {
            expected: N,
            actual: bytes.len(),
        });
    }

    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// 20-byte account address
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const LEN: usize = 20;

    pub const ZERO: Address = Address([0u8; 20]);

    /// Address whose trailing bytes hold `value` big-endian.
    ///
    /// System contracts live at small, fixed addresses such as `0x…1000`.
    pub const fn from_low_u64(value: u64) -> Self {
        let be = value.to_be_bytes();
        let mut bytes = [0u8; 20];
        let mut i = 0;
        while i < 8 {
            bytes[12 + i] = be[i];
            i += 1;
        }
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed::<20>(s).map(Address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// 32-byte word: block hashes, storage keys and storage values
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    pub const LEN: usize = 32;

    pub const ZERO: Hash = Hash([0u8; 32]);

    pub const fn from_low_u64(value: u64) -> Self {
        let be = value.to_be_bytes();
        let mut bytes = [0u8; 32];
        let mut i = 0;
        while i < 8 {
            bytes[24 + i] = be[i];
            i += 1;
        }
        Hash(bytes)
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for Hash {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed::<32>(s).map(Hash)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self)
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parse_with_and_without_prefix() {
        let a: Address = "0x000000000000000000000000000000000000abcd".parse().unwrap();
        let b: Address = "000000000000000000000000000000000000ABCD".parse().unwrap();

        assert_eq!(a, b);
        assert_eq!(a, Address::from_low_u64(0xabcd));
    }

    #[test]
    fn test_address_display_is_lowercase_prefixed() {
        let a = Address::from_low_u64(0x1000);
        assert_eq!(a.to_string(), "0x0000000000000000000000000000000000001000");
    }

    #[test]
    fn test_address_rejects_wrong_length() {
        let err = "0xabcd".parse::<Address>().unwrap_err();
        assert_eq!(err, ParseError::InvalidLength { expected: 20, actual: 2 });
    }

    #[test]
    fn test_address_rejects_bad_hex() {
        let err = "0xzz00000000000000000000000000000000000000".parse::<Address>();
        assert!(matches!(err, Err(ParseError::InvalidHex(_, _))));
    }

    #[test]
    fn test_hash_serde_as_string() {
        let h = Hash::from_low_u64(7);
        let json = serde_json::to_string(&h).unwrap();

        assert_eq!(
            json,
            "\"0x0000000000000000000000000000000000000000000000000000000000000007\""
        );

        let back: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
        assert!(!back.is_zero());
        assert!(Hash::ZERO.is_zero());
    }
}
