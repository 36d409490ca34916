//! Principal identity: a 20-byte address that can hold voting rights.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// An opaque, equality-comparable identity, rendered as `0x`-prefixed hex.
///
/// The all-zero value ([`Principal::ZERO`]) is reserved and can never be a
/// beneficiary.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal([u8; 20]);

impl Principal {
    /// Length of the raw address in bytes.
    pub const LEN: usize = 20;

    /// The reserved zero address.
    pub const ZERO: Self = Self([0u8; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Parse a principal from hex, with or without the `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, TypesError> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.len() != Self::LEN * 2 {
            return Err(TypesError::InvalidPrincipal(format!(
                "expected {} hex digits, got {}",
                Self::LEN * 2,
                digits.len()
            )));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| TypesError::InvalidPrincipal(format!("{s}: {e}")))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal(0x{})", hex::encode(&self.0[..4]))
    }
}

impl FromStr for Principal {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Principal {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl From<Principal> for String {
    fn from(p: Principal) -> Self {
        p.to_string()
    }
}

impl From<[u8; 20]> for Principal {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}
