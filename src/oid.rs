//! Object identifiers: the 20-byte SHA-1 digest of a framed object (spec.md §3).

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A git object identifier — 20 raw bytes, displayed as 40 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oid([u8; 20]);

impl Oid {
    /// The all-zero OID, used as a sentinel in pkt-line wire formats.
    pub const ZERO: Self = Self([0; 20]);

    /// Wrap raw bytes as an `Oid`.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw 20 bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// `true` if this is [`Oid::ZERO`].
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Parse an `Oid` from a 40-byte hex slice read directly off the wire (no UTF-8 check
    /// needed since hex digits are ASCII).
    pub fn from_hex_bytes(hex: &[u8]) -> Result<Self, Error> {
        if hex.len() != 40 {
            return Err(Error::decode(format!(
                "expected 40 hex characters for an oid, got {}",
                hex.len()
            )));
        }
        let mut bytes = [0u8; 20];
        for (i, chunk) in hex.chunks(2).enumerate() {
            let hi = hex_digit(chunk[0])
                .ok_or_else(|| Error::decode(format!("invalid hex digit '{}'", chunk[0] as char)))?;
            let lo = hex_digit(chunk[1])
                .ok_or_else(|| Error::decode(format!("invalid hex digit '{}'", chunk[1] as char)))?;
            bytes[i] = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({self})")
    }
}

impl FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex_bytes(s.as_bytes())
    }
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
