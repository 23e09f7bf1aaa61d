//! 256-bit hash codec.

use crate::error::{DecodeError, DecodeResult, Result};
use crate::utils::sha256d;
use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

pub const UINT256_SIZE: usize = 32;

/// A 256-bit hash kept in internal (wire) byte order.
///
/// `Display` and `FromStr` use the reversed-hex form block explorers show.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uint256([u8; UINT256_SIZE]);

impl Uint256 {
    pub const ZERO: Uint256 = Uint256([0u8; UINT256_SIZE]);

    /// Build a hash from a slice that must be exactly 32 bytes long
    pub fn from_slice(bytes: &[u8]) -> DecodeResult<Uint256> {
        let array: [u8; UINT256_SIZE] = bytes
            .try_into()
            .map_err(|_| DecodeError::InvalidHashLength(bytes.len()))?;
        Ok(Uint256(array))
    }

    /// Double SHA-256 of `data`
    pub fn hash_of(data: &[u8]) -> Uint256 {
        Uint256(sha256d(data))
    }

    pub fn as_bytes(&self) -> &[u8; UINT256_SIZE] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; UINT256_SIZE] {
        self.0
    }

    /// Bytes in display order (most significant first)
    pub fn reversed(&self) -> [u8; UINT256_SIZE] {
        let mut out = self.0;
        out.reverse();
        out
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; UINT256_SIZE]
    }

    pub fn serialize<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        w.write_all(&self.0)?;
        Ok(())
    }

    pub fn deserialize<R: Read + ?Sized>(r: &mut R) -> DecodeResult<Uint256> {
        let mut buf = [0u8; UINT256_SIZE];
        r.read_exact(&mut buf)?;
        Ok(Uint256(buf))
    }
}

impl From<[u8; UINT256_SIZE]> for Uint256 {
    fn from(bytes: [u8; UINT256_SIZE]) -> Self {
        Uint256(bytes)
    }
}

impl AsRef<[u8]> for Uint256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Uint256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&HEXLOWER.encode(&self.reversed()))
    }
}

impl fmt::Debug for Uint256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uint256({self})")
    }
}

impl FromStr for Uint256 {
    type Err = DecodeError;

    fn from_str(s: &str) -> DecodeResult<Uint256> {
        let mut bytes = HEXLOWER_PERMISSIVE
            .decode(s.trim().as_bytes())
            .map_err(|e| DecodeError::InvalidHex(e.to_string()))?;
        bytes.reverse();
        Uint256::from_slice(&bytes)
    }
}

impl Serialize for Uint256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Uint256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_from_slice_requires_exactly_32_bytes() {
        assert!(Uint256::from_slice(&[7u8; 32]).is_ok());
        assert_eq!(
            Uint256::from_slice(&[7u8; 31]),
            Err(DecodeError::InvalidHashLength(31))
        );
        assert_eq!(
            Uint256::from_slice(&[7u8; 33]),
            Err(DecodeError::InvalidHashLength(33))
        );
    }

    #[test]
    fn test_display_is_reversed_hex() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xab;
        bytes[31] = 0x01;
        let hash = Uint256::from(bytes);
        let shown = hash.to_string();
        assert!(shown.starts_with("01"));
        assert!(shown.ends_with("ab"));
        assert_eq!(shown.parse::<Uint256>().unwrap(), hash);
    }

    #[test]
    fn test_wire_order_is_internal_order() {
        let hash = Uint256::from([0x5a; 32]);
        let mut buf = Vec::new();
        hash.serialize(&mut buf).unwrap();
        assert_eq!(buf, vec![0x5a; 32]);
        assert_eq!(Uint256::deserialize(&mut Cursor::new(buf)).unwrap(), hash);
    }

    #[test]
    fn test_truncated_hash_fails() {
        let err = Uint256::deserialize(&mut Cursor::new(vec![0u8; 20])).unwrap_err();
        assert_eq!(err, DecodeError::UnexpectedEof);
    }

    #[test]
    fn test_serde_uses_display_form() {
        let hash = Uint256::hash_of(b"side block");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{hash}\""));
        let back: Uint256 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}
