//! Error handling for proof decoding and verification
//!
//! Decoding failures are grouped under [`DecodeError`]; every verification
//! step has its own [`AuxPowError`] variant so callers can tell exactly
//! which check rejected a proof.

use crate::core::Uint256;
use std::fmt;
use std::io;

/// Result type alias for merge-mining operations
pub type Result<T> = std::result::Result<T, AuxPowError>;

/// Result type alias for wire decoding
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Failures raised while reading a proof (or any of its parts) off the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The stream ended before the structure was complete
    UnexpectedEof,
    /// A length prefix exceeded its sanity bound
    LengthOverflow {
        what: &'static str,
        len: u64,
        max: u64,
    },
    /// A compact-size varint used a wider form than its value needs
    NonCanonicalVarUint(u64),
    /// No payload constructor is registered for this transaction type
    UnknownTransactionType(u8),
    /// Transaction version byte is not one this codec understands
    UnsupportedTxVersion(u8),
    /// Outer proof tag is not none/aux/side
    UnknownProofKind(u8),
    /// Nested merge-mining proofs exceeded the configured depth
    NestingTooDeep(usize),
    /// A var-string was not valid UTF-8
    InvalidUtf8,
    /// A 256-bit hash was built from a slice of the wrong size
    InvalidHashLength(usize),
    /// Text input was not hexadecimal
    InvalidHex(String),
    /// Bytes were left over after a complete proof was read
    TrailingBytes(usize),
    /// Any other transport failure
    Io(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnexpectedEof => write!(f, "unexpected end of stream"),
            DecodeError::LengthOverflow { what, len, max } => {
                write!(f, "{what} length {len} exceeds maximum {max}")
            }
            DecodeError::NonCanonicalVarUint(v) => {
                write!(f, "varint {v} is not minimally encoded")
            }
            DecodeError::UnknownTransactionType(t) => {
                write!(f, "unknown transaction type 0x{t:02x}")
            }
            DecodeError::UnsupportedTxVersion(v) => {
                write!(f, "unsupported transaction version 0x{v:02x}")
            }
            DecodeError::UnknownProofKind(k) => write!(f, "unknown outer proof kind {k}"),
            DecodeError::NestingTooDeep(depth) => {
                write!(f, "merge-mining proofs nested deeper than {depth} levels")
            }
            DecodeError::InvalidUtf8 => write!(f, "string is not valid UTF-8"),
            DecodeError::InvalidHashLength(len) => {
                write!(f, "expected 32 bytes for a 256-bit hash, got {len}")
            }
            DecodeError::InvalidHex(msg) => write!(f, "invalid hex: {msg}"),
            DecodeError::TrailingBytes(n) => write!(f, "{n} trailing bytes after proof"),
            DecodeError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<io::Error> for DecodeError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => DecodeError::UnexpectedEof,
            _ => DecodeError::Io(err.to_string()),
        }
    }
}

/// Every way a merge-mining proof can be rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuxPowError {
    /// Encoding could not be read
    Decode(DecodeError),
    /// The main block header's embedded proof-of-work did not validate
    OuterProofInvalid,
    /// The rebuilt merkle root differs from the main header's merkle root
    MerkleRootMismatch { computed: Uint256, expected: Uint256 },
    /// Payload too short to hold the bound 32-byte hash
    PayloadHashDecode { len: usize },
    /// Payload vouches for a different side-chain block
    HashBindingMismatch { expected: Uint256, found: Uint256 },
    /// Configuration errors
    Config(String),
    /// Write-side I/O errors
    Io(String),
}

impl fmt::Display for AuxPowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuxPowError::Decode(err) => write!(f, "Decode error: {err}"),
            AuxPowError::OuterProofInvalid => {
                write!(f, "main block header outer proof-of-work check failed")
            }
            AuxPowError::MerkleRootMismatch { computed, expected } => write!(
                f,
                "merkle root mismatch: computed {computed}, header has {expected}"
            ),
            AuxPowError::PayloadHashDecode { len } => write!(
                f,
                "payload of {len} bytes is too short to hold a 32-byte block hash"
            ),
            AuxPowError::HashBindingMismatch { expected, found } => write!(
                f,
                "payload hash {found} is not equal to side block hash {expected}"
            ),
            AuxPowError::Config(msg) => write!(f, "Configuration error: {msg}"),
            AuxPowError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for AuxPowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuxPowError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DecodeError> for AuxPowError {
    fn from(err: DecodeError) -> Self {
        AuxPowError::Decode(err)
    }
}

impl From<io::Error> for AuxPowError {
    fn from(err: io::Error) -> Self {
        AuxPowError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for AuxPowError {
    fn from(err: toml::de::Error) -> Self {
        AuxPowError::Config(err.to_string())
    }
}

impl AuxPowError {
    /// True when the failure happened while reading bytes, not while judging them
    pub fn is_decode(&self) -> bool {
        matches!(self, AuxPowError::Decode(_))
    }
}
