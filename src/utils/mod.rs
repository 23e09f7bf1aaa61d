//! Utility functions and helpers
//!
//! Hashing primitives and the little-endian wire helpers every
//! encodable structure in the crate is built on.

pub mod crypto;
pub mod serialization;

pub use crypto::{sha256_digest, sha256d, sha256d_pair};

pub use serialization::{
    read_bytes, read_i64, read_len, read_u16, read_u32, read_u8, read_var_bytes, read_var_string,
    read_var_uint, write_i64, write_u16, write_u32, write_u8, write_var_bytes, write_var_string,
    write_var_uint, MAX_LIST_LEN, MAX_VAR_BYTES,
};
