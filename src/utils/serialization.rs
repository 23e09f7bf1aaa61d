// Little-endian wire helpers shared by every encodable structure.
// Integers are fixed-width LE, lengths are Bitcoin compact-size varints.
use crate::error::{DecodeError, DecodeResult};
use std::io::{self, Read, Write};

/// Upper bound on a single var-bytes field
pub const MAX_VAR_BYTES: u64 = 1024 * 1024;

/// Upper bound on element counts (inputs, outputs, attributes, programs)
pub const MAX_LIST_LEN: u64 = 65_536;

pub fn write_u8<W: Write + ?Sized>(w: &mut W, value: u8) -> io::Result<()> {
    w.write_all(&[value])
}

pub fn write_u16<W: Write + ?Sized>(w: &mut W, value: u16) -> io::Result<()> {
    w.write_all(&value.to_le_bytes())
}

pub fn write_u32<W: Write + ?Sized>(w: &mut W, value: u32) -> io::Result<()> {
    w.write_all(&value.to_le_bytes())
}

pub fn write_i64<W: Write + ?Sized>(w: &mut W, value: i64) -> io::Result<()> {
    w.write_all(&value.to_le_bytes())
}

/// Encode a variable-length integer (Bitcoin compact size).
pub fn write_var_uint<W: Write + ?Sized>(w: &mut W, value: u64) -> io::Result<()> {
    if value < 0xfd {
        w.write_all(&[value as u8])
    } else if value <= 0xffff {
        w.write_all(&[0xfd])?;
        w.write_all(&(value as u16).to_le_bytes())
    } else if value <= 0xffff_ffff {
        w.write_all(&[0xfe])?;
        w.write_all(&(value as u32).to_le_bytes())
    } else {
        w.write_all(&[0xff])?;
        w.write_all(&value.to_le_bytes())
    }
}

pub fn write_var_bytes<W: Write + ?Sized>(w: &mut W, data: &[u8]) -> io::Result<()> {
    write_var_uint(w, data.len() as u64)?;
    w.write_all(data)
}

pub fn write_var_string<W: Write + ?Sized>(w: &mut W, s: &str) -> io::Result<()> {
    write_var_bytes(w, s.as_bytes())
}

pub fn read_u8<R: Read + ?Sized>(r: &mut R) -> DecodeResult<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub fn read_u16<R: Read + ?Sized>(r: &mut R) -> DecodeResult<u16> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

pub fn read_u32<R: Read + ?Sized>(r: &mut R) -> DecodeResult<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub fn read_i64<R: Read + ?Sized>(r: &mut R) -> DecodeResult<i64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

/// Decode a compact-size varint. Only the minimal encoding of a value is
/// accepted, so every decoded structure re-encodes to the same bytes.
pub fn read_var_uint<R: Read + ?Sized>(r: &mut R) -> DecodeResult<u64> {
    let (value, min) = match read_u8(r)? {
        0xfd => (u64::from(read_u16(r)?), 0xfd),
        0xfe => (u64::from(read_u32(r)?), 0x1_0000),
        0xff => {
            let mut buf = [0u8; 8];
            r.read_exact(&mut buf)?;
            (u64::from_le_bytes(buf), 0x1_0000_0000)
        }
        small => return Ok(u64::from(small)),
    };
    if value < min {
        return Err(DecodeError::NonCanonicalVarUint(value));
    }
    Ok(value)
}

/// Read a varint length and reject it if it exceeds `max`.
pub fn read_len<R: Read + ?Sized>(r: &mut R, what: &'static str, max: u64) -> DecodeResult<usize> {
    let len = read_var_uint(r)?;
    check_len(what, len, max)
}

pub(crate) fn check_len(what: &'static str, len: u64, max: u64) -> DecodeResult<usize> {
    if len > max {
        return Err(DecodeError::LengthOverflow { what, len, max });
    }
    usize::try_from(len).map_err(|_| DecodeError::LengthOverflow { what, len, max })
}

/// Read exactly `len` bytes without trusting `len` for the allocation size.
pub fn read_bytes<R: Read + ?Sized>(r: &mut R, len: usize) -> DecodeResult<Vec<u8>> {
    let mut buf = Vec::new();
    r.take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(DecodeError::UnexpectedEof);
    }
    Ok(buf)
}

pub fn read_var_bytes<R: Read + ?Sized>(r: &mut R) -> DecodeResult<Vec<u8>> {
    let len = read_len(r, "var bytes", MAX_VAR_BYTES)?;
    read_bytes(r, len)
}

pub fn read_var_string<R: Read + ?Sized>(r: &mut R) -> DecodeResult<String> {
    let bytes = read_var_bytes(r)?;
    String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)
}
