//! CompactSize integers and bounds-checked reads over [`bytes::Buf`].
//!
//! Encoding rules:
//! - value < 0xfd: single byte
//! - value <= 0xffff: 0xfd prefix + 2 bytes (little-endian)
//! - value <= 0xffffffff: 0xfe prefix + 4 bytes (little-endian)
//! - otherwise: 0xff prefix + 8 bytes (little-endian)
//!
//! Non-minimal encodings are accepted on read.

use bytes::{Buf, BufMut};

use crate::error::WireError;

/// Number of bytes [`put_varint`] writes for `value`.
pub fn varint_size(value: u64) -> usize {
    match value {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

/// Append `value` as a CompactSize integer.
pub fn put_varint(buf: &mut impl BufMut, value: u64) {
    match value {
        0..=0xfc => buf.put_u8(value as u8),
        0xfd..=0xffff => {
            buf.put_u8(0xfd);
            buf.put_u16_le(value as u16);
        }
        0x1_0000..=0xffff_ffff => {
            buf.put_u8(0xfe);
            buf.put_u32_le(value as u32);
        }
        _ => {
            buf.put_u8(0xff);
            buf.put_u64_le(value);
        }
    }
}

/// Read a CompactSize integer.
pub fn get_varint(buf: &mut impl Buf) -> Result<u64, WireError> {
    let prefix = get_u8(buf)?;
    match prefix {
        0xfd => {
            ensure(buf, 2)?;
            Ok(u64::from(buf.get_u16_le()))
        }
        0xfe => Ok(u64::from(get_u32_le(buf)?)),
        0xff => get_u64_le(buf),
        n => Ok(u64::from(n)),
    }
}

/// Append a CompactSize length followed by `data`.
pub fn put_var_bytes(buf: &mut impl BufMut, data: &[u8]) {
    put_varint(buf, data.len() as u64);
    buf.put_slice(data);
}

/// Read a CompactSize length followed by that many bytes.
///
/// The length is checked against the remaining buffer before allocating.
pub fn get_var_bytes(buf: &mut impl Buf) -> Result<Vec<u8>, WireError> {
    let len = get_varint(buf)?;
    if len > buf.remaining() as u64 {
        return Err(WireError::LengthOverflow(len));
    }
    get_bytes(buf, len as usize)
}

pub fn get_bytes(buf: &mut impl Buf, len: usize) -> Result<Vec<u8>, WireError> {
    ensure(buf, len)?;
    let mut out = vec![0u8; len];
    buf.copy_to_slice(&mut out);
    Ok(out)
}

pub fn get_array32(buf: &mut impl Buf) -> Result<[u8; 32], WireError> {
    ensure(buf, 32)?;
    let mut out = [0u8; 32];
    buf.copy_to_slice(&mut out);
    Ok(out)
}

pub fn get_u8(buf: &mut impl Buf) -> Result<u8, WireError> {
    ensure(buf, 1)?;
    Ok(buf.get_u8())
}

pub fn get_u32_le(buf: &mut impl Buf) -> Result<u32, WireError> {
    ensure(buf, 4)?;
    Ok(buf.get_u32_le())
}

pub fn get_i32_le(buf: &mut impl Buf) -> Result<i32, WireError> {
    ensure(buf, 4)?;
    Ok(buf.get_i32_le())
}

pub fn get_u64_le(buf: &mut impl Buf) -> Result<u64, WireError> {
    ensure(buf, 8)?;
    Ok(buf.get_u64_le())
}

fn ensure(buf: &impl Buf, need: usize) -> Result<(), WireError> {
    let have = buf.remaining();
    if have < need {
        return Err(WireError::Truncated { need, have });
    }
    Ok(())
}
