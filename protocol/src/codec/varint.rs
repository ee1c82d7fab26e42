//! Unsigned LEB128 varints.

use crate::config::VARINT_MAX_BYTES;
use crate::error::ValidationError;

/// Appends `value` to `out` as a varint.
pub fn write_varint(mut value: u64, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Encodes `value` into a fresh buffer.
pub fn encode_varint(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(VARINT_MAX_BYTES);
    write_varint(value, &mut out);
    out
}

/// Decodes a varint from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed. Truncated input and
/// encodings that would overflow a `u64` are rejected.
pub fn read_varint(bytes: &[u8]) -> Result<(u64, usize), ValidationError> {
    let mut value: u64 = 0;
    for (i, byte) in bytes.iter().enumerate() {
        if i == VARINT_MAX_BYTES {
            return Err(ValidationError::Varint("longer than ten bytes"));
        }
        let group = u64::from(byte & 0x7f);
        // The tenth group may only carry the single remaining bit.
        if i == VARINT_MAX_BYTES - 1 && group > 1 {
            return Err(ValidationError::Varint("overflows u64"));
        }
        value |= group << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(ValidationError::Varint("truncated"))
}
