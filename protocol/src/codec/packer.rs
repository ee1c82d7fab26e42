//! Builder for canonical records.

use super::varint::write_varint;

/// Accumulates a canonical record field by field.
///
/// Every record starts with its transaction tag, so construction goes
/// through [`Packer::tagged`].
///
/// ```
/// use bitmark_protocol::codec::Packer;
///
/// let bytes = Packer::tagged(0x08).bytes(&[0xaa, 0xbb]).varint(100).finish();
/// assert_eq!(bytes, vec![0x08, 0x02, 0xaa, 0xbb, 0x64]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Packer {
    buf: Vec<u8>,
}

impl Packer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a record with the given transaction tag.
    pub fn tagged(tag: u64) -> Self {
        Self::new().varint(tag)
    }

    pub fn varint(mut self, value: u64) -> Self {
        write_varint(value, &mut self.buf);
        self
    }

    /// Length-prefixed byte string.
    pub fn bytes(mut self, data: &[u8]) -> Self {
        write_varint(data.len() as u64, &mut self.buf);
        self.buf.extend_from_slice(data);
        self
    }

    /// Length-prefixed UTF-8 string. The prefix counts bytes, not characters.
    pub fn string(self, s: &str) -> Self {
        self.bytes(s.as_bytes())
    }

    /// Appends bytes with no length prefix.
    pub fn raw(mut self, data: &[u8]) -> Self {
        self.buf.extend_from_slice(data);
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}
