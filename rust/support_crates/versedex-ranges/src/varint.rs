//! LEB128-style variable-length encoding of `u32` values.
//!
//! Seven payload bits per byte, least significant group first, with the high
//! bit marking that another byte follows. Small numbers (the common case for
//! gaps and run lengths of a sparse reference set) take a single byte.

use versedex_common::{Result, error::Error};

/// The longest encoding of a `u32`.
pub const MAX_VARINT_LEN: usize = 5;

/// Appends the encoding of `value` to `buf`, returning the number of bytes written.
pub fn write_u32(buf: &mut Vec<u8>, value: u32) -> usize {
    let mut val = value;
    let mut written = 0;
    loop {
        let mut byte = (val & 0x7F) as u8;
        val >>= 7;
        if val != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        written += 1;
        if val == 0 {
            return written;
        }
    }
}

/// Returns the encoded length of `value` without encoding it.
pub fn encoded_len(value: u32) -> usize {
    match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        0x20_0000..=0xFFF_FFFF => 4,
        _ => 5,
    }
}

/// A cursor decoding consecutive varints from a byte slice.
///
/// Every failure (truncated value, value exceeding `u32`) is reported as a
/// corrupt-index error naming `element`, so callers never observe a partially
/// decoded value.
pub struct VarintReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    element: &'static str,
}

impl<'a> VarintReader<'a> {
    pub fn new(bytes: &'a [u8], element: &'static str) -> VarintReader<'a> {
        VarintReader {
            bytes,
            pos: 0,
            element,
        }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos == self.bytes.len()
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let mut result = 0u32;
        for i in 0..MAX_VARINT_LEN {
            let Some(&byte) = self.bytes.get(self.pos) else {
                return Err(Error::corrupt_index(
                    self.element,
                    format!("truncated varint at byte {}", self.pos),
                ));
            };
            self.pos += 1;

            let payload = (byte & 0x7F) as u32;
            // The fifth byte may only carry the top four bits of a u32.
            if i == MAX_VARINT_LEN - 1 && (payload > 0x0F || byte & 0x80 != 0) {
                return Err(Error::corrupt_index(
                    self.element,
                    format!("varint overflow at byte {}", self.pos - 1),
                ));
            }
            result |= payload << (7 * i);

            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        unreachable!("the fifth byte either terminates or fails the overflow check")
    }
}
