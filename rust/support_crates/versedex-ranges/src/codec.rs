//! Binary encoding of a [`ReferenceSet`].
//!
//! Layout (all values are [varints](crate::varint)):
//!
//! ```text
//! count
//! gap_0 len_0
//! gap_1 len_1
//! ...
//! ```
//!
//! `gap_i` is the distance from the end of the previous range (0 for the
//! first) to the start of range `i`, and `len_i` its length. In a normalized
//! set every length is positive and every gap after the first is positive,
//! which the decoder enforces.

use versedex_common::{Result, error::Error};

use crate::{
    MAX_ORDINAL, ReferenceSet,
    varint::{self, VarintReader},
};

const ELEMENT: &str = "reference set";

/// Encodes `set` into a new buffer.
pub fn encode(set: &ReferenceSet) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_size(set));
    encode_into(set, &mut buf);
    buf
}

/// Appends the encoding of `set` to `buf`.
pub fn encode_into(set: &ReferenceSet, buf: &mut Vec<u8>) {
    varint::write_u32(buf, set.range_count() as u32);
    let mut prev_end = 0u32;
    for range in set.ranges() {
        varint::write_u32(buf, range.start - prev_end);
        varint::write_u32(buf, range.end - range.start);
        prev_end = range.end;
    }
}

/// Exact size of the encoding of `set` in bytes.
pub fn encoded_size(set: &ReferenceSet) -> usize {
    let mut size = varint::encoded_len(set.range_count() as u32);
    let mut prev_end = 0u32;
    for range in set.ranges() {
        size += varint::encoded_len(range.start - prev_end);
        size += varint::encoded_len(range.end - range.start);
        prev_end = range.end;
    }
    size
}

/// Decodes a set, requiring `bytes` to hold exactly one encoded set.
pub fn decode(bytes: &[u8]) -> Result<ReferenceSet> {
    let mut reader = VarintReader::new(bytes, ELEMENT);
    let count = reader.read_u32()?;

    // Every range takes at least two bytes.
    if count as usize > bytes.len() / 2 {
        return Err(Error::corrupt_index(
            ELEMENT,
            format!("range count {count} exceeds payload of {} bytes", bytes.len()),
        ));
    }

    let mut ranges = Vec::with_capacity(count as usize);
    let mut prev_end = 0u32;
    for i in 0..count {
        let gap = reader.read_u32()?;
        let len = reader.read_u32()?;
        if len == 0 {
            return Err(Error::corrupt_index(ELEMENT, format!("range {i} is empty")));
        }
        if i > 0 && gap == 0 {
            return Err(Error::corrupt_index(
                ELEMENT,
                format!("range {i} touches its predecessor"),
            ));
        }
        let start = prev_end
            .checked_add(gap)
            .ok_or_else(|| Error::corrupt_index(ELEMENT, format!("range {i} start overflows")))?;
        let end = start
            .checked_add(len)
            .filter(|&end| end - 1 <= MAX_ORDINAL)
            .ok_or_else(|| Error::corrupt_index(ELEMENT, format!("range {i} end overflows")))?;
        ranges.push(start..end);
        prev_end = end;
    }

    if !reader.is_at_end() {
        return Err(Error::corrupt_index(
            ELEMENT,
            format!(
                "{} trailing bytes after {count} ranges",
                bytes.len() - reader.position()
            ),
        ));
    }
    Ok(ReferenceSet::from_normalized(ranges))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let set = ReferenceSet::from_ranges(vec![3..5, 10..11]);
        let bytes = encode(&set);
        assert_eq!(bytes, vec![2, 3, 2, 5, 1]);
        assert_eq!(encoded_size(&set), bytes.len());
        assert_eq!(decode(&bytes).unwrap(), set);
    }

    #[test]
    fn test_empty_set() {
        let bytes = encode(&ReferenceSet::new());
        assert_eq!(bytes, vec![0]);
        assert!(decode(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_wide_set_keeps_bytes() {
        let set: ReferenceSet = (1..5000u32).filter(|v| v % 7 != 0).collect();
        let bytes = encode(&set);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, set);
        assert_eq!(encode(&decoded), bytes);
    }

    #[test]
    fn test_rejects_malformed_payloads() {
        let cases: &[(&str, &[u8])] = &[
            ("no bytes", &[]),
            ("truncated range", &[1, 3]),
            ("empty range", &[1, 3, 0]),
            ("touching ranges", &[2, 3, 2, 0, 1]),
            ("trailing bytes", &[1, 3, 2, 7]),
            ("count too large", &[100, 1, 1]),
            ("end overflow", &[1, 0xFF, 0xFF, 0xFF, 0xFF, 0x0F, 1]),
        ];
        for &(name, bytes) in cases {
            let err = decode(bytes).expect_err(name);
            assert!(err.is_corrupt_index(), "{name}: {err}");
        }
    }
}
