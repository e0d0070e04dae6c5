// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Variable-length quantities.
//!
//! Standard MIDI files store delta times as big-endian groups of seven
//! bits. Every byte except the last has its high bit set. A quantity is
//! at most four bytes long, which caps values at `0x0FFF_FFFF`.

use thiserror::Error;

/// Largest value a four-byte VLQ can hold
pub const MAX_VALUE: u32 = 0x0FFF_FFFF;

/// Maximum encoded length in bytes
pub const MAX_LEN: usize = 4;

/// VLQ encode/decode errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VlqError {
    /// Value needs more than four bytes
    #[error("value {0} exceeds the VLQ maximum of 0x0FFFFFFF")]
    ValueTooLarge(u32),
    /// Input ended while a continuation bit was still set
    #[error("VLQ truncated after {0} bytes")]
    Truncated(usize),
    /// More than four bytes carried a continuation bit
    #[error("VLQ longer than 4 bytes")]
    TooLong,
}

/// Append the VLQ encoding of `value` to `buffer`.
pub fn write(value: u32, buffer: &mut Vec<u8>) -> Result<(), VlqError> {
    if value > MAX_VALUE {
        return Err(VlqError::ValueTooLarge(value));
    }

    // Peel the low seven bits first; only the first-peeled group
    // goes out without a continuation bit.
    let mut groups = [0u8; MAX_LEN];
    let mut count = 0;
    let mut remaining = value;

    groups[count] = (remaining & 0x7F) as u8;
    count += 1;
    remaining >>= 7;

    while remaining > 0 {
        groups[count] = (remaining & 0x7F) as u8 | 0x80;
        count += 1;
        remaining >>= 7;
    }

    buffer.extend(groups[..count].iter().rev());
    Ok(())
}

/// Encode `value` as a fresh byte vector.
pub fn encode(value: u32) -> Result<Vec<u8>, VlqError> {
    let mut bytes = Vec::with_capacity(MAX_LEN);
    write(value, &mut bytes)?;
    Ok(bytes)
}

/// Decode a VLQ from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed.
pub fn decode(bytes: &[u8]) -> Result<(u32, usize), VlqError> {
    let mut value = 0u32;

    for (i, &byte) in bytes.iter().enumerate() {
        if i >= MAX_LEN {
            return Err(VlqError::TooLong);
        }
        value = (value << 7) | u32::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }

    if bytes.len() >= MAX_LEN {
        Err(VlqError::TooLong)
    } else {
        Err(VlqError::Truncated(bytes.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_zero() {
        assert_eq!(encode(0).unwrap(), vec![0x00]);
    }

    #[test]
    fn test_encode_boundaries() {
        assert_eq!(encode(127).unwrap(), vec![0x7F]);
        assert_eq!(encode(128).unwrap(), vec![0x81, 0x00]);
        assert_eq!(encode(16383).unwrap(), vec![0xFF, 0x7F]);
        assert_eq!(encode(16384).unwrap(), vec![0x81, 0x80, 0x00]);
        assert_eq!(encode(2_097_151).unwrap(), vec![0xFF, 0xFF, 0x7F]);
        assert_eq!(encode(2_097_152).unwrap(), vec![0x81, 0x80, 0x80, 0x00]);
        assert_eq!(encode(MAX_VALUE).unwrap(), vec![0xFF, 0xFF, 0xFF, 0x7F]);
    }

    #[test]
    fn test_encode_300() {
        // 300 = 0b10_0101100 -> groups 0x02, 0x2C
        assert_eq!(encode(300).unwrap(), vec![0x82, 0x2C]);
    }

    #[test]
    fn test_write_appends() {
        let mut buffer = vec![0xAA];
        write(96, &mut buffer).unwrap();
        write(300, &mut buffer).unwrap();
        assert_eq!(buffer, vec![0xAA, 0x60, 0x82, 0x2C]);
    }

    #[test]
    fn test_encode_too_large() {
        assert_eq!(encode(MAX_VALUE + 1), Err(VlqError::ValueTooLarge(MAX_VALUE + 1)));

        // Nothing is written on failure
        let mut buffer = Vec::new();
        assert!(write(u32::MAX, &mut buffer).is_err());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_round_trip() {
        for value in [0, 1, 127, 128, 300, 16383, 16384, 2_097_151, 2_097_152, MAX_VALUE] {
            let bytes = encode(value).unwrap();
            assert_eq!(decode(&bytes), Ok((value, bytes.len())), "value {}", value);
        }
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        assert_eq!(decode(&[0x60, 0x80, 0x3C]), Ok((96, 1)));
    }

    #[test]
    fn test_decode_truncated() {
        assert_eq!(decode(&[]), Err(VlqError::Truncated(0)));
        assert_eq!(decode(&[0x81, 0x80]), Err(VlqError::Truncated(2)));
    }

    #[test]
    fn test_decode_too_long() {
        assert_eq!(decode(&[0x81, 0x80, 0x80, 0x80, 0x00]), Err(VlqError::TooLong));
        assert_eq!(decode(&[0x81, 0x80, 0x80, 0x80]), Err(VlqError::TooLong));
    }
}
