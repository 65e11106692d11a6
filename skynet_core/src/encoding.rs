//! Canonical encoding of primitive values.
//!
//! These encodings are only ever fed into the hasher; they are never sent
//! over the wire. Byte order and length prefixes must match other Skynet
//! implementations exactly, since the resulting digests are signed.

use bytes::{BufMut, Bytes, BytesMut};

/// Size of an encoded number in bytes.
pub const NUMBER_SIZE: usize = 8;

/// Encodes `number` as 8 little-endian bytes.
pub fn encode_number(number: u64) -> [u8; NUMBER_SIZE] {
    number.to_le_bytes()
}

/// Encodes `value` as its length (see [`encode_number`]) followed by the raw
/// bytes.
pub fn encode_string(value: impl AsRef<[u8]>) -> Bytes {
    let value = value.as_ref();
    let mut buf = BytesMut::with_capacity(NUMBER_SIZE + value.len());
    buf.put_u64_le(value.len() as u64);
    buf.put_slice(value);
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_number() {
        let cases: [(u64, [u8; 8]); 7] = [
            (0, [0, 0, 0, 0, 0, 0, 0, 0]),
            (1, [1, 0, 0, 0, 0, 0, 0, 0]),
            (2, [2, 0, 0, 0, 0, 0, 0, 0]),
            (255, [255, 0, 0, 0, 0, 0, 0, 0]),
            (256, [0, 1, 0, 0, 0, 0, 0, 0]),
            (256 * 256, [0, 0, 1, 0, 0, 0, 0, 0]),
            (256 * 256 * 256, [0, 0, 0, 1, 0, 0, 0, 0]),
        ];
        for (number, expected) in cases {
            assert_eq!(encode_number(number), expected, "encoding {number}");
        }
    }

    #[test]
    fn test_encode_number_max() {
        assert_eq!(encode_number(u64::MAX), [0xff; 8]);
    }

    #[test]
    fn test_encode_string() {
        assert_eq!(encode_string("").as_ref(), &[0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(
            encode_string("skynet").as_ref(),
            &[6, 0, 0, 0, 0, 0, 0, 0, 115, 107, 121, 110, 101, 116]
        );
    }

    #[test]
    fn test_encode_string_counts_bytes_not_chars() {
        // "é" is two bytes in UTF-8
        let encoded = encode_string("é");
        assert_eq!(&encoded[..8], &[2, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&encoded[8..], "é".as_bytes());
    }
}
