//! Numeric values as the gateway lays them out on the wire.
//!
//! The gateway transmits the raw in-memory image of its numbers, so the
//! master has to rebuild them with the exact same byte placement. The gateway
//! is an AVR part, which is little-endian: the first byte received is the
//! least significant one. That order is fixed here and never taken from the
//! host.

use anyhow::Result;
use scroll::{Endian, Pread};

/// Byte order of every multi-byte value in a gateway frame. The fixed-size
/// helpers below spell it out with `from_le_bytes`/`to_le_bytes`.
pub const BYTE_ORDER: Endian = scroll::LE;

/// Rebuild a signed 16-bit value from two bytes in the order received.
pub fn bytes_to_i16(first: u8, second: u8) -> i16 {
    i16::from_le_bytes([first, second])
}

/// Rebuild an IEEE-754 single from four bytes in the order received.
///
/// NaN and infinity patterns are passed through untouched.
pub fn bytes_to_f32(b0: u8, b1: u8, b2: u8, b3: u8) -> f32 {
    f32::from_bits(u32::from_le_bytes([b0, b1, b2, b3]))
}

pub fn i16_to_bytes(value: i16) -> [u8; 2] {
    value.to_le_bytes()
}

pub fn f32_to_bytes(value: f32) -> [u8; 4] {
    value.to_bits().to_le_bytes()
}

pub fn read_i16(raw: &[u8], offset: usize) -> Result<i16> {
    Ok(raw.pread_with::<i16>(offset, BYTE_ORDER)?)
}

pub fn read_u16(raw: &[u8], offset: usize) -> Result<u16> {
    Ok(raw.pread_with::<u16>(offset, BYTE_ORDER)?)
}

pub fn read_f32(raw: &[u8], offset: usize) -> Result<f32> {
    Ok(raw.pread_with::<f32>(offset, BYTE_ORDER)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i16_full_range() {
        for value in i16::MIN..=i16::MAX {
            let [first, second] = i16_to_bytes(value);
            assert_eq!(bytes_to_i16(first, second), value);
        }
    }

    #[test]
    fn test_i16_byte_order() {
        assert_eq!(bytes_to_i16(0x01, 0x00), 1);
        assert_eq!(bytes_to_i16(0x00, 0x01), 256);
        assert_eq!(bytes_to_i16(0xff, 0xff), -1);
        assert_eq!(bytes_to_i16(0x00, 0x80), i16::MIN);
        assert_eq!(i16_to_bytes(2023), [0xe7, 0x07]);
    }

    #[test]
    fn test_f32_roundtrip() {
        let values = [
            0.0f32,
            -0.0,
            1.0,
            -1.0,
            12.34,
            -56.78,
            f32::MAX,
            f32::MIN_POSITIVE,
            f32::MIN_POSITIVE / 4.0, // subnormal
            -f32::MIN_POSITIVE / 8.0,
            f32::INFINITY,
        ];
        for value in values {
            let [b0, b1, b2, b3] = f32_to_bytes(value);
            let decoded = bytes_to_f32(b0, b1, b2, b3);
            assert_eq!(decoded.to_bits(), value.to_bits(), "{}", value);
        }
    }

    #[test]
    fn test_f32_nan_passes_through() {
        let bits = 0x7fc0_1234u32;
        let [b0, b1, b2, b3] = bits.to_le_bytes();
        let decoded = bytes_to_f32(b0, b1, b2, b3);
        assert!(decoded.is_nan());
        assert_eq!(decoded.to_bits(), bits);
    }

    #[test]
    fn test_slice_readers() {
        let raw = [0xaa, 0x00, 0x00, 0x20, 0x41, 0xe7, 0x07];
        assert_eq!(read_f32(&raw, 1).unwrap(), 10.0);
        assert_eq!(read_u16(&raw, 5).unwrap(), 2023);
        assert_eq!(read_i16(&raw, 5).unwrap(), 2023);
        assert!(read_f32(&raw, 4).is_err());
    }
}
