//! GPS fix as reported by the gateway.

use anyhow::Result;
use bitfield::bitfield;
use serde::Serialize;

use crate::codec;
use crate::constants::GPS_FRAME_SIZE;

bitfield! {
    /// Validity flags of a GPS frame. Bits 5..=7 are reserved and ignored.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct GpsValidity(u8);
    impl Debug;
    pub location, _: 0;
    pub altitude, _: 1;
    pub date, _: 2;
    pub time, _: 3;
    pub speed, _: 4;
}

impl GpsValidity {
    pub const fn from_bits(raw: u8) -> Self {
        GpsValidity(raw)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }
}

/// Decoded GPS frame.
///
/// A frame may carry any subset of valid fields, check [`GpsRecord::validity`]
/// before trusting one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GpsRecord {
    pub valid: u8,
    pub latitude: f32,
    pub longitude: f32,
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl GpsRecord {
    /// Frame layout:
    ///
    /// | byte   | field     |
    /// |--------|-----------|
    /// | 0      | validity  |
    /// | 1..=4  | latitude  |
    /// | 5..=8  | longitude |
    /// | 9      | day       |
    /// | 10     | month     |
    /// | 11..=12| year      |
    /// | 13     | hour      |
    /// | 14     | minute    |
    /// | 15     | second    |
    pub fn from_raw(raw: &[u8]) -> Result<Self> {
        anyhow::ensure!(
            raw.len() >= GPS_FRAME_SIZE,
            "GPS frame too short: {} bytes",
            raw.len()
        );
        Ok(GpsRecord {
            valid: raw[0],
            latitude: codec::read_f32(raw, 1)?,
            longitude: codec::read_f32(raw, 5)?,
            day: raw[9],
            month: raw[10],
            year: codec::read_u16(raw, 11)?,
            hour: raw[13],
            minute: raw[14],
            second: raw[15],
        })
    }

    /// Inverse of [`GpsRecord::from_raw`], the frame a gateway would send.
    pub fn into_raw(self) -> [u8; GPS_FRAME_SIZE] {
        let mut raw = [0u8; GPS_FRAME_SIZE];
        raw[0] = self.valid;
        raw[1..5].copy_from_slice(&codec::f32_to_bytes(self.latitude));
        raw[5..9].copy_from_slice(&codec::f32_to_bytes(self.longitude));
        raw[9] = self.day;
        raw[10] = self.month;
        raw[11..13].copy_from_slice(&self.year.to_le_bytes());
        raw[13] = self.hour;
        raw[14] = self.minute;
        raw[15] = self.second;
        raw
    }

    pub fn validity(&self) -> GpsValidity {
        GpsValidity::from_bits(self.valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> Vec<u8> {
        let mut raw = vec![0b0000_0011];
        raw.extend_from_slice(&codec::f32_to_bytes(10.0));
        raw.extend_from_slice(&codec::f32_to_bytes(20.0));
        raw.push(5);
        raw.push(6);
        raw.extend_from_slice(&codec::i16_to_bytes(2023));
        raw.extend_from_slice(&[1, 2, 3]);
        raw
    }

    #[test]
    fn test_decode_frame() {
        let gps = GpsRecord::from_raw(&sample_frame()).unwrap();
        assert_eq!(gps.valid, 3);
        assert_eq!(gps.latitude, 10.0);
        assert_eq!(gps.longitude, 20.0);
        assert_eq!(gps.day, 5);
        assert_eq!(gps.month, 6);
        assert_eq!(gps.year, 2023);
        assert_eq!((gps.hour, gps.minute, gps.second), (1, 2, 3));

        let validity = gps.validity();
        assert!(validity.location());
        assert!(validity.altitude());
        assert!(!validity.date());
        assert!(!validity.time());
        assert!(!validity.speed());
    }

    #[test]
    fn test_reserved_bits_ignored() {
        let validity = GpsValidity::from_bits(0b1110_0100);
        assert!(validity.date());
        assert!(!validity.location());
        assert!(!validity.speed());
        assert_eq!(validity.bits(), 0b1110_0100);
    }

    #[test]
    fn test_short_frame_rejected() {
        assert!(GpsRecord::from_raw(&sample_frame()[..15]).is_err());
    }

    #[test]
    fn test_encode_matches_decode() {
        let raw = sample_frame();
        let gps = GpsRecord::from_raw(&raw).unwrap();
        assert_eq!(gps.into_raw().to_vec(), raw);
    }
}
