//! Telemetry upload payload.

use std::fmt;

use crate::gps::GpsRecord;

/// Battery reading meaning "not measured".
pub const NOT_MEASURED: i32 = -1;

/// Sensor snapshot uploaded to the remote operator.
///
/// Rendered as `|` separated fields:
/// `valid|lat|lon|year|month|day|hour|minute|second|heading|leak|battery1|battery2`.
/// The operator side splits on the separator by position, so the order is
/// part of the protocol. All fields are numeric and never contain `|`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Telemetry {
    pub gps: GpsRecord,
    /// Compass heading, whole degrees.
    pub heading: u16,
    pub leak_alert: u8,
    pub battery1: i32,
    pub battery2: i32,
}

impl Telemetry {
    pub fn new(gps: GpsRecord, heading: u16, leak_alert: u8) -> Self {
        Telemetry {
            gps,
            heading,
            leak_alert,
            battery1: NOT_MEASURED,
            battery2: NOT_MEASURED,
        }
    }

    pub fn with_batteries(mut self, battery1: i32, battery2: i32) -> Self {
        self.battery1 = battery1;
        self.battery2 = battery2;
        self
    }
}

impl fmt::Display for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gps = &self.gps;
        write!(
            f,
            "{}|{:.2}|{:.2}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}",
            gps.valid,
            gps.latitude,
            gps.longitude,
            gps.year,
            gps.month,
            gps.day,
            gps.hour,
            gps.minute,
            gps.second,
            self.heading,
            self.leak_alert,
            self.battery1,
            self.battery2
        )
    }
}

pub fn format_sensor_payload(
    gps: &GpsRecord,
    heading: u16,
    leak_alert: u8,
    battery1: Option<i32>,
    battery2: Option<i32>,
) -> String {
    Telemetry::new(*gps, heading, leak_alert)
        .with_batteries(
            battery1.unwrap_or(NOT_MEASURED),
            battery2.unwrap_or(NOT_MEASURED),
        )
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix() -> GpsRecord {
        GpsRecord {
            valid: 1,
            latitude: 12.34,
            longitude: -56.78,
            year: 2024,
            month: 3,
            day: 15,
            hour: 9,
            minute: 30,
            second: 0,
        }
    }

    #[test]
    fn test_field_order() {
        assert_eq!(
            format_sensor_payload(&fix(), 180, 0, None, None),
            "1|12.34|-56.78|2024|3|15|9|30|0|180|0|-1|-1"
        );
    }

    #[test]
    fn test_batteries() {
        let telemetry = Telemetry::new(fix(), 359, 1).with_batteries(12, NOT_MEASURED);
        assert_eq!(
            telemetry.to_string(),
            "1|12.34|-56.78|2024|3|15|9|30|0|359|1|12|-1"
        );
    }

    #[test]
    fn test_no_fix() {
        let payload = Telemetry::new(GpsRecord::default(), 0, 0).to_string();
        assert_eq!(payload, "0|0.00|0.00|0|0|0|0|0|0|0|0|-1|-1");
        assert_eq!(payload.split('|').count(), 13);
    }
}
