/// Bus address the gateway firmware listens on by default.
pub const DEFAULT_GATEWAY_ADDRESS: u8 = 0x40;

/// Largest frame the gateway accepts in a single bus transaction.
pub const MAX_FRAME_SIZE: usize = 32;
/// Text bytes carried by one string-transfer frame, after the opcode byte.
pub const CHUNK_PAYLOAD_SIZE: usize = MAX_FRAME_SIZE - 1;

pub const MANEUVER_BYTES_SIZE: usize = 6;
pub const GPS_FRAME_SIZE: usize = 16;
pub const URL_FRAME_SIZE: usize = 32;

pub mod commands {
    pub const PIN_MODE: u8 = 10;
    pub const DIGITAL_WRITE: u8 = 11;
    pub const DIGITAL_READ: u8 = 12;
    pub const ANALOG_WRITE: u8 = 13;
    pub const ANALOG_READ: u8 = 14;
    pub const GET_MANEUVER_BYTES: u8 = 15;
    pub const GET_REQUESTED_URL: u8 = 16;
    pub const GET_GPS: u8 = 17;
    pub const SEND_SENSOR_DATA: u8 = 18;
    pub const SEND_STRING: u8 = 19;
    pub const SEND_STRING_CONTINUED: u8 = 20;
}

/// Minimum settling delays, in milliseconds.
///
/// The gateway services the bus from an interrupt handler and needs this much
/// time between transactions. Configuration may lengthen them, never shorten.
pub mod delays {
    pub const STARTUP_MS: u64 = 10;
    pub const SETTLE_MS: u64 = 5;
    pub const ANALOG_WRITE_MS: u64 = 7;
}
