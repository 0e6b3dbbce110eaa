//! The binary command protocol spoken to the gateway

use std::{fmt, str::FromStr};

use anyhow::Result;
use clap::{ValueEnum, builder::PossibleValue};

use crate::constants::{
    CHUNK_PAYLOAD_SIZE, GPS_FRAME_SIZE, MANEUVER_BYTES_SIZE, MAX_FRAME_SIZE, URL_FRAME_SIZE,
    commands,
};

/// First byte of every request frame.
///
/// Request and response lengths are fixed per opcode, there is no length
/// negotiation on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Opcode {
    PinMode = commands::PIN_MODE,
    DigitalWrite = commands::DIGITAL_WRITE,
    DigitalRead = commands::DIGITAL_READ,
    AnalogWrite = commands::ANALOG_WRITE,
    AnalogRead = commands::ANALOG_READ,
    GetManeuverBytes = commands::GET_MANEUVER_BYTES,
    GetRequestedUrl = commands::GET_REQUESTED_URL,
    GetGps = commands::GET_GPS,
    /// Reserved by the gateway firmware. Telemetry actually travels as a
    /// string upload, see `Controller::send_sensor_data`.
    SendSensorData = commands::SEND_SENSOR_DATA,
    SendString = commands::SEND_STRING,
    SendStringContinued = commands::SEND_STRING_CONTINUED,
}

impl Opcode {
    pub const ALL: [Opcode; 11] = [
        Opcode::PinMode,
        Opcode::DigitalWrite,
        Opcode::DigitalRead,
        Opcode::AnalogWrite,
        Opcode::AnalogRead,
        Opcode::GetManeuverBytes,
        Opcode::GetRequestedUrl,
        Opcode::GetGps,
        Opcode::SendSensorData,
        Opcode::SendString,
        Opcode::SendStringContinued,
    ];

    /// Total request frame length, opcode byte included.
    pub const fn request_len(self) -> usize {
        match self {
            Opcode::PinMode | Opcode::DigitalWrite | Opcode::AnalogWrite => 3,
            Opcode::DigitalRead | Opcode::AnalogRead => 2,
            Opcode::GetManeuverBytes | Opcode::GetRequestedUrl | Opcode::GetGps => 1,
            Opcode::SendSensorData | Opcode::SendString | Opcode::SendStringContinued => {
                MAX_FRAME_SIZE
            }
        }
    }

    /// Number of bytes the gateway answers with, zero for write-only commands.
    pub const fn response_len(self) -> usize {
        match self {
            Opcode::PinMode
            | Opcode::DigitalWrite
            | Opcode::AnalogWrite
            | Opcode::SendSensorData
            | Opcode::SendString
            | Opcode::SendStringContinued => 0,
            Opcode::DigitalRead => 1,
            Opcode::AnalogRead => 2,
            Opcode::GetManeuverBytes => MANEUVER_BYTES_SIZE,
            Opcode::GetRequestedUrl => URL_FRAME_SIZE,
            Opcode::GetGps => GPS_FRAME_SIZE,
        }
    }
}

impl From<Opcode> for u8 {
    fn from(value: Opcode) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for Opcode {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self> {
        Opcode::ALL
            .into_iter()
            .find(|op| *op as u8 == value)
            .ok_or_else(|| anyhow::format_err!("Unknown gateway opcode {}", value))
    }
}

/// Pins the gateway exposes. A4/A5 carry the bus itself and are not usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum UsablePin {
    D2 = 2,
    D3 = 3,
    D4 = 4,
    D5 = 5,
    D6 = 6,
    D7 = 7,
    D10 = 10,
    D11 = 11,
    D12 = 12,
    D13 = 13,
    A0 = 14,
    A1 = 15,
    A2 = 16,
    A3 = 17,
    A6 = 20,
    A7 = 21,
}

impl UsablePin {
    pub const ALL: [UsablePin; 16] = [
        UsablePin::D2,
        UsablePin::D3,
        UsablePin::D4,
        UsablePin::D5,
        UsablePin::D6,
        UsablePin::D7,
        UsablePin::D10,
        UsablePin::D11,
        UsablePin::D12,
        UsablePin::D13,
        UsablePin::A0,
        UsablePin::A1,
        UsablePin::A2,
        UsablePin::A3,
        UsablePin::A6,
        UsablePin::A7,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            UsablePin::D2 => "D2",
            UsablePin::D3 => "D3",
            UsablePin::D4 => "D4",
            UsablePin::D5 => "D5",
            UsablePin::D6 => "D6",
            UsablePin::D7 => "D7",
            UsablePin::D10 => "D10",
            UsablePin::D11 => "D11",
            UsablePin::D12 => "D12",
            UsablePin::D13 => "D13",
            UsablePin::A0 => "A0",
            UsablePin::A1 => "A1",
            UsablePin::A2 => "A2",
            UsablePin::A3 => "A3",
            UsablePin::A6 => "A6",
            UsablePin::A7 => "A7",
        }
    }

    pub const fn is_analog(self) -> bool {
        (self as u8) >= UsablePin::A0 as u8
    }
}

impl fmt::Display for UsablePin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), *self as u8)
    }
}

impl TryFrom<u8> for UsablePin {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self> {
        UsablePin::ALL
            .into_iter()
            .find(|pin| *pin as u8 == value)
            .ok_or_else(|| anyhow::format_err!("Pin {} is not usable on the gateway", value))
    }
}

impl FromStr for UsablePin {
    type Err = anyhow::Error;

    /// Accepts a pin name (`d5`, `A0`) or its wire number (`5`, `14`).
    fn from_str(s: &str) -> Result<Self> {
        if let Ok(number) = s.parse::<u8>() {
            return UsablePin::try_from(number);
        }
        UsablePin::ALL
            .into_iter()
            .find(|pin| pin.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::format_err!("Unknown gateway pin {:?}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum PinMode {
    #[default]
    Input = 0,
    Output = 1,
    InputPullup = 2,
}

impl ValueEnum for PinMode {
    fn value_variants<'a>() -> &'a [Self] {
        &[PinMode::Input, PinMode::Output, PinMode::InputPullup]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        match self {
            PinMode::Input => Some(PossibleValue::new("input").aliases(["in", "0"])),
            PinMode::Output => Some(PossibleValue::new("output").aliases(["out", "1"])),
            PinMode::InputPullup => {
                Some(PossibleValue::new("input-pullup").aliases(["pullup", "2"]))
            }
        }
    }
}

/// Gateway request
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Command {
    /// Configure a pin direction.
    PinMode { pin: UsablePin, mode: PinMode },
    /// Drive a digital output. The value travels as 0 or 1.
    DigitalWrite { pin: UsablePin, value: bool },
    /// Sample a digital input. Answered with one byte.
    DigitalRead { pin: UsablePin },
    /// PWM duty cycle, 0..=255.
    AnalogWrite { pin: UsablePin, value: u8 },
    /// ADC sample. Answered with a 2-byte signed value.
    AnalogRead { pin: UsablePin },
    /// Fetch the maneuver bytes the remote operator last sent to the gateway.
    GetManeuverBytes,
    /// Fetch the URL the remote operator last requested.
    GetRequestedUrl,
    /// Fetch the last GPS fix. Answered with a 16-byte frame.
    GetGps,
    /// First chunk of a string upload, at most 31 bytes.
    SendString(Vec<u8>),
    /// Any following chunk of a string upload, at most 31 bytes.
    SendStringContinued(Vec<u8>),
}

impl Command {
    pub fn pin_mode(pin: UsablePin, mode: PinMode) -> Self {
        Command::PinMode { pin, mode }
    }

    pub fn digital_write(pin: UsablePin, value: bool) -> Self {
        Command::DigitalWrite { pin, value }
    }

    pub fn digital_read(pin: UsablePin) -> Self {
        Command::DigitalRead { pin }
    }

    pub fn analog_write(pin: UsablePin, value: u8) -> Self {
        Command::AnalogWrite { pin, value }
    }

    pub fn analog_read(pin: UsablePin) -> Self {
        Command::AnalogRead { pin }
    }

    pub fn opcode(&self) -> Opcode {
        match self {
            Command::PinMode { .. } => Opcode::PinMode,
            Command::DigitalWrite { .. } => Opcode::DigitalWrite,
            Command::DigitalRead { .. } => Opcode::DigitalRead,
            Command::AnalogWrite { .. } => Opcode::AnalogWrite,
            Command::AnalogRead { .. } => Opcode::AnalogRead,
            Command::GetManeuverBytes => Opcode::GetManeuverBytes,
            Command::GetRequestedUrl => Opcode::GetRequestedUrl,
            Command::GetGps => Opcode::GetGps,
            Command::SendString(_) => Opcode::SendString,
            Command::SendStringContinued(_) => Opcode::SendStringContinued,
        }
    }

    /// Encode the request frame. The length is implied by the opcode alone,
    /// both sides know it out of band.
    pub fn into_raw(self) -> Result<Vec<u8>> {
        let opcode = u8::from(self.opcode());
        match self {
            Command::PinMode { pin, mode } => Ok(vec![opcode, pin as u8, mode as u8]),
            Command::DigitalWrite { pin, value } => Ok(vec![opcode, pin as u8, value as u8]),
            Command::AnalogWrite { pin, value } => Ok(vec![opcode, pin as u8, value]),
            Command::DigitalRead { pin } | Command::AnalogRead { pin } => {
                Ok(vec![opcode, pin as u8])
            }
            Command::GetManeuverBytes | Command::GetRequestedUrl | Command::GetGps => {
                Ok(vec![opcode])
            }
            Command::SendString(payload) | Command::SendStringContinued(payload) => {
                anyhow::ensure!(
                    payload.len() <= CHUNK_PAYLOAD_SIZE,
                    "string chunk of {} bytes exceeds {} bytes",
                    payload.len(),
                    CHUNK_PAYLOAD_SIZE
                );
                // zero padding doubles as the terminator of a short final chunk
                let mut buf = vec![0u8; MAX_FRAME_SIZE];
                buf[0] = opcode;
                buf[1..1 + payload.len()].copy_from_slice(&payload);
                Ok(buf)
            }
        }
    }
}
