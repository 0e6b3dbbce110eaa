//! Gateway command logic.

use std::thread::sleep;

use anyhow::Result;

use crate::{
    Command, GpsRecord, Telemetry, Transport, UsablePin, chunk, codec,
    config::Timing,
    constants::{MANEUVER_BYTES_SIZE, URL_FRAME_SIZE},
    protocol::{Opcode, PinMode},
};

/// Bus master talking to one or more gateways.
///
/// Every call blocks for its bus transactions and the settling delays the
/// gateway needs. Nothing is cached between calls.
pub struct Controller<T: Transport> {
    transport: T,
    timing: Timing,
}

#[cfg(feature = "linux-i2c")]
impl Controller<crate::transport::I2cTransport<linux_embedded_hal::I2cdev>> {
    pub fn open(config: &crate::Config) -> Result<Self> {
        let transport = crate::transport::I2cTransport::open(&config.bus)?;
        Ok(Controller::new(transport, config.timing))
    }
}

impl<T: Transport> Controller<T> {
    /// Take over a bus that has just been brought up.
    pub fn new(transport: T, timing: Timing) -> Self {
        let timing = timing.at_least_minimum();
        sleep(timing.startup());
        Controller { transport, timing }
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn transport(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    pub fn pin_mode(&mut self, address: u8, pin: UsablePin, mode: PinMode) -> Result<()> {
        log::debug!("pin_mode {} {:?}", pin, mode);
        self.transport.send(address, Command::pin_mode(pin, mode))?;
        sleep(self.timing.settle());
        Ok(())
    }

    pub fn digital_write(&mut self, address: u8, pin: UsablePin, value: bool) -> Result<()> {
        log::debug!("digital_write {} {}", pin, value);
        self.transport.send(address, Command::digital_write(pin, value))?;
        sleep(self.timing.settle());
        Ok(())
    }

    pub fn digital_read(&mut self, address: u8, pin: UsablePin) -> Result<u8> {
        sleep(self.timing.settle());
        self.transport.send(address, Command::digital_read(pin))?;
        let resp = self.transport.recv(address, Opcode::DigitalRead.response_len())?;
        Ok(resp[0])
    }

    pub fn analog_write(&mut self, address: u8, pin: UsablePin, value: u8) -> Result<()> {
        sleep(self.timing.analog_write());
        log::debug!("analog_write {} {}", pin, value);
        self.transport.send(address, Command::analog_write(pin, value))?;
        Ok(())
    }

    pub fn analog_read(&mut self, address: u8, pin: UsablePin) -> Result<i16> {
        if !pin.is_analog() {
            log::warn!("analog_read on digital pin {}", pin);
        }
        sleep(self.timing.settle());
        self.transport.send(address, Command::analog_read(pin))?;
        let resp = self.transport.recv(address, Opcode::AnalogRead.response_len())?;
        Ok(codec::bytes_to_i16(resp[0], resp[1]))
    }

    /// Maneuver bytes last received by the gateway from the remote operator.
    ///
    /// Bytes the gateway fails to deliver stay zero, so an aborted read can be
    /// told apart from stale data by the caller.
    pub fn maneuver_bytes(&mut self, address: u8) -> Result<[u8; MANEUVER_BYTES_SIZE]> {
        sleep(self.timing.settle());
        let mut buf = [0u8; MANEUVER_BYTES_SIZE];
        self.transport.send(address, Command::GetManeuverBytes)?;
        let resp = self.transport.recv(address, Opcode::GetManeuverBytes.response_len())?;
        buf.copy_from_slice(&resp);
        Ok(buf)
    }

    /// URL last requested by the remote operator.
    ///
    /// The answer is a 32-byte frame: a length byte followed by that many
    /// ASCII bytes. A zero length means no request is pending. A length that
    /// overruns the frame is cut to the frame.
    pub fn requested_url(&mut self, address: u8) -> Result<String> {
        sleep(self.timing.settle());
        self.transport.send(address, Command::GetRequestedUrl)?;
        let resp = self.transport.recv(address, Opcode::GetRequestedUrl.response_len())?;
        let mut len = resp[0] as usize;
        if len >= URL_FRAME_SIZE {
            log::warn!("0x{:02x}: URL length {} overruns the frame", address, len);
            len = URL_FRAME_SIZE - 1;
        }
        Ok(String::from_utf8_lossy(&resp[1..1 + len]).into_owned())
    }

    pub fn gps(&mut self, address: u8) -> Result<GpsRecord> {
        sleep(self.timing.settle());
        self.transport.send(address, Command::GetGps)?;
        let resp = self.transport.recv(address, Opcode::GetGps.response_len())?;
        let gps = GpsRecord::from_raw(&resp)?;
        log::debug!("gps: {:?} {:?}", gps, gps.validity());
        Ok(gps)
    }

    /// Upload `text` in 31-byte chunks. Runs to completion once started;
    /// the gateway does not acknowledge individual chunks.
    pub fn send_string(&mut self, address: u8, text: &str) -> Result<()> {
        sleep(self.timing.settle());
        let chunks = chunk::split(text.as_bytes());
        log::debug!("send_string: {} bytes in {} frames", text.len(), chunks.len());
        for cmd in chunks {
            self.transport.send(address, cmd)?;
            sleep(self.timing.settle());
        }
        Ok(())
    }

    /// Upload a telemetry record. It travels as a plain string upload.
    pub fn send_sensor_data(&mut self, address: u8, telemetry: &Telemetry) -> Result<()> {
        sleep(self.timing.settle());
        let payload = telemetry.to_string();
        log::info!("Sending telemetry: {}", payload);
        self.send_string(address, &payload)
    }
}
