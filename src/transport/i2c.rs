//! I2C Transportation.
use std::fmt::Debug;

use anyhow::Result;
use embedded_hal::blocking::i2c::{Read, Write};

use super::Transport;

/// Gateway link over any blocking `embedded-hal` I2C master.
pub struct I2cTransport<I2C> {
    i2c_bus: I2C,
}

impl<I2C> I2cTransport<I2C> {
    pub fn new(i2c_bus: I2C) -> Self {
        I2cTransport { i2c_bus }
    }

    pub fn release(self) -> I2C {
        self.i2c_bus
    }
}

#[cfg(feature = "linux-i2c")]
impl I2cTransport<linux_embedded_hal::I2cdev> {
    pub fn open(path: &str) -> Result<Self> {
        log::info!("Opening I2C bus: \"{}\"", path);
        let i2c_bus = linux_embedded_hal::I2cdev::new(path)
            .map_err(|e| anyhow::format_err!("cannot open {}: {}", path, e))?;
        Ok(I2cTransport::new(i2c_bus))
    }
}

impl<I2C, E> Transport for I2cTransport<I2C>
where
    I2C: Write<Error = E> + Read<Error = E>,
    E: Debug,
{
    fn write_raw(&mut self, address: u8, raw: &[u8]) -> Result<()> {
        self.i2c_bus
            .write(address, raw)
            .map_err(|e| anyhow::format_err!("I2C write to 0x{:02x} failed: {:?}", address, e))
    }

    fn read_raw(&mut self, address: u8, buf: &mut [u8]) -> Result<usize> {
        self.i2c_bus
            .read(address, buf)
            .map_err(|e| anyhow::format_err!("I2C read from 0x{:02x} failed: {:?}", address, e))?;
        Ok(buf.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bus double answering every read with an incrementing byte pattern.
    #[derive(Default)]
    struct FakeBus {
        writes: Vec<(u8, Vec<u8>)>,
        fail: bool,
    }

    impl Write for FakeBus {
        type Error = &'static str;

        fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
            if self.fail {
                return Err("nack");
            }
            self.writes.push((address, bytes.to_vec()));
            Ok(())
        }
    }

    impl Read for FakeBus {
        type Error = &'static str;

        fn read(&mut self, _address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
            if self.fail {
                return Err("nack");
            }
            for (i, b) in buffer.iter_mut().enumerate() {
                *b = i as u8 + 1;
            }
            Ok(())
        }
    }

    #[test]
    fn test_write_and_read_through_hal() {
        let mut transport = I2cTransport::new(FakeBus::default());
        transport
            .send(0x40, crate::Command::digital_read(crate::UsablePin::D4))
            .unwrap();
        let resp = transport.recv(0x40, 2).unwrap();
        assert_eq!(resp, vec![1, 2]);

        let bus = transport.release();
        assert_eq!(bus.writes, vec![(0x40, vec![12, 4])]);
    }

    #[test]
    fn test_bus_errors_propagate() {
        let mut transport = I2cTransport::new(FakeBus {
            fail: true,
            ..Default::default()
        });
        let err = transport.write_raw(0x40, &[17]).unwrap_err();
        assert!(err.to_string().contains("0x40"));
        assert!(transport.recv(0x40, 16).is_err());
    }
}
