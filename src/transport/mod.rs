//! Abstract gateway bus interface.
use anyhow::Result;

use crate::protocol::Command;

pub use self::i2c::I2cTransport;

mod i2c;

/// Abstraction of the bus the gateway hangs off.
/// Usually an I2C master, but anything that can address a peripheral works.
pub trait Transport {
    /// Write one frame to the peripheral at `address` in a single transaction.
    fn write_raw(&mut self, address: u8, raw: &[u8]) -> Result<()>;
    /// Read up to `buf.len()` bytes from the peripheral at `address`,
    /// returning how many were actually delivered.
    fn read_raw(&mut self, address: u8, buf: &mut [u8]) -> Result<usize>;

    fn send(&mut self, address: u8, cmd: Command) -> Result<()> {
        let req = cmd.into_raw()?;
        log::debug!("0x{:02x} => {}", address, hex::encode(&req));
        self.write_raw(address, &req)
    }

    /// Read a fixed-length response.
    ///
    /// The buffer is zeroed before the read, so whatever the gateway failed to
    /// deliver reads back as zero rather than stale data.
    fn recv(&mut self, address: u8, len: usize) -> Result<Vec<u8>> {
        let mut resp = vec![0u8; len];
        let nread = self.read_raw(address, &mut resp)?;
        if nread < len {
            log::warn!(
                "0x{:02x}: short read, got {} of {} bytes",
                address,
                nread,
                len
            );
        }
        log::debug!("0x{:02x} <= {}", address, hex::encode(&resp));
        Ok(resp)
    }
}
