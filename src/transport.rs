//! Byte-stream transport underneath a device session.

use std::io;
use std::time::Duration;

use log::debug;
use serialport::{ClearBuffer, SerialPort};

use crate::config::SerialConfig;
use crate::error::Error;

/// A duplex byte stream to the sensor. Exclusively owned by one
/// [`crate::DeviceSession`]; the protocol has no framing beyond byte order,
/// so concurrent use must be serialized by the caller.
pub trait Transport {
    /// Writes the whole buffer to the device.
    fn send(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Reads up to `buf.len()` bytes, waiting at most `timeout` for the
    /// first of them. Returns the number of bytes read; 0 means the device
    /// stayed silent for the whole window.
    fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize>;

    /// Pushes any buffered outgoing bytes onto the wire.
    fn flush(&mut self) -> io::Result<()>;
}

/// [`Transport`] over a physical or virtual serial port.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Opens the configured endpoint and discards any stale bytes the OS
    /// buffered while no session was attached.
    pub fn open(config: &SerialConfig) -> Result<SerialTransport, Error> {
        let port = serialport::new(config.path.as_str(), config.baud_rate)
            .timeout(config.timeout)
            .open()
            .map_err(io::Error::from)?;
        port.clear(ClearBuffer::All).map_err(io::Error::from)?;
        debug!("opened {} at {} baud", config.path, config.baud_rate);
        Ok(SerialTransport { port })
    }
}

impl Transport for SerialTransport {
    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.port.write_all(bytes)
    }

    fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        self.port.set_timeout(timeout).map_err(io::Error::from)?;
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}
