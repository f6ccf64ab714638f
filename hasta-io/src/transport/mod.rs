//! Transport layer for I/O abstraction

use crate::error::{Error, Result};
use std::time::{Duration, Instant};

mod mock;
mod serial;
pub use mock::MockTransport;
pub use serial::SerialTransport;

/// Transport trait for device communication
pub trait Transport: Send {
    /// Read data into buffer, returns number of bytes read (0 on timeout)
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Write data from buffer, returns number of bytes written
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Flush any pending writes (blocking until complete)
    fn flush(&mut self) -> Result<()>;

    /// Check if data is available to read
    fn available(&mut self) -> Result<usize> {
        Ok(0) // Default implementation
    }

    /// Discard any bytes already waiting in the input buffer
    fn clear_input(&mut self) -> Result<usize> {
        let mut discard = [0u8; 256];
        let mut total = 0;
        while self.available()? > 0 {
            let n = self.read(&mut discard)?;
            if n == 0 {
                break;
            }
            total += n;
        }
        Ok(total)
    }

    /// Write the whole buffer, failing if the transport stops accepting bytes
    fn write_all(&mut self, mut data: &[u8]) -> Result<()> {
        while !data.is_empty() {
            match self.write(data)? {
                0 => return Err(Error::Timeout),
                n => data = &data[n..],
            }
        }
        Ok(())
    }
}

/// Fill `buffer` from the transport, giving up once `timeout` has elapsed
///
/// Returns the number of bytes actually read; anything less than
/// `buffer.len()` means the deadline passed first.
pub fn read_within<T: Transport + ?Sized>(
    transport: &mut T,
    buffer: &mut [u8],
    timeout: Duration,
) -> Result<usize> {
    let deadline = Instant::now() + timeout;
    let mut filled = 0;

    while filled < buffer.len() {
        let n = transport.read(&mut buffer[filled..])?;
        filled += n;
        if n == 0 {
            if Instant::now() >= deadline {
                break;
            }
            std::thread::yield_now();
        }
    }

    Ok(filled)
}
