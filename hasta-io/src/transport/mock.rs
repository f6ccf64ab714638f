//! Mock transport for testing

use super::Transport;
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Produces the bytes a simulated device sends back for one written frame
pub type Responder = Box<dyn FnMut(&[u8]) -> Vec<u8> + Send>;

/// Mock transport for unit testing
///
/// Clones share the same buffers, so a test can keep one handle while the
/// control cycle owns the other.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

struct MockTransportInner {
    read_buffer: VecDeque<u8>,
    write_buffer: Vec<u8>,
    /// Maximum bytes returned by a single read (0 = unlimited)
    read_chunk: usize,
    responder: Option<Responder>,
    disconnected: bool,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        MockTransport {
            inner: Arc::new(Mutex::new(MockTransportInner {
                read_buffer: VecDeque::new(),
                write_buffer: Vec::new(),
                read_chunk: 0,
                responder: None,
                disconnected: false,
            })),
        }
    }

    /// Inject data to be read
    pub fn inject_read(&self, data: &[u8]) {
        self.inner.lock().read_buffer.extend(data);
    }

    /// Get all written data
    pub fn get_written(&self) -> Vec<u8> {
        self.inner.lock().write_buffer.clone()
    }

    /// Clear written data
    pub fn clear_written(&self) {
        self.inner.lock().write_buffer.clear();
    }

    /// Clear read buffer
    pub fn clear_read(&self) {
        self.inner.lock().read_buffer.clear();
    }

    /// Bytes injected or answered but not yet read
    pub fn pending_read(&self) -> usize {
        self.inner.lock().read_buffer.len()
    }

    /// Limit how many bytes each read returns, to exercise partial reads
    pub fn set_read_chunk(&self, chunk: usize) {
        self.inner.lock().read_chunk = chunk;
    }

    /// Answer every write with the bytes returned by `responder`
    pub fn set_responder<F>(&self, responder: F)
    where
        F: FnMut(&[u8]) -> Vec<u8> + Send + 'static,
    {
        self.inner.lock().responder = Some(Box::new(responder));
    }

    /// Make every read and write fail as if the port went away
    pub fn set_disconnected(&self, disconnected: bool) {
        self.inner.lock().disconnected = disconnected;
    }
}

fn broken_pipe() -> Error {
    Error::Io(std::io::Error::new(
        std::io::ErrorKind::BrokenPipe,
        "mock transport disconnected",
    ))
}

impl Transport for MockTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut inner = self.inner.lock();
        if inner.disconnected {
            return Err(broken_pipe());
        }

        let mut available = inner.read_buffer.len().min(buffer.len());
        if inner.read_chunk > 0 {
            available = available.min(inner.read_chunk);
        }

        for (slot, byte) in buffer
            .iter_mut()
            .zip(inner.read_buffer.drain(..available))
        {
            *slot = byte;
        }

        Ok(available)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        if inner.disconnected {
            return Err(broken_pipe());
        }

        inner.write_buffer.extend_from_slice(data);
        if let Some(responder) = inner.responder.as_mut() {
            let reply = responder(data);
            inner.read_buffer.extend(reply);
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn available(&mut self) -> Result<usize> {
        Ok(self.inner.lock().read_buffer.len())
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}
