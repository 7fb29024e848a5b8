//! Transport abstractions for the device link
//!
//! A [`Connector`] opens one byte-stream [`Connection`] to a selected device.
//! Concrete connectors live in [`crate::tcp`] and [`crate::tty`].

use async_trait::async_trait;
use ptt_core::ExternalDevice;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Serial Port Profile service class UUID
pub const SPP_SERVICE_UUID: Uuid = Uuid::from_u128(0x0000_1101_0000_1000_8000_0080_5f9b_34fb);

/// Boxed byte stream read by the frame reader
pub type ByteStream = Box<dyn AsyncRead + Send + Unpin>;

/// Lifecycle of the single device connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Nothing attempted yet
    Unconnected,
    /// Handshake in progress
    Connecting,
    /// Stream open and being read
    Open,
    /// Closed by teardown or end of stream
    Closed,
    /// Connect or read failed
    Failed,
}

/// Trait for opening a connection to a device
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a byte stream to `device` for the given service.
    ///
    /// On error nothing is left open.
    async fn connect(&self, device: &ExternalDevice, service: Uuid) -> io::Result<Connection>;
}

/// Cloneable close signal for a [`Connection`]
///
/// Safe to fire from any thread, any number of times, including while a
/// read is pending.
#[derive(Debug, Clone, Default)]
pub struct CloseHandle {
    token: CancellationToken,
}

impl CloseHandle {
    /// Close the connection
    pub fn close(&self) {
        self.token.cancel();
    }

    /// Whether close has been called
    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// An open byte stream to one device
pub struct Connection {
    device: ExternalDevice,
    /// Dropped (releasing the descriptor) once the close is observed
    stream: Option<ByteStream>,
    closer: CloseHandle,
}

impl Connection {
    /// Wrap an opened stream
    pub fn new(device: ExternalDevice, stream: ByteStream) -> Self {
        Self {
            device,
            stream: Some(stream),
            closer: CloseHandle::default(),
        }
    }

    /// Device this connection is bound to
    pub fn device(&self) -> &ExternalDevice {
        &self.device
    }

    /// Handle that closes this connection from elsewhere
    pub fn close_handle(&self) -> CloseHandle {
        self.closer.clone()
    }

    /// Close the connection (idempotent)
    pub fn close(&self) {
        self.closer.close();
    }

    /// Whether the connection has been closed
    pub fn is_closed(&self) -> bool {
        self.closer.is_closed()
    }

    /// Read up to `buf.len()` bytes; `Ok(0)` is end of stream.
    ///
    /// Closing the connection fails a pending read and every later one with
    /// `ConnectionAborted`, and drops the underlying stream.
    pub async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let result = match self.stream.as_mut() {
            Some(stream) if !self.closer.is_closed() => {
                tokio::select! {
                    biased;
                    _ = self.closer.token.cancelled() => Err(closed_error()),
                    result = stream.read(buf) => result,
                }
            }
            _ => Err(closed_error()),
        };
        if self.closer.is_closed() {
            self.stream = None;
        }
        result
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("device", &self.device)
            .field("closed", &self.closer.is_closed())
            .field("released", &self.stream.is_none())
            .finish_non_exhaustive()
    }
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::ConnectionAborted, "connection closed")
}
