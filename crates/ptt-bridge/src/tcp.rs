//! TCP transport implementation
//!
//! Used when the RFCOMM link is terminated by a relay (or an emulator) that
//! exposes the device's serial stream on a TCP port.

use crate::transport::{Connection, Connector};
use async_trait::async_trait;
use ptt_core::ExternalDevice;
use std::collections::HashMap;
use std::io;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{debug, info};
use uuid::Uuid;

/// Connector that reaches each device through a TCP relay address
#[derive(Debug, Clone)]
pub struct TcpConnector {
    /// Device address -> `host:port`
    relays: HashMap<String, String>,
    /// Connection timeout
    connect_timeout: Duration,
}

impl TcpConnector {
    /// Create a connector with no relays
    pub fn new(connect_timeout: Duration) -> Self {
        Self {
            relays: HashMap::new(),
            connect_timeout,
        }
    }

    /// Route `device_address` through `relay_addr`
    pub fn with_relay(mut self, device_address: impl Into<String>, relay_addr: impl Into<String>) -> Self {
        self.relays.insert(device_address.into(), relay_addr.into());
        self
    }

    /// Open a stream to a relay address
    pub async fn open(&self, device: &ExternalDevice, addr: &str) -> io::Result<Connection> {
        info!("Connecting to {} via TCP relay {}", device, addr);

        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| {
                io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("connection timeout to {}", addr),
                )
            })??;

        // Button events are tiny; don't batch anything we might write later
        stream.set_nodelay(true)?;

        Ok(Connection::new(device.clone(), Box::new(stream)))
    }
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, device: &ExternalDevice, service: Uuid) -> io::Result<Connection> {
        let addr = self.relays.get(&device.address).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no TCP relay configured for {}", device.address),
            )
        })?;
        debug!("Service {} for {} served by relay {}", service, device.address, addr);
        self.open(device, addr).await
    }
}
