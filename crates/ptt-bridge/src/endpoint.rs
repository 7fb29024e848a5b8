//! Connector routing each device to its configured endpoint

use crate::config::{DeviceEntry, Endpoint};
use crate::tcp::TcpConnector;
use crate::transport::{Connection, Connector};
#[cfg(unix)]
use crate::tty::TtyConnector;
use async_trait::async_trait;
use ptt_core::ExternalDevice;
use std::collections::HashMap;
use std::io;
use std::time::Duration;
use uuid::Uuid;

/// Which transport serves a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Tcp,
    Tty,
}

/// Connector over the configured device endpoints
#[derive(Debug, Clone)]
pub struct EndpointConnector {
    routes: HashMap<String, Route>,
    tcp: TcpConnector,
    #[cfg(unix)]
    tty: TtyConnector,
}

impl EndpointConnector {
    /// Build routes for the given registry entries
    pub fn new(connect_timeout: Duration, entries: &[DeviceEntry]) -> Self {
        let mut routes = HashMap::new();
        let mut tcp = TcpConnector::new(connect_timeout);
        #[cfg(unix)]
        let mut tty = TtyConnector::new();

        for entry in entries {
            let address = entry.device.address.clone();
            match &entry.endpoint {
                Endpoint::Tcp { addr } => {
                    tcp = tcp.with_relay(address.clone(), addr.clone());
                    routes.insert(address, Route::Tcp);
                }
                Endpoint::Tty { path } => {
                    #[cfg(unix)]
                    {
                        tty = tty.with_path(address.clone(), path.clone());
                    }
                    #[cfg(not(unix))]
                    let _ = path;
                    routes.insert(address, Route::Tty);
                }
            }
        }

        Self {
            routes,
            tcp,
            #[cfg(unix)]
            tty,
        }
    }
}

#[async_trait]
impl Connector for EndpointConnector {
    async fn connect(&self, device: &ExternalDevice, service: Uuid) -> io::Result<Connection> {
        match self.routes.get(&device.address) {
            Some(Route::Tcp) => self.tcp.connect(device, service).await,
            #[cfg(unix)]
            Some(Route::Tty) => self.tty.connect(device, service).await,
            #[cfg(not(unix))]
            Some(Route::Tty) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("tty endpoints are not available on this platform ({})", device),
            )),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no endpoint configured for {}", device),
            )),
        }
    }
}
