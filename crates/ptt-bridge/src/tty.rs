//! RFCOMM tty transport implementation
//!
//! Used when the kernel already holds the RFCOMM channel and exposes it as a
//! serial device (`rfcomm bind 0 <address> <channel>` gives `/dev/rfcomm0`).
//!
//! The device node is opened non-blocking and registered with the tokio
//! reactor, so a pending read is released the moment the connection is
//! closed and dropping the stream closes the descriptor.

use crate::transport::{Connection, Connector};
use async_trait::async_trait;
use ptt_core::ExternalDevice;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use tokio::net::unix::pipe;
use tracing::{debug, info};
use uuid::Uuid;

/// Connector opening a bound RFCOMM serial device per address
#[derive(Debug, Clone, Default)]
pub struct TtyConnector {
    /// Device address -> tty path
    paths: HashMap<String, PathBuf>,
}

impl TtyConnector {
    /// Create a connector with no bound devices
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `device_address` to a tty path
    pub fn with_path(mut self, device_address: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.paths.insert(device_address.into(), path.into());
        self
    }

    /// Open a tty (or FIFO) path for reading
    ///
    /// The open itself is non-blocking, so it never waits on carrier detect.
    pub fn open(&self, device: &ExternalDevice, path: &Path) -> io::Result<Connection> {
        info!("Opening {} at {}", device, path.display());

        // Character devices are not FIFOs; skip the file type check
        let receiver = pipe::OpenOptions::new().unchecked(true).open_receiver(path)?;

        Ok(Connection::new(device.clone(), Box::new(receiver)))
    }
}

#[async_trait]
impl Connector for TtyConnector {
    async fn connect(&self, device: &ExternalDevice, service: Uuid) -> io::Result<Connection> {
        let path = self.paths.get(&device.address).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no RFCOMM device bound for {}", device.address),
            )
        })?;
        debug!("Service {} for {} bound at {}", service, device.address, path.display());
        self.open(device, path)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::transport::SPP_SERVICE_UUID;
    use std::io::Write;
    use std::time::Duration;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ptt-bridge-{}-{}", std::process::id(), name))
    }

    /// Create a FIFO standing in for a bound RFCOMM node
    pub(crate) fn make_fifo(name: &str) -> PathBuf {
        let path = temp_path(name);
        let _ = std::fs::remove_file(&path);
        let status = std::process::Command::new("mkfifo").arg(&path).status().unwrap();
        assert!(status.success());
        path
    }

    /// Open the device side for writing; blocks until the bridge opens its end
    fn spawn_device(path: PathBuf) -> std::thread::JoinHandle<std::fs::File> {
        std::thread::spawn(move || std::fs::OpenOptions::new().write(true).open(path).unwrap())
    }

    #[tokio::test]
    async fn test_reads_bound_device() {
        let path = make_fifo("tty-read");
        let device_side = spawn_device(path.clone());

        let device = ExternalDevice::new("AA", "PTT");
        let connector = TtyConnector::new().with_path("AA", &path);
        let mut conn = connector.connect(&device, SPP_SERVICE_UUID).await.unwrap();

        let mut writer = device_side.join().unwrap();
        writer.write_all(b"+PTT=R").unwrap();

        let mut buf = [0u8; 16];
        let n = conn.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"+PTT=R");

        // Device hangs up
        drop(writer);
        assert_eq!(conn.read(&mut buf).await.unwrap(), 0);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_close_releases_silent_device() {
        let path = make_fifo("tty-close");
        let device_side = spawn_device(path.clone());

        let device = ExternalDevice::new("AA", "PTT");
        let connector = TtyConnector::new().with_path("AA", &path);
        let mut conn = connector.connect(&device, SPP_SERVICE_UUID).await.unwrap();
        let mut writer = device_side.join().unwrap();
        let closer = conn.close_handle();

        let reader = tokio::spawn(async move {
            let mut buf = [0u8; 16];
            let result = conn.read(&mut buf).await;
            (result, conn)
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        closer.close();

        let (result, conn) = tokio::time::timeout(Duration::from_secs(5), reader)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::ConnectionAborted);

        // Our end of the FIFO is closed: the device gets EPIPE
        let err = writer.write_all(b"+PTT=P").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        drop(conn);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_missing_path_fails() {
        let device = ExternalDevice::new("AA", "PTT");
        let connector = TtyConnector::new().with_path("AA", temp_path("does-not-exist"));
        let err = connector.connect(&device, SPP_SERVICE_UUID).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
