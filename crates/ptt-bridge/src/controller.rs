//! Bridge controller
//!
//! Ties the pipeline (select → connect → read → post) to the hosting
//! screen's lifecycle. A controller starts at most once; any failure is
//! terminal and recovering needs a fresh controller.

use crate::config::BridgeConfig;
use crate::permission::{AlwaysGranted, Permission, PermissionGate};
use crate::reader::{LoopExit, reader_loop};
use crate::registry::DeviceRegistry;
use crate::script::ScriptBridge;
use crate::transport::{CloseHandle, ConnectionState, Connector, SPP_SERVICE_UUID};
use parking_lot::Mutex;
use ptt_core::{BridgeError, DeviceSelector, Result, describe_devices};
use ptt_host::HostHandle;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// State shared between the controller and its background task
#[derive(Debug)]
struct Shared {
    /// Scope of the background task
    scope: CancellationToken,
    /// Close handle of the live connection, if any
    connection: Mutex<Option<CloseHandle>>,
    /// Observable connection lifecycle
    status: Mutex<ConnectionState>,
    /// Background task
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Shared {
    fn set_status(&self, status: ConnectionState) {
        *self.status.lock() = status;
    }
}

/// Everything the background task needs; cheap to clone
#[derive(Clone)]
struct Launcher {
    runtime: Handle,
    registry: Arc<dyn DeviceRegistry>,
    connector: Arc<dyn Connector>,
    selector: DeviceSelector,
    bridge: ScriptBridge,
    shared: Arc<Shared>,
}

impl Launcher {
    /// Spawn the pipeline unless the controller was already torn down
    fn launch(&self) {
        if self.shared.scope.is_cancelled() {
            debug!("Bridge torn down before launch, not connecting");
            return;
        }
        let handle = self.runtime.spawn(self.clone().run());
        *self.shared.task.lock() = Some(handle);
    }

    async fn run(self) {
        let shared = &self.shared;

        // Teardown may land between spawn and first poll
        if shared.scope.is_cancelled() {
            debug!("Bridge torn down before the task ran");
            return;
        }

        let devices = self.registry.bonded_devices();
        let Some(device) = self.selector.select(&devices).cloned() else {
            let err = BridgeError::NoDeviceFound {
                available: describe_devices(&devices),
            };
            warn!("{}", err);
            self.bridge.diagnostic(&err);
            return;
        };

        shared.set_status(ConnectionState::Connecting);
        let result = tokio::select! {
            biased;
            _ = shared.scope.cancelled() => {
                debug!("Connect to {} abandoned by teardown", device);
                shared.set_status(ConnectionState::Closed);
                return;
            }
            result = self.connector.connect(&device, SPP_SERVICE_UUID) => result,
        };

        let mut connection = match result {
            Ok(connection) => connection,
            Err(e) => {
                shared.set_status(ConnectionState::Failed);
                let err = BridgeError::Connect(e);
                warn!("{}", err);
                self.bridge.diagnostic(&err);
                return;
            }
        };

        {
            // Teardown takes the same lock, so it either sees this handle or
            // we see its cancellation
            let mut slot = shared.connection.lock();
            if shared.scope.is_cancelled() {
                connection.close();
                shared.set_status(ConnectionState::Closed);
                return;
            }
            *slot = Some(connection.close_handle());
            shared.set_status(ConnectionState::Open);
        }
        info!("Connected to PTT device {}", device);

        let exit = reader_loop(&mut connection, &shared.scope, &self.bridge).await;

        let closed_by_teardown = shared.scope.is_cancelled() || connection.is_closed();
        connection.close();
        shared.connection.lock().take();

        match exit {
            LoopExit::ReadError(e) if !closed_by_teardown => {
                shared.set_status(ConnectionState::Failed);
                let err = BridgeError::Read(e);
                warn!("{}", err);
                self.bridge.diagnostic(&err);
            }
            LoopExit::ReadError(e) => {
                debug!("Reader stopped after close: {}", e);
                shared.set_status(ConnectionState::Closed);
            }
            LoopExit::EndOfStream => {
                info!("PTT device {} closed the stream", device);
                shared.set_status(ConnectionState::Closed);
            }
            LoopExit::Cancelled => {
                shared.set_status(ConnectionState::Closed);
            }
        }
    }
}

/// Controls the device bridge for one hosting screen
pub struct BridgeController {
    /// Set on the first `start_once`
    started: bool,
    launcher: Launcher,
    gate: Arc<dyn PermissionGate>,
    permissions: Vec<Permission>,
}

impl BridgeController {
    /// Create a controller; nothing happens until [`Self::start_once`]
    pub fn new(
        config: &BridgeConfig,
        registry: Arc<dyn DeviceRegistry>,
        connector: Arc<dyn Connector>,
        host: HostHandle,
        runtime: Handle,
    ) -> Result<Self> {
        let bridge = ScriptBridge::new(host, &config.base_location)?;
        let shared = Arc::new(Shared {
            scope: CancellationToken::new(),
            connection: Mutex::new(None),
            status: Mutex::new(ConnectionState::Unconnected),
            task: Mutex::new(None),
        });

        Ok(Self {
            started: false,
            launcher: Launcher {
                runtime,
                registry,
                connector,
                selector: config.selector(),
                bridge,
                shared,
            },
            gate: Arc::new(AlwaysGranted),
            permissions: config.permissions(),
        })
    }

    /// Use a platform permission gate
    pub fn with_permission_gate(mut self, gate: Arc<dyn PermissionGate>) -> Self {
        self.gate = gate;
        self
    }

    /// Override the permissions checked before connecting
    pub fn with_permissions(mut self, permissions: Vec<Permission>) -> Self {
        self.permissions = permissions;
        self
    }

    /// Start the bridge; later calls are no-ops
    pub fn start_once(&mut self) {
        if self.started {
            debug!("Bridge already started");
            return;
        }
        self.started = true;

        if self.gate.check(&self.permissions) {
            self.launcher.launch();
            return;
        }

        let launcher = self.launcher.clone();
        self.gate.request(
            &self.permissions,
            Box::new(move |granted| {
                if granted {
                    launcher.launch();
                } else {
                    let err = BridgeError::PermissionDenied;
                    warn!("{}", err);
                    launcher.bridge.diagnostic(&err);
                }
            }),
        );
    }

    /// Stop reading and close the connection; safe to call at any time, any number of times
    pub fn teardown(&mut self) {
        let shared = &self.launcher.shared;
        shared.scope.cancel();

        if let Some(closer) = shared.connection.lock().take() {
            info!("Closing PTT device connection");
            closer.close();
            shared.set_status(ConnectionState::Closed);
        }
    }

    /// Whether `start_once` has been called
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Whether a connection is currently held
    pub fn has_connection(&self) -> bool {
        self.launcher.shared.connection.lock().is_some()
    }

    /// Current connection lifecycle state
    pub fn connection_state(&self) -> ConnectionState {
        *self.launcher.shared.status.lock()
    }

    /// Origin messages are addressed to
    pub fn target_origin(&self) -> &str {
        self.launcher.bridge.target_origin()
    }

    /// Wait for the background task, if one was launched, to finish
    pub async fn join(&self) {
        let task = self.launcher.shared.task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!("Bridge task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for BridgeController {
    fn drop(&mut self) {
        self.teardown();
    }
}
