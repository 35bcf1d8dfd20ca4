// libix3tpc/src/device/controller.rs

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::config::ControllerConfig;
use crate::constants::{CONFIGURE_SEQUENCE, LED_DEVICE_NAME, LOGIN_SEQUENCE, LOGOUT_COMMAND};
use crate::correlation::{CommandTable, registry};
use crate::device::light::LedLightSource;
use crate::device::traits::LightSource;
use crate::dispatch::{CompletionHandler, Dispatcher};
use crate::transport::PortManager;
use crate::types::{CommandKey, CommandStatus, ControllerState, InterfaceHandle, TableId};
use crate::{Error, Result};

/// IX3 touch panel controller.
///
/// Owns the correlation table for its interface. Opening runs the whole
/// setup: PortManager initialisation, login and configuration. A controller
/// that fails any step is never handed out.
pub struct Controller {
    port: Arc<dyn PortManager>,
    dispatcher: Arc<Dispatcher>,
    config: ControllerConfig,
    state: ControllerState,
    shutting_down: Arc<AtomicBool>,
    devices: BTreeMap<String, LedLightSource>,
}

impl Controller {
    /// Bring up the controller over `port`.
    pub fn open(port: Arc<dyn PortManager>, config: ControllerConfig) -> Result<Self> {
        config.validate()?;
        debug!("controller state: {} -> {}", ControllerState::Uninitialized, ControllerState::Initializing);

        let table = registry::create(config.key_limit);
        let interface = initialise_port_manager(&*port, table.id())?;
        let dispatcher = Arc::new(Dispatcher::new(port.clone(), interface, table, &config));

        let mut controller = Self {
            port,
            dispatcher,
            config,
            state: ControllerState::Initializing,
            shutting_down: Arc::new(AtomicBool::new(false)),
            devices: BTreeMap::new(),
        };

        // Dropping on failure closes the interface again.
        controller.run_sequence("logging in", LOGIN_SEQUENCE)?;
        controller.advance(ControllerState::LoggedIn);
        controller.run_sequence("configuring", CONFIGURE_SEQUENCE)?;
        controller.advance(ControllerState::Configured);

        let led = LedLightSource::new(
            Arc::clone(&controller.dispatcher),
            Arc::clone(&controller.shutting_down),
        );
        controller.devices.insert(LED_DEVICE_NAME.to_string(), led);
        controller.advance(ControllerState::Ready);
        Ok(controller)
    }

    fn advance(&mut self, next: ControllerState) {
        info!("controller state: {} -> {}", self.state, next);
        self.state = next;
    }

    fn run_sequence(&self, what: &str, steps: &[(&str, &str)]) -> Result<()> {
        for (cmd, expected) in steps {
            let (status, response) = self
                .dispatcher
                .send_blocking(cmd, self.config.default_timeout_ms)?;
            if status != CommandStatus::Succeeded || response != *expected {
                return Err(Error::Initialise(format!(
                    "Error {}. Command: '{}'. Status: '{}'. Response: '{}'.",
                    what, cmd, status, response
                )));
            }
        }
        Ok(())
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn interface(&self) -> InterfaceHandle {
        self.dispatcher.interface()
    }

    pub fn table_id(&self) -> TableId {
        self.dispatcher.table().id()
    }

    pub fn table(&self) -> &Arc<CommandTable> {
        self.dispatcher.table()
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Commands currently awaiting a callback.
    pub fn in_flight(&self) -> usize {
        self.dispatcher.table().len()
    }

    /// Subordinate devices consult this before talking to the hardware.
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    /// Fails with the latched communication error, if any.
    pub fn check_health(&self) -> Result<()> {
        match self.dispatcher.table().fault() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    /// Names of the attached devices.
    pub fn device_names(&self) -> Vec<&str> {
        self.devices.keys().map(String::as_str).collect()
    }

    pub fn device(&self, name: &str) -> Option<&LedLightSource> {
        self.devices.get(name)
    }

    pub fn device_mut(&mut self, name: &str) -> Option<&mut LedLightSource> {
        self.devices.get_mut(name)
    }

    /// The transmitted-light LED.
    pub fn led(&mut self) -> Option<&mut LedLightSource> {
        self.device_mut(LED_DEVICE_NAME)
    }

    /// Fire-and-forget submission with the default timeout.
    pub fn send(&self, cmd: &str, handler: Option<CompletionHandler>) -> Result<CommandKey> {
        self.dispatcher
            .send(cmd, handler, self.config.default_timeout_ms)
    }

    pub fn send_with_timeout(
        &self,
        cmd: &str,
        handler: Option<CompletionHandler>,
        timeout_ms: u64,
    ) -> Result<CommandKey> {
        self.dispatcher.send(cmd, handler, timeout_ms)
    }

    /// Blocking submission with the default timeout and poll interval.
    pub fn send_blocking(&self, cmd: &str) -> Result<(CommandStatus, String)> {
        self.dispatcher
            .send_blocking(cmd, self.config.default_timeout_ms)
    }

    pub fn send_blocking_with(
        &self,
        cmd: &str,
        timeout_ms: u64,
        poll_interval: Duration,
    ) -> Result<(CommandStatus, String)> {
        self.dispatcher
            .send_blocking_with(cmd, timeout_ms, poll_interval)
    }

    /// Orderly teardown: flag subordinate devices, shut them down, log out
    /// without waiting for the answer and close the interface. Safe to call
    /// more than once.
    pub fn shutdown(&mut self) {
        if self.state == ControllerState::Closed {
            return;
        }
        let logged_in = matches!(
            self.state,
            ControllerState::LoggedIn | ControllerState::Configured | ControllerState::Ready
        );
        self.advance(ControllerState::ShuttingDown);
        self.shutting_down.store(true, Ordering::SeqCst);

        for (name, device) in self.devices.iter_mut() {
            if let Err(e) = device.shutdown() {
                warn!("shutting down device {} failed: {}", name, e);
            }
        }

        if logged_in {
            // The panel does not answer in time during teardown; send and move on.
            if let Err(e) = self
                .dispatcher
                .send(LOGOUT_COMMAND, None, self.config.logout_timeout_ms)
            {
                warn!("logout not sent: {}", e);
            }
        }

        let interface = self.dispatcher.interface();
        match self.port.close_interface(interface) {
            Ok(()) => info!("Closed interface for object at address {:#X}", interface),
            Err(e) => error!(
                "Failed to close interface for object at address {:#X}: {}",
                interface, e
            ),
        }
        self.dispatcher.close();
        self.advance(ControllerState::Closed);
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(feature = "async")]
#[async_trait::async_trait]
impl crate::dispatch::AsyncCommander for Controller {
    async fn send_command_async(
        &self,
        cmd: &str,
        timeout_ms: u64,
    ) -> Result<(CommandStatus, String)> {
        self.dispatcher.send_async(cmd, timeout_ms).await
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("state", &self.state)
            .field("dispatcher", &self.dispatcher)
            .field("devices", &self.devices)
            .finish()
    }
}

/// Initialise PortManager, open its single interface and route callbacks
/// for it to the table identified by `context`.
fn initialise_port_manager(port: &dyn PortManager, context: TableId) -> Result<InterfaceHandle> {
    port.initialize()
        .map_err(|e| Error::Initialise(e.to_string()))?;

    let count = port
        .enum_interfaces()
        .map_err(|e| Error::Initialise(e.to_string()))?;
    if count == 0 {
        return Err(Error::Initialise(
            "Couldn't find active interfaces on the IEEE 1394 bus. Please ensure that the \
             computer is connected to an IX3-CBH control unit which is powered."
                .into(),
        ));
    }
    if count > 1 {
        return Err(Error::UnsupportedFeature(
            "The ability to communicate with multiple devices on the IEEE 1394 bus has not \
             been implemented yet."
                .into(),
        ));
    }

    let handle = port
        .interface_info(0)
        .map_err(|e| Error::Initialise(e.to_string()))?;
    port.open_interface(handle).map_err(|e| {
        Error::Initialise(format!(
            "Failed to open interface for object at address {:#X}: {}",
            handle, e
        ))
    })?;
    info!("Opened interface for object at address {:#X}", handle);

    if let Err(e) = port.register_callbacks(handle, context) {
        if let Err(close_err) = port.close_interface(handle) {
            warn!("closing interface after failed registration: {}", close_err);
        }
        return Err(Error::Initialise(format!(
            "Failed to register callbacks for object at address {:#X}: {}",
            handle, e
        )));
    }
    Ok(handle)
}
