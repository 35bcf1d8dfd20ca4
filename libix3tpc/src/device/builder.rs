// libix3tpc/src/device/builder.rs

use std::sync::Arc;
use std::time::Duration;

use crate::config::ControllerConfig;
use crate::device::controller::Controller;
use crate::transport::PortManager;
use crate::{Error, Result};

/// Helper to construct a Controller with optional configuration.
#[derive(Default)]
pub struct ControllerBuilder {
    port: Option<Arc<dyn PortManager>>,
    config: ControllerConfig,
}

impl ControllerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide the PortManager binding (native library or MockPortManager).
    pub fn with_port(mut self, port: Arc<dyn PortManager>) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config = self.config.with_timeout_ms(timeout_ms);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.config = self.config.with_poll_interval(interval);
        self
    }

    pub fn with_key_limit(mut self, key_limit: usize) -> Self {
        self.config = self.config.with_key_limit(key_limit);
        self
    }

    /// Consume the builder and open the controller.
    /// Requires a PortManager to be provided.
    pub fn build(self) -> Result<Controller> {
        match self.port {
            Some(port) => Controller::open(port, self.config),
            None => Err(Error::Initialise("no PortManager binding provided".into())),
        }
    }
}
