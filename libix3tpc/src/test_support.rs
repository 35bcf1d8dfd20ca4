//! Test support helpers intended for use by unit and integration tests.
//!
//! These helpers centralize common MockPortManager setup so tests across the
//! crate and tests/ directory can reuse the same logic.
#![allow(dead_code)]

use std::sync::Arc;

use crate::config::ControllerConfig;
use crate::constants::{CONFIGURE_SEQUENCE, LOGIN_SEQUENCE};
use crate::device::Controller;
use crate::transport::mock::MockPortManager;
use crate::utils::ms;
use crate::Result;

/// A MockPortManager that answers the login and configuration sequences.
#[doc(hidden)]
pub fn scripted_port_manager() -> MockPortManager {
    let mock = MockPortManager::new();
    mock.script_all(LOGIN_SEQUENCE);
    mock.script_all(CONFIGURE_SEQUENCE);
    mock
}

/// Short timeouts so tests that wait for a give-up finish quickly.
#[doc(hidden)]
pub fn fast_config() -> ControllerConfig {
    ControllerConfig::new()
        .with_timeout_ms(100)
        .with_poll_interval(ms(5))
}

/// Convenience: open a Ready controller over a scripted mock. The mock is
/// returned too so the test can script further replies and inspect traffic.
#[doc(hidden)]
pub fn ready_mock_controller(
    config: ControllerConfig,
) -> Result<(Arc<MockPortManager>, Controller)> {
    let mock = Arc::new(scripted_port_manager());
    let controller = Controller::open(mock.clone(), config)?;
    Ok((mock, controller))
}
