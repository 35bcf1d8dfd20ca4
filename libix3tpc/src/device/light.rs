// libix3tpc/src/device/light.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

use crate::constants::{
    LED_INTENSITY_ACK, LED_INTENSITY_MAX, LED_INTENSITY_PREFIX, LED_INTENSITY_QUERY,
    LED_SHUTTER_ACK, LED_SHUTTER_CLOSE, LED_SHUTTER_OPEN, LED_SHUTTER_QUERY,
};
use crate::device::traits::LightSource;
use crate::dispatch::Dispatcher;
use crate::protocol::{expect_exact, expect_one_of, parse_numeric_reply};
use crate::types::CommandStatus;
use crate::{Error, Result};

/// Transmitted-light LED (IX3-LHLEDC) behind the touch panel controller.
pub struct LedLightSource {
    link: Arc<Dispatcher>,
    shutting_down: Arc<AtomicBool>,
    enabled: bool,
}

impl LedLightSource {
    pub(crate) fn new(link: Arc<Dispatcher>, shutting_down: Arc<AtomicBool>) -> Self {
        Self {
            link,
            shutting_down,
            enabled: false,
        }
    }

    fn query(&self, cmd: &str) -> Result<(CommandStatus, String)> {
        self.link.send_blocking(cmd, self.link.default_timeout_ms())
    }

    fn command(&self, cmd: &str, expected: &str) -> Result<()> {
        let (status, response) = self.query(cmd)?;
        expect_exact(cmd, status, &response, expected)
    }

    /// Register value for a normalised power, truncating like the panel does.
    pub fn power_to_register(power: f64) -> Result<u8> {
        if power.is_nan() {
            return Err(Error::InvalidValue("power is NaN".into()));
        }
        let clamped = power.clamp(0.0, 1.0);
        Ok((clamped * f64::from(LED_INTENSITY_MAX)) as u8)
    }
}

impl LightSource for LedLightSource {
    fn enable(&mut self) -> Result<()> {
        self.command(LED_SHUTTER_OPEN, LED_SHUTTER_ACK)?;
        self.enabled = true;
        Ok(())
    }

    fn disable(&mut self) -> Result<()> {
        // Devices may be torn down after the controller; stay silent then.
        if self.shutting_down.load(Ordering::SeqCst) {
            debug!("controller shutting down, not sending '{}'", LED_SHUTTER_CLOSE);
        } else {
            self.command(LED_SHUTTER_CLOSE, LED_SHUTTER_ACK)?;
        }
        self.enabled = false;
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn is_on(&self) -> Result<bool> {
        let (status, response) = self.query(LED_SHUTTER_QUERY)?;
        let idx = expect_one_of(
            LED_SHUTTER_QUERY,
            status,
            &response,
            &[LED_SHUTTER_OPEN, LED_SHUTTER_CLOSE],
        )?;
        // `DSH 0` is the shutter state `enable` sets, so it reads as on.
        // Taking the reply digit as a boolean would invert this.
        Ok(idx == 0)
    }

    fn power(&self) -> Result<f64> {
        let (status, response) = self.query(LED_INTENSITY_QUERY)?;
        let level = parse_numeric_reply(LED_INTENSITY_PREFIX, &response)
            .filter(|n| (0..=i64::from(LED_INTENSITY_MAX)).contains(n));
        match (status, level) {
            (CommandStatus::Succeeded, Some(n)) => Ok(n as f64 / f64::from(LED_INTENSITY_MAX)),
            _ => Err(Error::unexpected(LED_INTENSITY_QUERY, status, &response)),
        }
    }

    fn set_power(&mut self, power: f64) -> Result<()> {
        let level = Self::power_to_register(power)?;
        let cmd = format!("{} {}", LED_INTENSITY_PREFIX, level);
        self.command(&cmd, LED_INTENSITY_ACK)
    }
}

impl std::fmt::Debug for LedLightSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedLightSource")
            .field("enabled", &self.enabled)
            .finish()
    }
}
