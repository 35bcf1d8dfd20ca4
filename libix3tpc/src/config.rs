// libix3tpc/src/config.rs

//! Controller configuration.

use std::time::Duration;

use crate::constants::DEFAULT_TIMEOUT_MS;
use crate::utils::default_poll_interval;
use crate::{Error, Result};

/// Tunables of the dispatcher and the controller lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControllerConfig {
    /// Timeout handed to PortManager for setup and device commands.
    pub default_timeout_ms: u64,
    /// Wait granularity of the blocking send.
    #[cfg_attr(feature = "serde", serde(rename = "poll_interval_ms", with = "duration_ms"))]
    pub poll_interval: Duration,
    /// Timeout of the logout sent during shutdown. The command is not
    /// awaited, so zero is fine.
    pub logout_timeout_ms: u64,
    /// Keys are allocated from `0..key_limit`.
    pub key_limit: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval: default_poll_interval(),
            logout_timeout_ms: 0,
            key_limit: usize::MAX,
        }
    }
}

impl ControllerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.default_timeout_ms = timeout_ms;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_logout_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.logout_timeout_ms = timeout_ms;
        self
    }

    pub fn with_key_limit(mut self, key_limit: usize) -> Self {
        self.key_limit = key_limit;
        self
    }

    /// Reject settings the dispatcher cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::InvalidValue("poll interval must be positive".into()));
        }
        if self.key_limit == 0 {
            return Err(Error::InvalidValue("key limit must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
