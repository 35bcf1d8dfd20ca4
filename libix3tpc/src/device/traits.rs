// libix3tpc/src/device/traits.rs

use crate::Result;

/// Light source as seen by the surrounding device framework.
///
/// Power is normalised to `0.0..=1.0`; out-of-range values are clamped.
pub trait LightSource: Send + Sync {
    fn enable(&mut self) -> Result<()>;

    fn disable(&mut self) -> Result<()>;

    /// Whether the last enable/disable left the source enabled.
    fn is_enabled(&self) -> bool;

    /// Query the hardware for the emission state.
    fn is_on(&self) -> Result<bool>;

    fn power(&self) -> Result<f64>;

    fn set_power(&mut self, power: f64) -> Result<()>;

    /// Free-form status lines.
    fn status(&self) -> Vec<String> {
        Vec::new()
    }

    /// Disable before the owning controller goes away.
    fn shutdown(&mut self) -> Result<()> {
        self.disable()
    }
}
