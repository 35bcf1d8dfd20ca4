// libix3tpc/src/device/mod.rs

pub mod builder;
pub mod controller;
pub mod light;
pub mod traits;

pub use builder::ControllerBuilder;
pub use controller::Controller;
pub use light::LedLightSource;
pub use traits::LightSource;
