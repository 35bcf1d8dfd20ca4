// libix3tpc/src/transport/mod.rs

pub mod mock;
#[cfg(feature = "portmanager")]
pub mod native;
pub mod traits;

pub use mock::{MockPortManager, Reply};
#[cfg(feature = "portmanager")]
pub use native::NativePortManager;
pub use traits::PortManager;
