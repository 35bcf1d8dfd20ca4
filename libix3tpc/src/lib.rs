// libix3tpc/src/lib.rs

//! libix3tpc
//!
//! Command correlation layer for the Olympus IX3 touch panel controller
//! (IX3-TPC) driven through the vendor PortManager library.

pub mod callback;
pub mod config;
pub mod constants;
pub mod correlation;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod prelude;
pub mod protocol;
pub mod test_support;
pub mod transport;
pub mod types;
pub mod utils;

// Re-export common types at crate root so `crate::Error`, `crate::Result`,
// and the newtypes in `types` are available for consumers and for
// convenient `prelude` re-exports.
pub use crate::error::*;
pub use crate::types::*;

pub use prelude::*;
