// libix3tpc/src/prelude.rs

pub use crate::config::ControllerConfig;
pub use crate::device::{Controller, ControllerBuilder, LedLightSource, LightSource};
pub use crate::dispatch::{CompletionHandler, Dispatcher, bind_args};
pub use crate::protocol::CommandRecord;
pub use crate::transport::PortManager;
pub use crate::{
    CommandKey, CommandStatus, ControllerState, Error, InterfaceHandle, Result, TableId,
};

pub use crate::utils::{ms, poll_ceiling};
