// libix3tpc/src/error.rs

use thiserror::Error;

use crate::types::CommandStatus;

/// Common error type
#[derive(Error, Debug)]
pub enum Error {
    /// Setup failed: binding initialisation, interface discovery, callback
    /// registration or a login/configuration step answered unexpectedly.
    #[error("initialise error: {0}")]
    Initialise(String),

    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// Raised through the error callback, e.g. the IEEE 1394 cable was pulled.
    #[error("device communication error: {0}")]
    DeviceCommunication(String),

    #[error(
        "unexpected response for command '{command}': status={status}, response='{response}'"
    )]
    UnexpectedResponse {
        command: String,
        status: CommandStatus,
        response: String,
    },

    #[error("command too large: at most {max} bytes, got {actual}")]
    PayloadTooLarge { max: usize, actual: usize },

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("no free command key")]
    ResourceExhausted,

    /// A PortManager primitive reported failure.
    #[error("port manager error: {0}")]
    Binding(String),

    #[error("interface closed")]
    InterfaceClosed,

    #[cfg(feature = "portmanager")]
    #[error("library error: {0}")]
    Library(#[from] libloading::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build the error raised when a command answers with anything other
    /// than the expected `(status, response)` pair.
    pub fn unexpected(command: &str, status: CommandStatus, response: &str) -> Self {
        Error::UnexpectedResponse {
            command: command.to_string(),
            status,
            response: response.to_string(),
        }
    }

    /// Fatal errors abort construction or latch the owning table; they are
    /// never worth retrying at this layer.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Initialise(_) | Error::UnsupportedFeature(_) | Error::DeviceCommunication(_)
        )
    }
}
