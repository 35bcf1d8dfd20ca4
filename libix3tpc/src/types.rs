// libix3tpc/src/types.rs

use derive_more::{Display, From, Into};

/// Key of one in-flight command. Round-trips through the pointer-sized
/// correlation handle of the command record, hence `usize`.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, From, Into)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommandKey(usize);

impl CommandKey {
    pub const fn new(key: usize) -> Self {
        Self(key)
    }

    pub fn as_usize(&self) -> usize {
        self.0
    }
}

/// Resolution state of a command.
///
/// Every command starts as `Pending`. The callback resolves it to
/// `Succeeded` or `TimedOut` depending on whether PortManager handed back
/// the registration context.
#[repr(u8)]
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandStatus {
    #[default]
    Pending = 0,
    Succeeded = 1,
    TimedOut = 2,
}

/// Opaque handle of a PortManager interface object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InterfaceHandle(usize);

impl InterfaceHandle {
    pub const NULL: Self = Self(0);

    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    pub fn as_raw(&self) -> usize {
        self.0
    }

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::LowerHex for InterfaceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::LowerHex::fmt(&self.0, f)
    }
}

impl std::fmt::UpperHex for InterfaceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::UpperHex::fmt(&self.0, f)
    }
}

/// Identifier of a correlation table in the process-wide registry. Stored in
/// the record's context field and passed as the callback registration
/// context; zero is reserved for "no context".
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableId(std::num::NonZeroUsize);

impl TableId {
    pub fn from_raw(raw: usize) -> Option<Self> {
        std::num::NonZeroUsize::new(raw).map(Self)
    }

    pub fn as_raw(&self) -> usize {
        self.0.get()
    }
}

/// Controller lifecycle.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    Initializing,
    LoggedIn,
    Configured,
    Ready,
    ShuttingDown,
    Closed,
}
