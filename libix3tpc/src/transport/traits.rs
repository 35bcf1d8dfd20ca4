// libix3tpc/src/transport/traits.rs

use crate::protocol::CommandRecord;
use crate::types::{InterfaceHandle, TableId};
use crate::Result;

/// PortManager abstracts the vendor library away from the correlation and
/// lifecycle logic.
///
/// Implementations deliver completions by calling into [`crate::callback`]
/// from a thread of their own: [`on_command`](crate::callback::on_command)
/// exactly once per accepted record, with the registration context when the
/// command answered and without it when it timed out.
pub trait PortManager: Send + Sync {
    /// Initialise the library.
    fn initialize(&self) -> Result<()>;

    /// Number of interfaces found on the bus.
    fn enum_interfaces(&self) -> Result<usize>;

    /// Handle of the interface object at `index`.
    fn interface_info(&self, index: usize) -> Result<InterfaceHandle>;

    fn open_interface(&self, handle: InterfaceHandle) -> Result<()>;

    fn close_interface(&self, handle: InterfaceHandle) -> Result<()>;

    /// Route the command, notification and error callbacks of `handle` into
    /// [`crate::callback`], handing `context` back on every answered
    /// command.
    fn register_callbacks(&self, handle: InterfaceHandle, context: TableId) -> Result<()>;

    /// Submit a record. `Ok` only means the library accepted it.
    fn send_command(&self, handle: InterfaceHandle, record: &CommandRecord) -> Result<()>;
}
