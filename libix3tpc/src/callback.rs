// libix3tpc/src/callback.rs

//! Callback adapter.
//!
//! PortManager calls back on a thread of its own for three kinds of events.
//! These functions are the only place where a table entry changes status or
//! is removed, so a key is never resolved twice: the library delivers
//! exactly one terminal callback per accepted command.

use std::panic::{AssertUnwindSafe, catch_unwind};

use log::{debug, error, warn};

use crate::constants::CALLBACK_ACK;
use crate::correlation::{CommandTable, registry};
use crate::protocol::{CommandRecord, decode_response};
use crate::types::{CommandKey, CommandStatus, TableId};
use crate::Error;

/// Message latched on a table when the error callback fires.
pub const COMMUNICATION_LOST: &str =
    "PortManager error. Ensure IEEE 1394 cable has not been disconnected.";

/// A command completed or timed out.
///
/// `context` is the registration context PortManager passes along; it is
/// absent when the command timed out. The owning table is found through the
/// record's own context field, which is set on every submission.
pub fn on_command(record: &CommandRecord, context: Option<TableId>) -> i32 {
    let key = record.key();
    let response = decode_response(record);
    #[cfg(feature = "diagnostics")]
    log::trace!("command callback: record={:?}", record);

    let Some(table) = record.table_id().and_then(registry::lookup) else {
        warn!(
            "completion for key {} names no live table (context field {:#x}); dropped",
            key, record.context
        );
        return CALLBACK_ACK;
    };

    let status = if context.is_some() {
        CommandStatus::Succeeded
    } else {
        CommandStatus::TimedOut
    };
    complete(&table, key, status, &response, record);
    CALLBACK_ACK
}

/// Resolve `key` in `table`, run its handler outside the table lock, then
/// retire the entry. Returns false when the key was not in flight.
pub fn complete(
    table: &CommandTable,
    key: CommandKey,
    status: CommandStatus,
    response: &str,
    record: &CommandRecord,
) -> bool {
    let Some(handler) = table.resolve(key, status, record) else {
        warn!("table {}: completion for unknown key {}", table.id(), key);
        return false;
    };
    debug!(
        "table {}: key {} resolved {} with '{}'",
        table.id(),
        key,
        status,
        response
    );

    if let Some(handler) = handler {
        // A failing handler must not keep the entry alive.
        if catch_unwind(AssertUnwindSafe(|| handler(status, response))).is_err() {
            error!("table {}: completion handler for key {} panicked", table.id(), key);
        }
    }

    table.retire(key);
    true
}

/// An unsolicited notification arrived.
pub fn on_notify(message: &str) -> i32 {
    warn!("Received notification: '{}'.", message);
    CALLBACK_ACK
}

/// The library lost the device. Latches a communication error on the
/// owning table (or every live table when no context came along) and
/// returns it.
pub fn on_error(context: Option<TableId>) -> Error {
    error!("{}", COMMUNICATION_LOST);
    let tables = match context.and_then(registry::lookup) {
        Some(table) => vec![table],
        None => registry::all(),
    };
    for table in tables {
        table.latch_fault(COMMUNICATION_LOST);
    }
    Error::DeviceCommunication(COMMUNICATION_LOST.to_string())
}
