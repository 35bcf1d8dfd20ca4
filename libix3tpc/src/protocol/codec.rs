// libix3tpc/src/protocol/codec.rs

use crate::constants::{COMMAND_TERMINATOR, MAX_COMMAND_SIZE};
use crate::protocol::CommandRecord;
use crate::types::{CommandKey, TableId};
use crate::{Error, Result};

/// Append the terminator to a command body, enforcing the ASCII-only and
/// 256-byte limits of the record buffer.
pub fn encode_command(cmd: &str) -> Result<Vec<u8>> {
    if !cmd.is_ascii() {
        return Err(Error::InvalidCommand(format!(
            "command '{}' is not ASCII",
            cmd
        )));
    }
    let total = cmd.len() + COMMAND_TERMINATOR.len();
    if total > MAX_COMMAND_SIZE {
        return Err(Error::PayloadTooLarge {
            max: MAX_COMMAND_SIZE,
            actual: total,
        });
    }
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(cmd.as_bytes());
    out.extend_from_slice(COMMAND_TERMINATOR.as_bytes());
    Ok(out)
}

/// Build the record submitted for `cmd`: body plus terminator, key in the
/// correlation handle, owning table in the context field.
pub fn build_command_record(
    cmd: &str,
    key: CommandKey,
    table: TableId,
    timeout_ms: u64,
) -> Result<CommandRecord> {
    let body = encode_command(cmd)?;
    let mut record = CommandRecord::zeroed();
    record.cmd[..body.len()].copy_from_slice(&body);
    record.cmd_size = body.len() as std::ffi::c_ulong;
    record.callback = key.as_usize();
    record.context = table.as_raw();
    record.command = 1;
    record.set_timeout_ms(timeout_ms);
    Ok(record)
}

/// Decode a response byte run as text. Each byte maps to one character;
/// decoding stops at the first NUL.
pub fn decode_text(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect()
}

/// Decode the response carried by a completed record, bounded by the
/// record's declared response size.
pub fn decode_response(record: &CommandRecord) -> String {
    decode_text(record.response_bytes())
}
