// libix3tpc/src/protocol/record.rs

use std::ffi::{c_int, c_long, c_longlong, c_uint, c_ulong, c_ushort};

use crate::constants::{MAX_COMMAND_SIZE, MAX_RESPONSE_SIZE, MAX_TAG_SIZE, SZ_SMALL};
use crate::types::{CommandKey, TableId};

/// One request/response exchange with PortManager (`MDK_MSL_CMD`).
///
/// Layout matches the vendor header field for field. Pointer-typed fields
/// are held as `usize` so the record stays `Send` and can be snapshotted;
/// they are never dereferenced on the Rust side.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CommandRecord {
    pub signature: c_ulong,
    pub unit_type: c_int,
    pub sequence: c_ushort,
    pub from: [u8; SZ_SMALL],
    pub to: [u8; SZ_SMALL],
    pub status: c_int,
    pub result: c_ulong,
    pub sync: c_long,
    /// Non-zero for a command, zero for a query.
    pub command: c_long,
    /// Non-zero means PortManager does not wait for a response.
    pub send_only: c_long,
    pub start_time: c_longlong,
    pub finish_time: c_longlong,
    pub timeout_ms: c_ulong,
    /// Correlation handle; carries the command key.
    pub callback: usize,
    pub event: usize,
    /// Opaque context; carries the owning table id.
    pub context: usize,
    pub timer_id: c_uint,
    pub port_context: usize,
    pub ext1: c_ulong,
    pub ext2: c_ulong,
    pub ext3: c_ulong,
    pub lext1: c_longlong,
    pub lext2: c_longlong,
    pub tag_size: c_ulong,
    pub tag: [u8; MAX_TAG_SIZE],
    pub cmd_size: c_ulong,
    pub cmd: [u8; MAX_COMMAND_SIZE],
    pub rsp_size: c_ulong,
    pub rsp: [u8; MAX_RESPONSE_SIZE],
}

impl CommandRecord {
    /// A zeroed record.
    pub const fn zeroed() -> Self {
        Self {
            signature: 0,
            unit_type: 0,
            sequence: 0,
            from: [0; SZ_SMALL],
            to: [0; SZ_SMALL],
            status: 0,
            result: 0,
            sync: 0,
            command: 0,
            send_only: 0,
            start_time: 0,
            finish_time: 0,
            timeout_ms: 0,
            callback: 0,
            event: 0,
            context: 0,
            timer_id: 0,
            port_context: 0,
            ext1: 0,
            ext2: 0,
            ext3: 0,
            lext1: 0,
            lext2: 0,
            tag_size: 0,
            tag: [0; MAX_TAG_SIZE],
            cmd_size: 0,
            cmd: [0; MAX_COMMAND_SIZE],
            rsp_size: 0,
            rsp: [0; MAX_RESPONSE_SIZE],
        }
    }

    /// Key stored in the correlation handle. A null handle reads as key 0.
    pub fn key(&self) -> CommandKey {
        CommandKey::new(self.callback)
    }

    /// Table that owns this record, if the context field was set.
    pub fn table_id(&self) -> Option<TableId> {
        TableId::from_raw(self.context)
    }

    pub fn set_timeout_ms(&mut self, timeout_ms: u64) {
        self.timeout_ms = c_ulong::try_from(timeout_ms).unwrap_or(c_ulong::MAX);
    }

    /// Command body bytes, bounded by both the declared size and capacity.
    pub fn command_bytes(&self) -> &[u8] {
        let len = (self.cmd_size as usize).min(MAX_COMMAND_SIZE);
        &self.cmd[..len]
    }

    /// Response bytes, bounded by both the declared size and capacity.
    pub fn response_bytes(&self) -> &[u8] {
        let len = (self.rsp_size as usize).min(MAX_RESPONSE_SIZE);
        &self.rsp[..len]
    }

    /// Store a response into the record. Longer responses are truncated to
    /// the buffer capacity.
    pub fn set_response(&mut self, response: &[u8]) {
        let len = response.len().min(MAX_RESPONSE_SIZE);
        self.rsp = [0; MAX_RESPONSE_SIZE];
        self.rsp[..len].copy_from_slice(&response[..len]);
        self.rsp_size = len as c_ulong;
    }
}

impl Default for CommandRecord {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl std::fmt::Debug for CommandRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRecord")
            .field("key", &self.callback)
            .field("context", &self.context)
            .field("command", &self.command)
            .field("timeout_ms", &self.timeout_ms)
            .field(
                "cmd",
                &String::from_utf8_lossy(self.command_bytes()).into_owned(),
            )
            .field(
                "rsp",
                &String::from_utf8_lossy(self.response_bytes()).into_owned(),
            )
            .finish()
    }
}
