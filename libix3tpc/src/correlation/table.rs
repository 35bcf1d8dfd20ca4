// libix3tpc/src/correlation/table.rs

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::debug;

use crate::protocol::CommandRecord;
use crate::types::{CommandKey, CommandStatus, TableId};
use crate::{Error, Result};

/// Called once when a command resolves, with the status and decoded
/// response. Runs on the PortManager callback thread.
pub type CompletionHandler = Box<dyn FnOnce(CommandStatus, &str) + Send + 'static>;

/// One in-flight command.
pub struct TableEntry {
    pub status: CommandStatus,
    pub record: CommandRecord,
    handler: Option<CompletionHandler>,
}

impl std::fmt::Debug for TableEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableEntry")
            .field("status", &self.status)
            .field("record", &self.record)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

#[derive(Default)]
struct TableState {
    entries: HashMap<CommandKey, TableEntry>,
    fault: Option<String>,
}

/// Correlation table. Inserts happen on the submitting thread, status
/// changes and removals on the callback thread; a single mutex serialises
/// both. The lock is never held while a completion handler runs.
pub struct CommandTable {
    id: TableId,
    key_limit: usize,
    state: Mutex<TableState>,
}

impl CommandTable {
    /// Only the registry constructs tables, so every table has an id that
    /// resolves back to it.
    pub(crate) fn new(id: TableId, key_limit: usize) -> Self {
        Self {
            id,
            key_limit,
            state: Mutex::new(TableState::default()),
        }
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    /// Number of distinct keys this table may hand out.
    pub fn key_limit(&self) -> usize {
        self.key_limit
    }

    fn lock(&self) -> MutexGuard<'_, TableState> {
        // Every operation leaves the map consistent before it can panic.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lowest non-negative key not currently in the table.
    fn allocate(&self, entries: &HashMap<CommandKey, TableEntry>) -> Result<CommandKey> {
        (0..self.key_limit)
            .map(CommandKey::new)
            .find(|k| !entries.contains_key(k))
            .ok_or(Error::ResourceExhausted)
    }

    /// Allocate a key and insert a `Pending` entry for it in one step.
    /// `build` receives the key and produces the record to store; the
    /// stored record is returned for submission.
    pub fn insert_pending<F>(
        &self,
        build: F,
        handler: Option<CompletionHandler>,
    ) -> Result<(CommandKey, CommandRecord)>
    where
        F: FnOnce(CommandKey) -> Result<CommandRecord>,
    {
        let mut state = self.lock();
        if let Some(reason) = &state.fault {
            return Err(Error::DeviceCommunication(reason.clone()));
        }
        let key = self.allocate(&state.entries)?;
        let record = build(key)?;
        state.entries.insert(
            key,
            TableEntry {
                status: CommandStatus::Pending,
                record,
                handler,
            },
        );
        debug!("table {}: key {} pending ({} in flight)", self.id, key, state.entries.len());
        Ok((key, record))
    }

    /// Move `key` to its terminal status, store the completed record and
    /// hand out the completion handler. Returns `None` when the key is
    /// unknown. The entry stays in the table until [`retire`](Self::retire).
    pub fn resolve(
        &self,
        key: CommandKey,
        status: CommandStatus,
        completed: &CommandRecord,
    ) -> Option<Option<CompletionHandler>> {
        let mut state = self.lock();
        let entry = state.entries.get_mut(&key)?;
        entry.status = status;
        entry.record = *completed;
        Some(entry.handler.take())
    }

    /// Remove the entry for `key`.
    pub fn retire(&self, key: CommandKey) -> Option<TableEntry> {
        let removed = self.lock().entries.remove(&key);
        if removed.is_some() {
            debug!("table {}: key {} retired", self.id, key);
        }
        removed
    }

    pub fn status(&self, key: CommandKey) -> Option<CommandStatus> {
        self.lock().entries.get(&key).map(|e| e.status)
    }

    pub fn contains(&self, key: CommandKey) -> bool {
        self.lock().entries.contains_key(&key)
    }

    /// Snapshot of the record stored for `key`.
    pub fn record(&self, key: CommandKey) -> Option<CommandRecord> {
        self.lock().entries.get(&key).map(|e| e.record)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys currently in flight, ascending.
    pub fn keys(&self) -> Vec<CommandKey> {
        let mut keys: Vec<_> = self.lock().entries.keys().copied().collect();
        keys.sort();
        keys
    }

    /// Record an unrecoverable communication failure. Subsequent inserts
    /// fail with it; the first reason is kept.
    pub fn latch_fault(&self, reason: impl Into<String>) {
        let mut state = self.lock();
        if state.fault.is_none() {
            state.fault = Some(reason.into());
        }
    }

    pub fn fault(&self) -> Option<Error> {
        self.lock()
            .fault
            .as_ref()
            .map(|reason| Error::DeviceCommunication(reason.clone()))
    }
}

impl Drop for CommandTable {
    fn drop(&mut self) {
        super::registry::remove(self.id);
    }
}

impl std::fmt::Debug for CommandTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandTable")
            .field("id", &self.id)
            .field("in_flight", &self.len())
            .finish()
    }
}
