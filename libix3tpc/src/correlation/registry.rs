// libix3tpc/src/correlation/registry.rs

//! Process-wide table registry.
//!
//! PortManager hands the callback nothing but the record it was given, so
//! the record's context field carries a [`TableId`] that is resolved here.
//! The registry holds weak references; dropping the last strong reference to
//! a table unregisters it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

use super::CommandTable;
use crate::types::TableId;

static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

fn tables() -> MutexGuard<'static, HashMap<TableId, Weak<CommandTable>>> {
    static TABLES: OnceLock<Mutex<HashMap<TableId, Weak<CommandTable>>>> = OnceLock::new();
    TABLES
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn next_id() -> TableId {
    loop {
        // Zero is reserved for "no context"; skip it if the counter wraps.
        if let Some(id) = TableId::from_raw(NEXT_ID.fetch_add(1, Ordering::Relaxed)) {
            return id;
        }
    }
}

/// Create and register a table that hands out keys in `0..key_limit`.
pub fn create(key_limit: usize) -> Arc<CommandTable> {
    let id = next_id();
    let table = Arc::new(CommandTable::new(id, key_limit));
    tables().insert(id, Arc::downgrade(&table));
    table
}

/// Resolve an id to its table, if the table is still alive.
pub fn lookup(id: TableId) -> Option<Arc<CommandTable>> {
    let weak = tables().get(&id).cloned()?;
    weak.upgrade()
}

/// All live tables.
pub fn all() -> Vec<Arc<CommandTable>> {
    let weaks: Vec<_> = tables().values().cloned().collect();
    weaks.iter().filter_map(Weak::upgrade).collect()
}

/// Number of registered tables.
pub fn len() -> usize {
    tables().len()
}

pub(crate) fn remove(id: TableId) -> bool {
    tables().remove(&id).is_some()
}
