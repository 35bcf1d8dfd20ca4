// libix3tpc/src/correlation/mod.rs

//! In-flight command bookkeeping.
//!
//! A [`CommandTable`] maps each outstanding [`CommandKey`](crate::CommandKey)
//! to its status, the submitted record and an optional completion handler.
//! Tables live in a process-wide [`registry`] so the PortManager callback,
//! which only sees the raw record, can find the table that owns a key.

pub mod registry;
pub mod table;

pub use table::{CommandTable, CompletionHandler, TableEntry};
