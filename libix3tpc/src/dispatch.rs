// libix3tpc/src/dispatch.rs

//! Command dispatcher.
//!
//! [`Dispatcher::send`] is fire-and-forget: it registers the command in the
//! correlation table and hands the record to PortManager. The blocking and
//! async variants attach their own completion handler and wait for it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

use log::{debug, error};

use crate::config::ControllerConfig;
use crate::correlation::CommandTable;
use crate::protocol::build_command_record;
use crate::transport::PortManager;
use crate::types::{CommandKey, CommandStatus, InterfaceHandle};
use crate::utils::poll_ceiling;
use crate::{Error, Result};

pub use crate::correlation::CompletionHandler;

/// Build a handler that receives `args` after the status and response.
pub fn bind_args<A, F>(handler: F, args: A) -> CompletionHandler
where
    A: Send + 'static,
    F: FnOnce(CommandStatus, &str, A) + Send + 'static,
{
    Box::new(move |status, response| handler(status, response, args))
}

/// Outcome slot shared between a blocking caller and its handler.
#[derive(Default)]
struct Completion {
    outcome: Mutex<Option<(CommandStatus, String)>>,
    ready: Condvar,
}

impl Completion {
    fn fill(&self, status: CommandStatus, response: &str) {
        let mut outcome = self.outcome.lock().unwrap_or_else(PoisonError::into_inner);
        *outcome = Some((status, response.to_string()));
        self.ready.notify_all();
    }
}

/// Submits commands over one opened PortManager interface.
pub struct Dispatcher {
    port: Arc<dyn PortManager>,
    interface: InterfaceHandle,
    table: Arc<CommandTable>,
    poll_interval: Duration,
    default_timeout_ms: u64,
    closed: AtomicBool,
}

impl Dispatcher {
    pub fn new(
        port: Arc<dyn PortManager>,
        interface: InterfaceHandle,
        table: Arc<CommandTable>,
        config: &ControllerConfig,
    ) -> Self {
        Self {
            port,
            interface,
            table,
            poll_interval: config.poll_interval,
            default_timeout_ms: config.default_timeout_ms,
            closed: AtomicBool::new(false),
        }
    }

    pub fn table(&self) -> &Arc<CommandTable> {
        &self.table
    }

    pub fn interface(&self) -> InterfaceHandle {
        self.interface
    }

    pub fn default_timeout_ms(&self) -> u64 {
        self.default_timeout_ms
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Refuse further submissions once the interface is closed.
    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Submit `cmd` (body only, no terminator) and return its key.
    ///
    /// The handler runs once on the callback thread when the command
    /// resolves. Returning `Ok` does not mean PortManager accepted the
    /// command: a refused submission is logged and its entry stays pending,
    /// since no callback will ever retire it.
    pub fn send(
        &self,
        cmd: &str,
        handler: Option<CompletionHandler>,
        timeout_ms: u64,
    ) -> Result<CommandKey> {
        if self.is_closed() {
            return Err(Error::InterfaceClosed);
        }
        let table_id = self.table.id();
        let (key, record) = self.table.insert_pending(
            |key| build_command_record(cmd, key, table_id, timeout_ms),
            handler,
        )?;
        debug!("sending '{}' as key {} (timeout {} ms)", cmd, key, timeout_ms);
        #[cfg(feature = "diagnostics")]
        log::trace!("command bytes: {:02x?}", record.command_bytes());

        if let Err(e) = self.port.send_command(self.interface, &record) {
            error!("MSL_PM_SendCommand() failed for command '{}': {}", cmd, e);
        }
        Ok(key)
    }

    /// [`send_blocking_with`](Self::send_blocking_with) using the configured
    /// poll interval.
    pub fn send_blocking(&self, cmd: &str, timeout_ms: u64) -> Result<(CommandStatus, String)> {
        self.send_blocking_with(cmd, timeout_ms, self.poll_interval)
    }

    /// Submit `cmd` and wait for it to resolve.
    ///
    /// Waits for at most `poll_ceiling(timeout_ms, poll_interval)` intervals;
    /// PortManager is expected to report a timeout before that. Gives up
    /// with `(Pending, "")` otherwise. Fails early if the error callback
    /// fired in the meantime.
    pub fn send_blocking_with(
        &self,
        cmd: &str,
        timeout_ms: u64,
        poll_interval: Duration,
    ) -> Result<(CommandStatus, String)> {
        let completion = Arc::new(Completion::default());
        let writer = Arc::clone(&completion);
        self.send(
            cmd,
            Some(Box::new(move |status, response| writer.fill(status, response))),
            timeout_ms,
        )?;

        let polls = poll_ceiling(timeout_ms, poll_interval);
        let mut outcome = completion
            .outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for _ in 0..polls {
            if outcome.is_some() {
                break;
            }
            if let Some(fault) = self.table.fault() {
                return Err(fault);
            }
            outcome = completion
                .ready
                .wait_timeout_while(outcome, poll_interval, |o| o.is_none())
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }

        match outcome.take() {
            Some(resolved) => Ok(resolved),
            None => {
                debug!("gave up waiting for '{}' after {} polls", cmd, polls);
                Ok((CommandStatus::Pending, String::new()))
            }
        }
    }

    /// Submit `cmd` and await its resolution, bounded like
    /// [`send_blocking`](Self::send_blocking). The fault latch is checked
    /// once per poll interval, so a lost device fails the call promptly.
    #[cfg(feature = "async")]
    pub async fn send_async(&self, cmd: &str, timeout_ms: u64) -> Result<(CommandStatus, String)> {
        let (tx, mut rx) = tokio::sync::oneshot::channel();
        self.send(
            cmd,
            Some(Box::new(move |status, response: &str| {
                let _ = tx.send((status, response.to_string()));
            })),
            timeout_ms,
        )?;

        let deadline = tokio::time::sleep(crate::utils::max_wait(timeout_ms, self.poll_interval));
        tokio::pin!(deadline);
        let mut ticks = tokio::time::interval(self.poll_interval.max(Duration::from_micros(1)));
        loop {
            tokio::select! {
                resolved = &mut rx => {
                    if let Ok(resolved) = resolved {
                        return Ok(resolved);
                    }
                    break;
                }
                _ = &mut deadline => break,
                _ = ticks.tick() => {
                    if let Some(fault) = self.table.fault() {
                        return Err(fault);
                    }
                }
            }
        }

        match self.table.fault() {
            Some(fault) => Err(fault),
            None => {
                debug!("gave up waiting for '{}'", cmd);
                Ok((CommandStatus::Pending, String::new()))
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("interface", &self.interface)
            .field("table", &self.table)
            .field("poll_interval", &self.poll_interval)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Async submission seam.
#[cfg(feature = "async")]
#[async_trait::async_trait]
pub trait AsyncCommander: Send + Sync {
    async fn send_command_async(
        &self,
        cmd: &str,
        timeout_ms: u64,
    ) -> Result<(CommandStatus, String)>;
}

#[cfg(feature = "async")]
#[async_trait::async_trait]
impl AsyncCommander for Dispatcher {
    async fn send_command_async(
        &self,
        cmd: &str,
        timeout_ms: u64,
    ) -> Result<(CommandStatus, String)> {
        self.send_async(cmd, timeout_ms).await
    }
}
