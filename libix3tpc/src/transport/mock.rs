// libix3tpc/src/transport/mock.rs

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use crate::callback;
use crate::constants::COMMAND_TERMINATOR;
use crate::protocol::{decode_text, CommandRecord};
use crate::transport::traits::PortManager;
use crate::types::{InterfaceHandle, TableId};
use crate::{Error, Result};

/// Handle value the mock hands out for interface 0.
pub const MOCK_INTERFACE: InterfaceHandle = InterfaceHandle::from_raw(0x1394);

/// What the mock does with a submitted command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Answer with this response text.
    Respond(String),
    /// Call back without context, as PortManager does on timeout.
    TimeOut,
    /// Accept the command and never call back.
    Silent,
    /// Refuse the submission.
    Reject,
    /// Keep the record until the test releases it.
    Hold,
}

impl Reply {
    pub fn respond(text: &str) -> Self {
        Reply::Respond(text.to_string())
    }
}

#[derive(Debug)]
struct MockState {
    init_code: i32,
    interface_count: usize,
    fail_open: bool,
    fail_register: bool,
    fail_close: bool,
    context: Option<TableId>,
    opened: Option<InterfaceHandle>,
    closed: bool,
    scripts: HashMap<String, VecDeque<Reply>>,
    default_reply: Reply,
    sent: Vec<CommandRecord>,
    held: Vec<CommandRecord>,
    calls: Vec<&'static str>,
}

/// Scripted PortManager for tests. Records every submission and answers
/// from a per-command script on a thread of its own, the way the vendor
/// library does.
#[derive(Debug)]
pub struct MockPortManager {
    state: Mutex<MockState>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl Default for MockPortManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPortManager {
    /// One interface, initialisation succeeds, unscripted commands are
    /// accepted and never answered.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                init_code: 0,
                interface_count: 1,
                fail_open: false,
                fail_register: false,
                fail_close: false,
                context: None,
                opened: None,
                closed: false,
                scripts: HashMap::new(),
                default_reply: Reply::Silent,
                sent: Vec::new(),
                held: Vec::new(),
                calls: Vec::new(),
            }),
            workers: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_init_code(&self, code: i32) {
        self.lock().init_code = code;
    }

    pub fn set_interface_count(&self, count: usize) {
        self.lock().interface_count = count;
    }

    pub fn set_fail_open(&self, fail: bool) {
        self.lock().fail_open = fail;
    }

    pub fn set_fail_register(&self, fail: bool) {
        self.lock().fail_register = fail;
    }

    pub fn set_fail_close(&self, fail: bool) {
        self.lock().fail_close = fail;
    }

    pub fn set_default_reply(&self, reply: Reply) {
        self.lock().default_reply = reply;
    }

    /// Queue a reply for `cmd` (body without terminator). Replies are used
    /// in order; the last one keeps answering.
    pub fn script(&self, cmd: &str, reply: Reply) {
        self.lock()
            .scripts
            .entry(cmd.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Answer every `(command, response)` pair successfully.
    pub fn script_all(&self, pairs: &[(&str, &str)]) {
        for (cmd, rsp) in pairs {
            self.script(cmd, Reply::respond(rsp));
        }
    }

    fn next_reply(state: &mut MockState, cmd: &str) -> Reply {
        match state.scripts.get_mut(cmd) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Reply::Silent),
            Some(queue) => queue.front().cloned().unwrap_or(Reply::Silent),
            None => state.default_reply.clone(),
        }
    }

    /// Submitted command bodies in order, terminators stripped.
    pub fn sent_commands(&self) -> Vec<String> {
        self.lock()
            .sent
            .iter()
            .map(|r| {
                let text = decode_text(r.command_bytes());
                text.strip_suffix(COMMAND_TERMINATOR)
                    .map(str::to_string)
                    .unwrap_or(text)
            })
            .collect()
    }

    /// Submitted records in order.
    pub fn sent_records(&self) -> Vec<CommandRecord> {
        self.lock().sent.clone()
    }

    /// Names of the PortManager primitives called so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.clone()
    }

    pub fn registered_context(&self) -> Option<TableId> {
        self.lock().context
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn held_count(&self) -> usize {
        self.lock().held.len()
    }

    /// Answer every held command with `response`, oldest first.
    pub fn release_held(&self, response: &str) {
        let (held, context) = {
            let mut state = self.lock();
            (std::mem::take(&mut state.held), state.context)
        };
        for mut record in held {
            record.set_response(response.as_bytes());
            self.deliver(record, context);
        }
    }

    /// Time out every held command, oldest first.
    pub fn expire_held(&self) {
        let held = std::mem::take(&mut self.lock().held);
        for record in held {
            self.deliver(record, None);
        }
    }

    /// Push an unsolicited notification through the callback adapter.
    pub fn notify(&self, message: &str) -> i32 {
        callback::on_notify(message)
    }

    /// Raise the error callback, e.g. a disconnected cable.
    pub fn raise_error(&self) -> Error {
        let context = self.lock().context;
        callback::on_error(context)
    }

    /// Wait until every callback thread spawned so far has finished.
    pub fn wait_idle(&self) {
        let workers = std::mem::take(
            &mut *self.workers.lock().unwrap_or_else(PoisonError::into_inner),
        );
        for worker in workers {
            let _ = worker.join();
        }
    }

    fn deliver(&self, record: CommandRecord, context: Option<TableId>) {
        let worker = std::thread::spawn(move || {
            callback::on_command(&record, context);
        });
        self.workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(worker);
    }
}

impl PortManager for MockPortManager {
    fn initialize(&self) -> Result<()> {
        let mut state = self.lock();
        state.calls.push("initialize");
        match state.init_code {
            0 => Ok(()),
            code => Err(Error::Binding(format!(
                "MSL_PM_Initialize() failed with code {}",
                code
            ))),
        }
    }

    fn enum_interfaces(&self) -> Result<usize> {
        let mut state = self.lock();
        state.calls.push("enum_interfaces");
        Ok(state.interface_count)
    }

    fn interface_info(&self, index: usize) -> Result<InterfaceHandle> {
        let mut state = self.lock();
        state.calls.push("interface_info");
        if index >= state.interface_count {
            return Err(Error::Binding(format!("no interface at index {}", index)));
        }
        Ok(InterfaceHandle::from_raw(MOCK_INTERFACE.as_raw() + index))
    }

    fn open_interface(&self, handle: InterfaceHandle) -> Result<()> {
        let mut state = self.lock();
        state.calls.push("open_interface");
        if state.fail_open {
            return Err(Error::Binding("MSL_PM_OpenInterface() failed".into()));
        }
        state.opened = Some(handle);
        state.closed = false;
        Ok(())
    }

    fn close_interface(&self, handle: InterfaceHandle) -> Result<()> {
        let mut state = self.lock();
        state.calls.push("close_interface");
        if state.fail_close || state.opened != Some(handle) {
            return Err(Error::Binding("MSL_PM_CloseInterface() failed".into()));
        }
        state.closed = true;
        Ok(())
    }

    fn register_callbacks(&self, _handle: InterfaceHandle, context: TableId) -> Result<()> {
        let mut state = self.lock();
        state.calls.push("register_callbacks");
        if state.fail_register {
            return Err(Error::Binding("MSL_PM_RegisterCallback() failed".into()));
        }
        state.context = Some(context);
        Ok(())
    }

    fn send_command(&self, _handle: InterfaceHandle, record: &CommandRecord) -> Result<()> {
        let (reply, context) = {
            let mut state = self.lock();
            state.calls.push("send_command");
            state.sent.push(*record);
            let text = decode_text(record.command_bytes());
            let body = text.strip_suffix(COMMAND_TERMINATOR).unwrap_or(&text);
            let reply = Self::next_reply(&mut state, body);
            if reply == Reply::Hold {
                state.held.push(*record);
            }
            (reply, state.context)
        };

        match reply {
            Reply::Respond(text) => {
                let mut completed = *record;
                completed.set_response(text.as_bytes());
                self.deliver(completed, context);
                Ok(())
            }
            Reply::TimeOut => {
                self.deliver(*record, None);
                Ok(())
            }
            Reply::Reject => Err(Error::Binding("MSL_PM_SendCommand() failed".into())),
            Reply::Silent | Reply::Hold => Ok(()),
        }
    }
}
