// libix3tpc/src/transport/native.rs

#![cfg(feature = "portmanager")]

//! Binding to the vendor PortManager library (`msl_pm.dll`), loaded at run
//! time with libloading.

use std::collections::HashMap;
use std::ffi::{CStr, c_char, c_int, c_ulong, c_void};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};

use log::{debug, error, warn};

use crate::callback;
use crate::constants::CALLBACK_ACK;
use crate::protocol::CommandRecord;
use crate::transport::traits::PortManager;
use crate::types::{InterfaceHandle, TableId};
use crate::{Error, Result};

/// Loaded first; PortManager links against it without declaring it.
pub const BUS_DRIVER_LIBRARY: &str = "msl_pd_1394.dll";
pub const PORT_MANAGER_LIBRARY: &str = "msl_pm.dll";

type PmCallback = unsafe extern "C" fn(
    msg_id: c_ulong,
    w_param: c_ulong,
    l_param: c_ulong,
    pv: *mut c_void,
    context: *mut c_void,
    caller: *mut c_void,
) -> c_int;

type PmInitialize = unsafe extern "C" fn() -> c_int;
type PmEnumInterface = unsafe extern "C" fn() -> c_int;
type PmGetInterfaceInfo = unsafe extern "C" fn(index: c_int, data: *mut *mut c_void) -> c_int;
type PmOpenInterface = unsafe extern "C" fn(data: *mut c_void) -> bool;
type PmCloseInterface = unsafe extern "C" fn(data: *mut c_void) -> bool;
type PmRegisterCallback = unsafe extern "C" fn(
    data: *mut c_void,
    command: PmCallback,
    notify: PmCallback,
    error: PmCallback,
    context: *mut c_void,
) -> bool;
type PmSendCommand = unsafe extern "C" fn(data: *mut c_void, cmd: *mut CommandRecord) -> bool;

/// Records handed to the library, keyed by address. The library writes the
/// response into the record and hands the same pointer back, so each one
/// must stay put until its completion arrives.
fn in_flight() -> &'static Mutex<HashMap<usize, Box<CommandRecord>>> {
    static IN_FLIGHT: OnceLock<Mutex<HashMap<usize, Box<CommandRecord>>>> = OnceLock::new();
    IN_FLIGHT.get_or_init(|| Mutex::new(HashMap::new()))
}

/// `<executable dir>/gtlib`, where the vendor installer puts the libraries.
pub fn default_library_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()
        .map_err(|e| Error::Binding(format!("cannot locate executable: {}", e)))?;
    let dir = exe
        .parent()
        .ok_or_else(|| Error::Binding("executable has no parent directory".into()))?;
    Ok(dir.join("gtlib"))
}

/// PortManager backed by the vendor library.
pub struct NativePortManager {
    _bus_driver: libloading::Library,
    _library: libloading::Library,
    initialize: PmInitialize,
    enum_interface: PmEnumInterface,
    get_interface_info: PmGetInterfaceInfo,
    open_interface: PmOpenInterface,
    close_interface: PmCloseInterface,
    register_callback: PmRegisterCallback,
    send_command: PmSendCommand,
}

impl NativePortManager {
    /// Load from [`default_library_dir`].
    pub fn load() -> Result<Self> {
        Self::load_from(&default_library_dir()?)
    }

    /// Load both libraries from `dir` and resolve the `MSL_PM_*` entry points.
    pub fn load_from(dir: &Path) -> Result<Self> {
        debug!("loading PortManager from {}", dir.display());
        // SAFETY: loading runs the libraries' initialisers; both are the
        // vendor's own and have no other preconditions.
        let bus_driver = unsafe { libloading::Library::new(dir.join(BUS_DRIVER_LIBRARY)) }?;
        let library = unsafe { libloading::Library::new(dir.join(PORT_MANAGER_LIBRARY)) }?;

        // SAFETY: the signatures match the vendor header. The symbols are
        // copied out as plain fn pointers; `library` is kept alive alongside
        // them for as long as `Self` lives.
        unsafe {
            Ok(Self {
                initialize: *library.get::<PmInitialize>(b"MSL_PM_Initialize\0")?,
                enum_interface: *library.get::<PmEnumInterface>(b"MSL_PM_EnumInterface\0")?,
                get_interface_info: *library
                    .get::<PmGetInterfaceInfo>(b"MSL_PM_GetInterfaceInfo\0")?,
                open_interface: *library.get::<PmOpenInterface>(b"MSL_PM_OpenInterface\0")?,
                close_interface: *library.get::<PmCloseInterface>(b"MSL_PM_CloseInterface\0")?,
                register_callback: *library
                    .get::<PmRegisterCallback>(b"MSL_PM_RegisterCallback\0")?,
                send_command: *library.get::<PmSendCommand>(b"MSL_PM_SendCommand\0")?,
                _bus_driver: bus_driver,
                _library: library,
            })
        }
    }
}

impl std::fmt::Debug for NativePortManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativePortManager").finish_non_exhaustive()
    }
}

impl PortManager for NativePortManager {
    fn initialize(&self) -> Result<()> {
        // SAFETY: no arguments.
        let status = unsafe { (self.initialize)() };
        if status != 0 {
            return Err(Error::Binding(format!(
                "MSL_PM_Initialize() failed with code {}",
                status
            )));
        }
        Ok(())
    }

    fn enum_interfaces(&self) -> Result<usize> {
        // SAFETY: no arguments.
        let count = unsafe { (self.enum_interface)() };
        usize::try_from(count)
            .map_err(|_| Error::Binding(format!("MSL_PM_EnumInterface() returned {}", count)))
    }

    fn interface_info(&self, index: usize) -> Result<InterfaceHandle> {
        let index = c_int::try_from(index)
            .map_err(|_| Error::InvalidValue(format!("interface index {} out of range", index)))?;
        let mut data: *mut c_void = std::ptr::null_mut();
        // SAFETY: `data` is a valid out-pointer for the duration of the call.
        unsafe { (self.get_interface_info)(index, &mut data) };
        let handle = InterfaceHandle::from_raw(data as usize);
        if handle.is_null() {
            return Err(Error::Binding(format!(
                "MSL_PM_GetInterfaceInfo() returned no interface at index {}",
                index
            )));
        }
        Ok(handle)
    }

    fn open_interface(&self, handle: InterfaceHandle) -> Result<()> {
        // SAFETY: `handle` came from MSL_PM_GetInterfaceInfo.
        if unsafe { (self.open_interface)(handle.as_raw() as *mut c_void) } {
            Ok(())
        } else {
            Err(Error::Binding("MSL_PM_OpenInterface() failed".into()))
        }
    }

    fn close_interface(&self, handle: InterfaceHandle) -> Result<()> {
        // SAFETY: as for open_interface.
        if unsafe { (self.close_interface)(handle.as_raw() as *mut c_void) } {
            Ok(())
        } else {
            Err(Error::Binding("MSL_PM_CloseInterface() failed".into()))
        }
    }

    fn register_callbacks(&self, handle: InterfaceHandle, context: TableId) -> Result<()> {
        // SAFETY: the trampolines are plain functions with the library's
        // callback signature; `context` is an integer, never dereferenced.
        let ok = unsafe {
            (self.register_callback)(
                handle.as_raw() as *mut c_void,
                command_trampoline,
                notify_trampoline,
                error_trampoline,
                context.as_raw() as *mut c_void,
            )
        };
        if ok {
            Ok(())
        } else {
            Err(Error::Binding("MSL_PM_RegisterCallback() failed".into()))
        }
    }

    fn send_command(&self, handle: InterfaceHandle, record: &CommandRecord) -> Result<()> {
        let mut boxed = Box::new(*record);
        let ptr: *mut CommandRecord = &mut *boxed;
        // Registered before submission: the completion may beat the return.
        in_flight()
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(ptr as usize, boxed);

        // SAFETY: `ptr` points into a boxed record owned by the in-flight
        // map, which only releases it after the completion callback.
        let ok = unsafe { (self.send_command)(handle.as_raw() as *mut c_void, ptr) };
        if !ok {
            in_flight()
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&(ptr as usize));
            return Err(Error::Binding("MSL_PM_SendCommand() failed".into()));
        }
        Ok(())
    }
}

fn context_of(context: *mut c_void) -> Option<TableId> {
    TableId::from_raw(context as usize)
}

unsafe extern "C" fn command_trampoline(
    _msg_id: c_ulong,
    _w_param: c_ulong,
    _l_param: c_ulong,
    pv: *mut c_void,
    context: *mut c_void,
    _caller: *mut c_void,
) -> c_int {
    if pv.is_null() {
        warn!("command callback without a record");
        return CALLBACK_ACK;
    }
    // SAFETY: `pv` is one of the records submitted by send_command, still
    // owned by the in-flight map.
    let record = unsafe { *(pv as *const CommandRecord) };
    let result = catch_unwind(AssertUnwindSafe(|| {
        callback::on_command(&record, context_of(context))
    }));
    in_flight()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&(pv as usize));
    result.unwrap_or_else(|_| {
        error!("command callback panicked for key {}", record.key());
        CALLBACK_ACK
    })
}

unsafe extern "C" fn notify_trampoline(
    _msg_id: c_ulong,
    _w_param: c_ulong,
    _l_param: c_ulong,
    pv: *mut c_void,
    _context: *mut c_void,
    _caller: *mut c_void,
) -> c_int {
    if pv.is_null() {
        return CALLBACK_ACK;
    }
    // SAFETY: the library passes a NUL-terminated message.
    let message = unsafe { CStr::from_ptr(pv as *const c_char) }.to_string_lossy();
    catch_unwind(AssertUnwindSafe(|| callback::on_notify(&message))).unwrap_or(CALLBACK_ACK)
}

unsafe extern "C" fn error_trampoline(
    _msg_id: c_ulong,
    _w_param: c_ulong,
    _l_param: c_ulong,
    _pv: *mut c_void,
    context: *mut c_void,
    _caller: *mut c_void,
) -> c_int {
    let _ = catch_unwind(AssertUnwindSafe(|| callback::on_error(context_of(context))));
    CALLBACK_ACK
}
