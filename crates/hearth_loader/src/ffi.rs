//! C ABI adapter for hosts that embed the runtime from C or C++.
//!
//! A C host fills in a [`HostConfig`] and installs it as the
//! [`ExternalHost`]. When script code registers its callbacks, the host's
//! `main_call` receives an opaque [`CallbacksHandle`] and drives the runtime
//! through the `hearth_callbacks_*` functions. Strings cross the boundary as
//! UTF-16 `(pointer, length)` pairs, lengths in code units.
//!
//! The handle is owned by the host from the moment `main_call` receives it
//! and must be freed with [`hearth_callbacks_release`] on the thread that
//! received it.

use std::rc::Rc;

use tracing::warn;

use crate::bridge::{ExternalHost, HostCallbacks};

/// Receives a callbacks handle. The host takes ownership of it.
pub type MainCallFn = unsafe extern "C" fn(callbacks: *mut CallbacksHandle);

/// Receives `length` bytes of runtime output at `data`.
pub type OutputFn = unsafe extern "C" fn(data: *const u8, length: usize);

/// The host's three entry points, laid out for C.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HostConfig {
    /// Called once per `registerBridge`.
    pub main_call: MainCallFn,
    /// Called for every `forwardStdout`.
    pub stdout_call: OutputFn,
    /// Called for every `forwardStderr`.
    pub stderr_call: OutputFn,
}

impl ExternalHost for HostConfig {
    fn main_call(&self, callbacks: Rc<dyn HostCallbacks>) {
        let handle = Box::into_raw(Box::new(CallbacksHandle { callbacks }));
        // SAFETY: the host contract requires a valid function pointer; the
        // handle is a fresh allocation the host now owns.
        unsafe { (self.main_call)(handle) }
    }

    fn stdout_call(&self, data: &[u8]) {
        // SAFETY: `data` is valid for `data.len()` bytes for the duration of
        // the call.
        unsafe { (self.stdout_call)(data.as_ptr(), data.len()) }
    }

    fn stderr_call(&self, data: &[u8]) {
        // SAFETY: as for `stdout_call`.
        unsafe { (self.stderr_call)(data.as_ptr(), data.len()) }
    }
}

/// Opaque record handed to the C host. Only usable through the
/// `hearth_callbacks_*` functions.
pub struct CallbacksHandle {
    callbacks: Rc<dyn HostCallbacks>,
}

/// Borrows the callbacks behind a handle, or `None` for a null pointer.
///
/// # Safety
///
/// `handle` must be null or a live pointer received through `main_call`.
unsafe fn callbacks<'a>(handle: *const CallbacksHandle) -> Option<&'a dyn HostCallbacks> {
    // SAFETY: upheld by the caller.
    unsafe { handle.as_ref() }.map(|h| h.callbacks.as_ref())
}

/// Decodes a UTF-16 `(pointer, length)` pair. A null pointer with zero length
/// is the empty string; unpaired surrogates are an error.
///
/// # Safety
///
/// `data` must be null or valid for reads of `length` code units.
unsafe fn decode_utf16(data: *const u16, length: usize) -> Option<String> {
    if data.is_null() {
        return (length == 0).then(String::new);
    }
    // SAFETY: upheld by the caller.
    let units = unsafe { std::slice::from_raw_parts(data, length) };
    String::from_utf16(units).ok()
}

fn report(operation: &str, result: Result<(), hearth_engine::ScriptError>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            warn!(operation, error = %err, "host callback failed");
            false
        }
    }
}

/// Runs the runtime's main entry point. Returns `false` on failure.
///
/// # Safety
///
/// `handle` must be null or a live handle received through `main_call`.
#[no_mangle]
pub unsafe extern "C" fn hearth_callbacks_call_main(handle: *const CallbacksHandle) -> bool {
    // SAFETY: upheld by the caller.
    match unsafe { callbacks(handle) } {
        Some(cb) => report("callMain", cb.call_main()),
        None => false,
    }
}

/// Loads the module at the UTF-16 path. Returns `false` on failure or if the
/// path is not valid UTF-16.
///
/// # Safety
///
/// `handle` as for [`hearth_callbacks_call_main`]; `path` must be null or
/// valid for `length` code units.
#[no_mangle]
pub unsafe extern "C" fn hearth_callbacks_require(
    handle: *const CallbacksHandle,
    path: *const u16,
    length: usize,
) -> bool {
    // SAFETY: upheld by the caller.
    let (Some(cb), Some(path)) = (unsafe { callbacks(handle) }, unsafe { decode_utf16(path, length) })
    else {
        return false;
    };
    report("require", cb.require(&path))
}

/// Writes a UTF-16 message to the runtime's log.
///
/// # Safety
///
/// As for [`hearth_callbacks_require`].
#[no_mangle]
pub unsafe extern "C" fn hearth_callbacks_log(
    handle: *const CallbacksHandle,
    message: *const u16,
    length: usize,
) -> bool {
    // SAFETY: upheld by the caller.
    let (Some(cb), Some(message)) =
        (unsafe { callbacks(handle) }, unsafe { decode_utf16(message, length) })
    else {
        return false;
    };
    report("log", cb.log(&message))
}

/// Writes a UTF-16 message to the runtime's error log.
///
/// # Safety
///
/// As for [`hearth_callbacks_require`].
#[no_mangle]
pub unsafe extern "C" fn hearth_callbacks_error(
    handle: *const CallbacksHandle,
    message: *const u16,
    length: usize,
) -> bool {
    // SAFETY: upheld by the caller.
    let (Some(cb), Some(message)) =
        (unsafe { callbacks(handle) }, unsafe { decode_utf16(message, length) })
    else {
        return false;
    };
    report("error", cb.error(&message))
}

/// Drains the runtime's pending tick queue.
///
/// # Safety
///
/// As for [`hearth_callbacks_call_main`].
#[no_mangle]
pub unsafe extern "C" fn hearth_callbacks_tick(handle: *const CallbacksHandle) -> bool {
    // SAFETY: upheld by the caller.
    match unsafe { callbacks(handle) } {
        Some(cb) => report("tickCallback", cb.tick_callback()),
        None => false,
    }
}

/// Frees a handle received through `main_call`. Null is ignored.
///
/// # Safety
///
/// `handle` must be null or a live handle, and must not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn hearth_callbacks_release(handle: *mut CallbacksHandle) {
    if !handle.is_null() {
        // SAFETY: the handle came from `Box::into_raw` in `main_call`.
        drop(unsafe { Box::from_raw(handle) });
    }
}
