//! C FFI layer for astra.
//!
//! Provides an opaque handle-based API for C/C++/engine consumers. The host
//! plugs its native runtime in through a callback table; the generated C
//! header is written to `include/astra.h` by cbindgen.

use crate::backend::SensorBackend;
use crate::error::LastError;
use crate::updater::{BackgroundUpdater, UpdaterConfig};
use crate::{AstraError, Result};
use std::ffi::{c_char, c_int, c_void};
use std::time::Duration;

/// Thread-safe last error message for C consumers.
static LAST_ERROR: LastError = LastError::new();

/// Native runtime entry points supplied by the host.
///
/// Each callback receives the `user_data` pointer passed to
/// [`astra_updater_new`]. `initialize` and `update` return 0 on success and
/// a nonzero host-defined code on failure. Null entries are treated as
/// always-succeeding no-ops.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct AstraSensorCallbacks {
    pub initialize: Option<unsafe extern "C" fn(user_data: *mut c_void) -> c_int>,
    pub update: Option<unsafe extern "C" fn(user_data: *mut c_void) -> c_int>,
    pub terminate: Option<unsafe extern "C" fn(user_data: *mut c_void)>,
}

/// Rolling averages in microseconds, C-compatible layout.
#[repr(C)]
pub struct AstraTimings {
    pub update_average_us: u64,
    pub lock_wait_average_us: u64,
    pub predicate_loop_average_us: u64,
}

/// Opaque updater handle for C consumers.
pub struct AstraUpdater(BackgroundUpdater);

/// Adapts the host callback table into a [`SensorBackend`].
struct CallbackBackend {
    callbacks: AstraSensorCallbacks,
    user_data: *mut c_void,
}

// The host guarantees the callbacks and user_data are usable from the
// worker thread; that is the contract of astra_updater_new.
unsafe impl Send for CallbackBackend {}

impl SensorBackend for CallbackBackend {
    fn initialize(&mut self) -> Result<()> {
        let Some(f) = self.callbacks.initialize else {
            return Ok(());
        };
        let rc = unsafe { f(self.user_data) };
        if rc == 0 {
            Ok(())
        } else {
            Err(AstraError::NativeInit(format!(
                "host initialize returned {}",
                rc
            )))
        }
    }

    fn update(&mut self) -> Result<()> {
        let Some(f) = self.callbacks.update else {
            return Ok(());
        };
        let rc = unsafe { f(self.user_data) };
        if rc == 0 {
            Ok(())
        } else {
            Err(AstraError::NativeUpdate(format!(
                "host update returned {}",
                rc
            )))
        }
    }

    fn terminate(&mut self) {
        if let Some(f) = self.callbacks.terminate {
            unsafe { f(self.user_data) };
        }
    }
}

/// Raw pointer wrapper so a predicate closure can cross into the worker.
struct SendPtr(*mut c_void);
unsafe impl Send for SendPtr {}

/// Create an updater over a host callback table.
///
/// `update_retry_limit` is the number of retries after a failed native
/// update before the predicate-loop aborts (0 = abort immediately).
/// Returns NULL if `callbacks` is null.
///
/// # Safety
/// `callbacks` must point to a valid table, or be null. The callbacks and
/// `user_data` must remain valid until `astra_updater_free` and must be
/// safe to invoke from a thread other than the caller's.
#[no_mangle]
pub unsafe extern "C" fn astra_updater_new(
    callbacks: *const AstraSensorCallbacks,
    user_data: *mut c_void,
    update_retry_limit: u32,
) -> *mut AstraUpdater {
    if callbacks.is_null() {
        return std::ptr::null_mut();
    }
    let backend = CallbackBackend {
        callbacks: *callbacks,
        user_data,
    };
    let updater = BackgroundUpdater::with_config(
        Box::new(backend),
        UpdaterConfig { update_retry_limit },
    );
    Box::into_raw(Box::new(AstraUpdater(updater)))
}

/// Initialize the native runtime and start the worker thread.
/// Returns 0 on success, -1 on error (check astra_last_error()).
///
/// # Safety
/// `updater` must be a pointer returned by `astra_updater_new`, or null.
#[no_mangle]
pub unsafe extern "C" fn astra_updater_start(updater: *mut AstraUpdater) -> c_int {
    if updater.is_null() {
        return -1;
    }
    let updater = &mut *updater;
    match updater.0.start() {
        Ok(()) => 0,
        Err(e) => {
            LAST_ERROR.set(&e);
            -1
        }
    }
}

/// Stop the worker thread and terminate the native runtime.
/// Safe to call at any time; no-op when not running.
///
/// # Safety
/// `updater` must be a valid updater pointer, or null.
#[no_mangle]
pub unsafe extern "C" fn astra_updater_stop(updater: *mut AstraUpdater) {
    if !updater.is_null() {
        (*updater).0.stop();
    }
}

/// Free an updater, stopping it first if necessary.
///
/// # Safety
/// `updater` must be a pointer returned by `astra_updater_new`, or null.
#[no_mangle]
pub unsafe extern "C" fn astra_updater_free(updater: *mut AstraUpdater) {
    if !updater.is_null() {
        drop(Box::from_raw(updater));
    }
}

/// Ask the worker to pump the runtime until `predicate` returns true.
/// The predicate runs on the worker thread, outside the native-access lock.
/// Returns 0 on success, -1 if the updater is busy or not running.
///
/// # Safety
/// `updater` must be a valid updater pointer, or null. `predicate` and
/// `predicate_data` must be safe to use from the worker thread until the
/// update completes.
#[no_mangle]
pub unsafe extern "C" fn astra_updater_request_update(
    updater: *mut AstraUpdater,
    predicate: Option<unsafe extern "C" fn(user_data: *mut c_void) -> bool>,
    predicate_data: *mut c_void,
) -> c_int {
    if updater.is_null() {
        return -1;
    }
    let Some(predicate) = predicate else {
        return -1;
    };
    let updater = &*updater;
    let data = SendPtr(predicate_data);
    let result = updater
        .0
        .request_update(move || {
            let data = &data;
            unsafe { predicate(data.0) }
        });
    match result {
        Ok(()) => 0,
        Err(e) => {
            LAST_ERROR.set(&e);
            -1
        }
    }
}

/// Wait until the worker is idle.
/// `timeout_ms`: milliseconds to wait; 0 = poll, negative = wait forever.
/// Returns whether idle was reached.
///
/// # Safety
/// `updater` must be a valid updater pointer, or null.
#[no_mangle]
pub unsafe extern "C" fn astra_updater_wait_for_idle(
    updater: *const AstraUpdater,
    timeout_ms: c_int,
) -> bool {
    if updater.is_null() {
        return false;
    }
    let updater = &*updater;
    let timeout = if timeout_ms < 0 {
        None
    } else {
        Some(Duration::from_millis(timeout_ms as u64))
    };
    updater.0.wait_for_idle(timeout)
}

/// True whenever no predicate-loop is active.
///
/// # Safety
/// `updater` must be a valid updater pointer, or null.
#[no_mangle]
pub unsafe extern "C" fn astra_updater_is_complete(updater: *const AstraUpdater) -> bool {
    if updater.is_null() {
        return false;
    }
    (*updater).0.is_complete()
}

/// True from a request until the worker picks it up.
///
/// # Safety
/// `updater` must be a valid updater pointer, or null.
#[no_mangle]
pub unsafe extern "C" fn astra_updater_is_request_pending(updater: *const AstraUpdater) -> bool {
    if updater.is_null() {
        return false;
    }
    (*updater).0.is_request_pending()
}

/// Snapshot the rolling latency averages.
/// Returns 0 on success, -1 on null arguments.
///
/// # Safety
/// `updater` and `out` must be valid pointers, or null.
#[no_mangle]
pub unsafe extern "C" fn astra_updater_timings(
    updater: *const AstraUpdater,
    out: *mut AstraTimings,
) -> c_int {
    if updater.is_null() || out.is_null() {
        return -1;
    }
    let timings = (*updater).0.timings();
    out.write(AstraTimings {
        update_average_us: timings.update_average.as_micros() as u64,
        lock_wait_average_us: timings.lock_wait_average.as_micros() as u64,
        predicate_loop_average_us: timings.predicate_loop_average.as_micros() as u64,
    });
    0
}

/// Get the last error message. Returns NULL if no error.
/// The returned pointer is valid until the next astra API call.
#[no_mangle]
pub extern "C" fn astra_last_error() -> *const c_char {
    LAST_ERROR.as_ptr()
}
