use std::fmt;

/// Errors that can occur when driving the Astra runtime.
#[derive(Debug, thiserror::Error)]
pub enum AstraError {
    #[error("background updater already started")]
    AlreadyStarted,

    #[error("background updater not started")]
    NotStarted,

    #[error("background updater is busy (request pending or predicate-loop active)")]
    NotIdle,

    #[error("invalid lifecycle sequence: {0}")]
    InvalidSequence(&'static str),

    #[error("native initialization failed: {0}")]
    NativeInit(String),

    #[error("native update failed: {0}")]
    NativeUpdate(String),

    #[error("timeout waiting for the background updater")]
    Timeout,

    #[error("worker thread error: {0}")]
    Worker(String),
}

/// Thread-safe last-error storage for the C FFI layer.
pub(crate) struct LastError {
    message: std::sync::Mutex<String>,
}

impl LastError {
    pub const fn new() -> Self {
        Self {
            message: std::sync::Mutex::new(String::new()),
        }
    }

    pub fn set(&self, err: &AstraError) {
        if let Ok(mut msg) = self.message.lock() {
            *msg = fmt::format(format_args!("{}\0", err));
        }
    }

    pub fn as_ptr(&self) -> *const std::ffi::c_char {
        match self.message.lock() {
            Ok(msg) if !msg.is_empty() => msg.as_ptr() as *const std::ffi::c_char,
            _ => std::ptr::null(),
        }
    }
}
