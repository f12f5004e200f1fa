//! # astra - background update coordination for depth-camera hosts
//!
//! Drives a non-reentrant native sensor runtime from a dedicated worker
//! thread so a foreground frame loop never blocks for a full native update.
//! Provides:
//! - Serialized native access behind a single mutex, from either thread
//! - Async "pump until this condition holds" requests with per-request predicates
//! - Bounded and unbounded idle waits for exclusive foreground access
//! - Rolling latency averages (update, lock-wait, predicate-loop)
//! - C FFI for integration with C/C++/Unity hosts
//!
//! ## Quick Start
//! ```no_run
//! use astra::{BackgroundUpdater, SensorBackend};
//!
//! struct MyRuntime;
//! impl SensorBackend for MyRuntime {
//!     fn initialize(&mut self) -> astra::Result<()> { Ok(()) }
//!     fn update(&mut self) -> astra::Result<()> { Ok(()) }
//!     fn terminate(&mut self) {}
//! }
//!
//! let mut updater = BackgroundUpdater::new(Box::new(MyRuntime));
//! updater.start().unwrap();
//!
//! // Once per rendered frame:
//! if updater.is_complete() {
//!     updater.wait_for_idle(None);
//!     // ... read freshly produced frames via updater.lock_native() ...
//!     updater.request_update(|| /* new frame available? */ true).unwrap();
//! }
//! println!("avg update: {:?}", updater.timings().update_average);
//!
//! updater.stop();
//! ```

pub mod error;
pub mod timing;
pub mod backend;
pub mod updater;
pub mod context;
pub mod ffi;

pub use backend::SensorBackend;
pub use context::SensorContext;
pub use error::AstraError;
pub use timing::{BackgroundTimings, RollingTimer};
pub use updater::{BackgroundUpdater, UpdaterConfig};

/// Result type alias for astra operations.
pub type Result<T> = std::result::Result<T, AstraError>;
