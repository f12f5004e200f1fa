use crate::Result;

/// The native sensor runtime, seen as an opaque collaborator.
///
/// The Astra runtime is non-reentrant: every call through this trait must be
/// serialized, which the [`BackgroundUpdater`](crate::BackgroundUpdater)
/// enforces with a single mutex around the backend. Accessors the native SDK
/// documents as thread-safe and lock-free are deliberately not part of this
/// trait; request predicates reach them directly (atomics, channels,
/// whatever the host exposes) without taking the native lock.
pub trait SensorBackend: Send {
    /// One-time runtime initialization, called during
    /// [`BackgroundUpdater::start`](crate::BackgroundUpdater::start).
    fn initialize(&mut self) -> Result<()>;

    /// Pump the sensor pipeline once. Blocks for as long as the native
    /// runtime needs; duration is opaque to the updater.
    fn update(&mut self) -> Result<()>;

    /// Runtime teardown, called during
    /// [`BackgroundUpdater::stop`](crate::BackgroundUpdater::stop).
    /// Infallible: teardown failures have nowhere useful to go.
    fn terminate(&mut self);
}
