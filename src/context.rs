use crate::backend::SensorBackend;
use crate::timing::BackgroundTimings;
use crate::updater::{BackgroundUpdater, UpdaterConfig};
use crate::Result;
use std::time::Duration;

type LifecycleHook = Box<dyn FnMut() + Send>;

/// Host-facing wrapper tying runtime lifecycle to the background updater.
///
/// Constructed once by the application's startup sequence and passed by
/// reference to whoever needs it; there is no hidden process-wide instance.
/// Collaborators that must run code at defined lifecycle points register
/// explicit hooks before [`initialize`](Self::initialize) instead of
/// subscribing to events.
///
/// `initialize`/`terminate` are idempotent. Because the updater underneath is
/// single-use, a context cannot be re-initialized after `terminate`;
/// construct a new one.
pub struct SensorContext {
    updater: BackgroundUpdater,
    initialized: bool,
    initializing: bool,
    on_initializing: Option<LifecycleHook>,
    on_terminating: Option<LifecycleHook>,
}

impl SensorContext {
    pub fn new(backend: Box<dyn SensorBackend>) -> Self {
        Self::with_config(backend, UpdaterConfig::default())
    }

    pub fn with_config(backend: Box<dyn SensorBackend>, config: UpdaterConfig) -> Self {
        Self {
            updater: BackgroundUpdater::with_config(backend, config),
            initialized: false,
            initializing: false,
            on_initializing: None,
            on_terminating: None,
        }
    }

    /// Register a hook invoked synchronously once the runtime is up.
    pub fn on_initializing(mut self, hook: impl FnMut() + Send + 'static) -> Self {
        self.on_initializing = Some(Box::new(hook));
        self
    }

    /// Register a hook invoked synchronously just before teardown.
    pub fn on_terminating(mut self, hook: impl FnMut() + Send + 'static) -> Self {
        self.on_terminating = Some(Box::new(hook));
        self
    }

    /// Bring up the native runtime and the background updater.
    ///
    /// Returns immediately when already initialized, or when called
    /// re-entrantly from the `on_initializing` hook.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            log::info!("Astra runtime previously initialized");
            return Ok(());
        }
        if self.initializing {
            return Ok(());
        }
        self.initializing = true;
        log::info!("Astra runtime initializing");

        if let Err(e) = self.updater.start() {
            self.initializing = false;
            return Err(e);
        }
        if let Some(hook) = &mut self.on_initializing {
            hook();
        }

        self.initialized = true;
        self.initializing = false;
        Ok(())
    }

    /// Tear down the updater and the native runtime. No-op when not
    /// initialized.
    pub fn terminate(&mut self) {
        if !self.initialized {
            return;
        }
        log::info!("Astra runtime terminating");
        if let Some(hook) = &mut self.on_terminating {
            hook();
        }
        self.updater.stop();
        self.initialized = false;
    }

    /// Ask the worker to pump the runtime until `predicate` returns true.
    pub fn update_async<F>(&self, predicate: F) -> Result<()>
    where
        F: FnMut() -> bool + Send + 'static,
    {
        self.updater.request_update(predicate)
    }

    /// Wait until the background update completes; `None` waits indefinitely.
    pub fn wait_for_update(&self, timeout: Option<Duration>) -> bool {
        self.updater.wait_for_idle(timeout)
    }

    pub fn is_update_complete(&self) -> bool {
        self.updater.is_complete()
    }

    pub fn is_update_requested(&self) -> bool {
        self.updater.is_request_pending()
    }

    pub fn background_timings(&self) -> BackgroundTimings {
        self.updater.timings()
    }

    /// Direct access to the updater, e.g. for `lock_native`.
    pub fn updater(&self) -> &BackgroundUpdater {
        &self.updater
    }
}

impl Drop for SensorContext {
    fn drop(&mut self) {
        self.terminate();
    }
}
