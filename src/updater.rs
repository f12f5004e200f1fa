use crate::backend::SensorBackend;
use crate::timing::{BackgroundTimings, RollingTimer, TimingsCell};
use crate::{AstraError, Result};
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Caller-supplied "run until this becomes true" condition.
///
/// Evaluated by the worker thread after every native update, outside the
/// native-access lock, so it may freely call accessors the native SDK
/// documents as thread-safe and lock-free.
pub type UpdatePredicate = Box<dyn FnMut() -> bool + Send>;

/// Tuning knobs for the background updater.
#[derive(Debug, Clone, Copy)]
pub struct UpdaterConfig {
    /// How many times a failing native update is retried before the
    /// predicate-loop is abandoned. The default of 0 aborts on the first
    /// failure so a broken runtime can never block the foreground forever.
    pub update_retry_limit: u32,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            update_retry_limit: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Running,
    Stopped,
}

/// State shared between the foreground handle and the worker thread.
struct Shared {
    /// The native-access guard. Every call into the non-reentrant runtime,
    /// from either thread, happens while holding this mutex.
    backend: Mutex<Box<dyn SensorBackend>>,
    /// Cancellation token, checked at the top of each predicate-loop
    /// iteration. Stop is cooperative: an in-flight update runs to completion.
    stop_flag: AtomicBool,
    /// True from `request_update` until the worker drains the request.
    request_pending: AtomicBool,
    /// Lock-free mirror of `idle` for per-frame polling.
    complete: AtomicBool,
    /// Authoritative idle flag, guarded so `wait_for_idle` never misses a wakeup.
    idle: Mutex<bool>,
    idle_cv: Condvar,
    timings: TimingsCell,
    last_update_error: Mutex<Option<AstraError>>,
    config: UpdaterConfig,
}

/// Drives the native blocking update call on a dedicated worker thread.
///
/// The foreground loop polls [`is_complete`](Self::is_complete) once per
/// cycle, synchronizes with [`wait_for_idle`](Self::wait_for_idle) when it
/// needs exclusive native access, and re-arms the worker with
/// [`request_update`](Self::request_update). The worker then loops
/// update-then-check-predicate until the predicate returns true, recording
/// rolling latency averages throughout.
///
/// Single-use lifecycle: `Created → Running → Stopped`. A stopped updater
/// cannot be restarted; construct a new one.
pub struct BackgroundUpdater {
    shared: Arc<Shared>,
    worker: Option<std::thread::JoinHandle<()>>,
    request_tx: Option<Sender<UpdatePredicate>>,
    stop_tx: Option<Sender<()>>,
    lifecycle: Lifecycle,
}

impl BackgroundUpdater {
    /// Create an updater over the given backend with default configuration.
    pub fn new(backend: Box<dyn SensorBackend>) -> Self {
        Self::with_config(backend, UpdaterConfig::default())
    }

    pub fn with_config(backend: Box<dyn SensorBackend>, config: UpdaterConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                backend: Mutex::new(backend),
                stop_flag: AtomicBool::new(false),
                request_pending: AtomicBool::new(false),
                complete: AtomicBool::new(true),
                idle: Mutex::new(true),
                idle_cv: Condvar::new(),
                timings: TimingsCell::default(),
                last_update_error: Mutex::new(None),
                config,
            }),
            worker: None,
            request_tx: None,
            stop_tx: None,
            lifecycle: Lifecycle::Created,
        }
    }

    /// Initialize the native runtime and spawn the worker thread.
    ///
    /// Returns once the thread is confirmed running. Fails with
    /// [`AstraError::AlreadyStarted`] while running and
    /// [`AstraError::InvalidSequence`] after [`stop`](Self::stop).
    pub fn start(&mut self) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Running => return Err(AstraError::AlreadyStarted),
            Lifecycle::Stopped => {
                return Err(AstraError::InvalidSequence(
                    "updater cannot be restarted after stop",
                ))
            }
            Lifecycle::Created => {}
        }

        {
            let mut backend = lock_backend(&self.shared);
            backend.initialize()?;
        }

        let (request_tx, request_rx) = crossbeam_channel::bounded::<UpdatePredicate>(1);
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);

        let shared = Arc::clone(&self.shared);
        let spawned = std::thread::Builder::new()
            .name("astra-updater".into())
            .spawn(move || worker_loop(shared, request_rx, stop_rx));

        let handle = match spawned {
            Ok(h) => h,
            Err(e) => {
                // Undo the native init so the caller can retry with a fresh updater.
                lock_backend(&self.shared).terminate();
                return Err(AstraError::Worker(format!(
                    "failed to spawn worker thread: {}",
                    e
                )));
            }
        };

        self.worker = Some(handle);
        self.request_tx = Some(request_tx);
        self.stop_tx = Some(stop_tx);
        self.lifecycle = Lifecycle::Running;
        log::info!("background updater started");
        Ok(())
    }

    /// Stop the worker and tear down the native runtime.
    ///
    /// Cooperative: wakes the worker, lets any in-flight native update run to
    /// completion, joins the thread, then terminates the backend. No-op when
    /// not running; always safe to call, even mid-predicate-loop.
    pub fn stop(&mut self) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }

        log::info!("background updater stopping");
        self.shared.stop_flag.store(true, Ordering::Release);
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.try_send(());
        }
        // Closing the request channel also unparks an idle worker.
        drop(self.request_tx.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }

        lock_backend(&self.shared).terminate();
        self.lifecycle = Lifecycle::Stopped;
        log::info!("background updater stopped");
    }

    /// Hand a predicate to the worker and return without blocking.
    ///
    /// Strict admission policy: while a request is pending or a
    /// predicate-loop is active this fails with [`AstraError::NotIdle`]; a
    /// pending request is never silently replaced. The worker invokes the
    /// native update at least once before the first predicate check.
    pub fn request_update<F>(&self, predicate: F) -> Result<()>
    where
        F: FnMut() -> bool + Send + 'static,
    {
        match self.lifecycle {
            Lifecycle::Created => return Err(AstraError::NotStarted),
            Lifecycle::Stopped => {
                return Err(AstraError::InvalidSequence(
                    "updater has been stopped",
                ))
            }
            Lifecycle::Running => {}
        }
        let request_tx = match &self.request_tx {
            Some(tx) => tx,
            None => return Err(AstraError::NotStarted),
        };

        let mut idle = lock_idle(&self.shared);
        if !*idle || self.shared.request_pending.load(Ordering::Acquire) {
            return Err(AstraError::NotIdle);
        }
        *idle = false;
        self.shared.complete.store(false, Ordering::Release);
        self.shared.request_pending.store(true, Ordering::Release);

        if request_tx.send(Box::new(predicate)).is_err() {
            // Worker is gone; roll the flags back so the caller isn't stuck.
            *idle = true;
            self.shared.complete.store(true, Ordering::Release);
            self.shared.request_pending.store(false, Ordering::Release);
            return Err(AstraError::Worker("worker thread is not running".into()));
        }
        log::trace!("update requested");
        Ok(())
    }

    /// Block until the worker is idle, or the timeout elapses.
    ///
    /// `None` waits indefinitely; `Some(Duration::ZERO)` polls. Returns
    /// whether idle was reached; `false` if the updater was never started.
    ///
    /// While this returns true the worker is parked waiting for the next
    /// request, so the caller may touch native state through
    /// [`lock_native`](Self::lock_native) without racing the worker. Touching
    /// native state without first confirming idle is a contract violation on
    /// the caller's side; it is not detected here.
    pub fn wait_for_idle(&self, timeout: Option<Duration>) -> bool {
        if self.lifecycle == Lifecycle::Created {
            return false;
        }

        let mut idle = lock_idle(&self.shared);
        match timeout {
            None => {
                while !*idle {
                    idle = self
                        .shared
                        .idle_cv
                        .wait(idle)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                true
            }
            Some(timeout) => {
                let deadline = Instant::now() + timeout;
                while !*idle {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    let (guard, _) = self
                        .shared
                        .idle_cv
                        .wait_timeout(idle, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner);
                    idle = guard;
                }
                true
            }
        }
    }

    /// Exclusive access to the native backend for foreground calls.
    ///
    /// Only meaningful after [`wait_for_idle`](Self::wait_for_idle) returned
    /// true; otherwise the guard may block for a full native update.
    pub fn lock_native(&self) -> MutexGuard<'_, Box<dyn SensorBackend>> {
        lock_backend(&self.shared)
    }

    /// True from `request_update` until the worker drains the request.
    pub fn is_request_pending(&self) -> bool {
        self.shared.request_pending.load(Ordering::Relaxed)
    }

    /// True whenever no predicate-loop is active. Lock-free.
    pub fn is_complete(&self) -> bool {
        self.shared.complete.load(Ordering::Relaxed)
    }

    /// Lock-free snapshot of the three rolling latency averages.
    pub fn timings(&self) -> BackgroundTimings {
        self.shared.timings.snapshot()
    }

    /// Retrieve (and clear) the most recent native update failure.
    ///
    /// Worker-side failures are stashed here instead of being thrown across
    /// the thread boundary; the predicate-loop that hit one is treated as
    /// complete.
    pub fn take_last_update_error(&self) -> Option<AstraError> {
        self.shared
            .last_update_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Drop for BackgroundUpdater {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock_backend(shared: &Shared) -> MutexGuard<'_, Box<dyn SensorBackend>> {
    shared
        .backend
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn lock_idle(shared: &Shared) -> MutexGuard<'_, bool> {
    shared.idle.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The worker loop runs on the dedicated `astra-updater` thread.
///
/// Parks on the request channel while idle, then runs the predicate-loop:
/// native update inside the backend mutex, predicate check outside it. The
/// split keeps the mutex uncontended during predicate evaluation so the
/// foreground is blocked for as little as possible when it needs the lock.
fn worker_loop(shared: Arc<Shared>, request_rx: Receiver<UpdatePredicate>, stop_rx: Receiver<()>) {
    log::debug!("updater worker running");

    let mut update_timer = RollingTimer::new();
    let mut lock_wait_timer = RollingTimer::new();
    let mut predicate_timer = RollingTimer::new();

    loop {
        let mut predicate = crossbeam_channel::select! {
            recv(request_rx) -> req => match req {
                Ok(predicate) => predicate,
                Err(_) => break,
            },
            recv(stop_rx) -> _ => break,
        };

        if shared.stop_flag.load(Ordering::Acquire) {
            break;
        }
        shared.request_pending.store(false, Ordering::Release);

        run_predicate_loop(
            &shared,
            &mut *predicate,
            &mut update_timer,
            &mut lock_wait_timer,
            &mut predicate_timer,
        );

        let mut idle = lock_idle(&shared);
        *idle = true;
        shared.complete.store(true, Ordering::Release);
        shared.idle_cv.notify_all();
    }

    // Terminal: release anyone parked in wait_for_idle.
    shared.request_pending.store(false, Ordering::Release);
    let mut idle = lock_idle(&shared);
    *idle = true;
    shared.complete.store(true, Ordering::Release);
    shared.idle_cv.notify_all();
    drop(idle);

    log::debug!("updater worker exiting");
}

fn run_predicate_loop(
    shared: &Shared,
    predicate: &mut (dyn FnMut() -> bool + Send),
    update_timer: &mut RollingTimer,
    lock_wait_timer: &mut RollingTimer,
    predicate_timer: &mut RollingTimer,
) {
    let mut retries_left = shared.config.update_retry_limit;

    loop {
        if shared.stop_flag.load(Ordering::Acquire) {
            log::debug!("stop observed, abandoning predicate-loop");
            return;
        }

        lock_wait_timer.start();
        let mut backend = lock_backend(shared);
        lock_wait_timer.stop();

        update_timer.start();
        let result = backend.update();
        update_timer.stop();
        drop(backend);

        let failed = match result {
            Ok(()) => false,
            Err(e) => {
                log::warn!("native update failed: {}", e);
                *shared
                    .last_update_error
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(e);
                true
            }
        };

        let mut done = false;
        if !failed {
            predicate_timer.start();
            done = predicate();
            predicate_timer.stop();
        }

        shared
            .timings
            .publish(update_timer, lock_wait_timer, predicate_timer);

        if failed {
            if retries_left == 0 {
                return;
            }
            retries_left -= 1;
            continue;
        }

        if done || shared.stop_flag.load(Ordering::Acquire) {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, AtomicUsize};
    use std::thread;

    const TEST_WAIT: Duration = Duration::from_secs(2);

    /// Backend that counts calls and optionally sleeps or fails per update.
    struct FakeBackend {
        updates: Arc<AtomicU32>,
        terminated: Arc<AtomicU32>,
        update_delay: Duration,
        fail_updates: bool,
    }

    impl FakeBackend {
        fn new() -> (Self, Arc<AtomicU32>, Arc<AtomicU32>) {
            let updates = Arc::new(AtomicU32::new(0));
            let terminated = Arc::new(AtomicU32::new(0));
            (
                Self {
                    updates: updates.clone(),
                    terminated: terminated.clone(),
                    update_delay: Duration::ZERO,
                    fail_updates: false,
                },
                updates,
                terminated,
            )
        }

        fn with_delay(delay: Duration) -> (Self, Arc<AtomicU32>) {
            let (mut backend, updates, _) = Self::new();
            backend.update_delay = delay;
            (backend, updates)
        }

        fn failing() -> (Self, Arc<AtomicU32>) {
            let (mut backend, updates, _) = Self::new();
            backend.fail_updates = true;
            (backend, updates)
        }
    }

    impl SensorBackend for FakeBackend {
        fn initialize(&mut self) -> Result<()> {
            Ok(())
        }

        fn update(&mut self) -> Result<()> {
            if !self.update_delay.is_zero() {
                thread::sleep(self.update_delay);
            }
            self.updates.fetch_add(1, Ordering::SeqCst);
            if self.fail_updates {
                Err(AstraError::NativeUpdate("simulated failure".into()))
            } else {
                Ok(())
            }
        }

        fn terminate(&mut self) {
            self.terminated.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Backend that records enter/exit instants of every update call.
    struct IntervalBackend {
        intervals: Arc<Mutex<Vec<(Instant, Instant)>>>,
    }

    impl SensorBackend for IntervalBackend {
        fn initialize(&mut self) -> Result<()> {
            Ok(())
        }

        fn update(&mut self) -> Result<()> {
            let enter = Instant::now();
            thread::sleep(Duration::from_millis(2));
            let exit = Instant::now();
            self.intervals
                .lock()
                .unwrap()
                .push((enter, exit));
            Ok(())
        }

        fn terminate(&mut self) {}
    }

    #[test]
    fn start_stop_leaves_worker_joined_and_backend_terminated() {
        let (backend, _, terminated) = FakeBackend::new();
        let mut updater = BackgroundUpdater::new(Box::new(backend));
        updater.start().unwrap();
        updater.stop();
        assert!(updater.worker.is_none());
        assert_eq!(terminated.load(Ordering::SeqCst), 1);

        // stop is idempotent, terminate runs once
        updater.stop();
        assert_eq!(terminated.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn double_start_and_restart_are_rejected() {
        let (backend, _, _) = FakeBackend::new();
        let mut updater = BackgroundUpdater::new(Box::new(backend));
        updater.start().unwrap();
        assert!(matches!(updater.start(), Err(AstraError::AlreadyStarted)));
        updater.stop();
        assert!(matches!(
            updater.start(),
            Err(AstraError::InvalidSequence(_))
        ));
    }

    #[test]
    fn request_before_start_and_after_stop_are_rejected() {
        let (backend, _, _) = FakeBackend::new();
        let mut updater = BackgroundUpdater::new(Box::new(backend));
        assert!(matches!(
            updater.request_update(|| true),
            Err(AstraError::NotStarted)
        ));
        updater.start().unwrap();
        updater.stop();
        assert!(matches!(
            updater.request_update(|| true),
            Err(AstraError::InvalidSequence(_))
        ));
    }

    #[test]
    fn wait_for_idle_before_start_returns_false() {
        let (backend, _, _) = FakeBackend::new();
        let updater = BackgroundUpdater::new(Box::new(backend));
        assert!(!updater.wait_for_idle(Some(Duration::ZERO)));
    }

    #[test]
    fn predicate_true_after_k_iterations_runs_k_updates() {
        let (backend, updates, _) = FakeBackend::new();
        let mut updater = BackgroundUpdater::new(Box::new(backend));
        updater.start().unwrap();

        let seen = Arc::new(AtomicU32::new(0));
        let seen_clone = seen.clone();
        updater
            .request_update(move || seen_clone.fetch_add(1, Ordering::SeqCst) + 1 >= 3)
            .unwrap();

        assert!(updater.wait_for_idle(None));
        assert_eq!(updates.load(Ordering::SeqCst), 3);
        assert_eq!(seen.load(Ordering::SeqCst), 3);
        updater.stop();
    }

    #[test]
    fn always_true_predicate_runs_exactly_one_update() {
        let (backend, updates, _) = FakeBackend::new();
        let mut updater = BackgroundUpdater::new(Box::new(backend));
        updater.start().unwrap();

        updater.request_update(|| true).unwrap();
        assert!(updater.wait_for_idle(Some(TEST_WAIT)));
        // Never zero: the update always runs before the first predicate check.
        assert_eq!(updates.load(Ordering::SeqCst), 1);
        updater.stop();
    }

    #[test]
    fn is_complete_is_false_for_the_whole_request_interval() {
        let (backend, _) = FakeBackend::with_delay(Duration::from_millis(20));
        let mut updater = BackgroundUpdater::new(Box::new(backend));
        updater.start().unwrap();
        assert!(updater.is_complete());

        let iterations = Arc::new(AtomicU32::new(0));
        let iterations_clone = iterations.clone();
        updater
            .request_update(move || iterations_clone.fetch_add(1, Ordering::SeqCst) + 1 >= 10)
            .unwrap();

        // Polling wait during a multi-iteration loop fails fast.
        assert!(!updater.is_complete());
        assert!(!updater.wait_for_idle(Some(Duration::ZERO)));

        assert!(updater.wait_for_idle(None));
        assert!(updater.is_complete());
        // After completion a zero-timeout wait succeeds immediately.
        assert!(updater.wait_for_idle(Some(Duration::ZERO)));
        updater.stop();
    }

    #[test]
    fn request_pending_is_drained_by_the_worker() {
        let (backend, _, _) = FakeBackend::new();
        let mut updater = BackgroundUpdater::new(Box::new(backend));
        updater.start().unwrap();
        assert!(!updater.is_request_pending());
        updater.request_update(|| true).unwrap();
        assert!(updater.wait_for_idle(Some(TEST_WAIT)));
        assert!(!updater.is_request_pending());
        updater.stop();
    }

    #[test]
    fn native_updates_never_overlap() {
        let intervals = Arc::new(Mutex::new(Vec::new()));
        let backend = IntervalBackend {
            intervals: intervals.clone(),
        };
        let mut updater = BackgroundUpdater::new(Box::new(backend));
        updater.start().unwrap();

        for _ in 0..3 {
            let count = Arc::new(AtomicU32::new(0));
            updater
                .request_update(move || count.fetch_add(1, Ordering::SeqCst) + 1 >= 3)
                .unwrap();
            assert!(updater.wait_for_idle(Some(TEST_WAIT)));
            // Interleave a foreground native call between loops.
            drop(updater.lock_native());
        }
        updater.stop();

        let intervals = intervals.lock().unwrap();
        assert_eq!(intervals.len(), 9);
        for pair in intervals.windows(2) {
            assert!(pair[0].1 <= pair[1].0, "native updates overlapped");
        }
    }

    #[test]
    fn strict_policy_rejects_request_while_busy_and_accepts_when_idle() {
        let (backend, _) = FakeBackend::with_delay(Duration::from_millis(20));
        let mut updater = BackgroundUpdater::new(Box::new(backend));
        updater.start().unwrap();

        let iterations = Arc::new(AtomicU32::new(0));
        let iterations_clone = iterations.clone();
        updater
            .request_update(move || iterations_clone.fetch_add(1, Ordering::SeqCst) + 1 >= 10)
            .unwrap();

        // Reject path: the loop is active.
        assert!(matches!(
            updater.request_update(|| true),
            Err(AstraError::NotIdle)
        ));

        assert!(updater.wait_for_idle(Some(TEST_WAIT)));

        // Accept path: idle again.
        updater.request_update(|| true).unwrap();
        assert!(updater.wait_for_idle(Some(TEST_WAIT)));
        updater.stop();
    }

    #[test]
    fn stop_interrupts_a_never_true_predicate_loop() {
        let (backend, updates) = FakeBackend::with_delay(Duration::from_millis(2));
        let mut updater = BackgroundUpdater::new(Box::new(backend));
        updater.start().unwrap();

        updater.request_update(|| false).unwrap();
        // Let a few iterations run.
        thread::sleep(Duration::from_millis(20));
        updater.stop();

        let after_stop = updates.load(Ordering::SeqCst);
        assert!(after_stop > 0);
        thread::sleep(Duration::from_millis(20));
        // No update call starts after the stop flag was observed.
        assert_eq!(updates.load(Ordering::SeqCst), after_stop);
        assert!(updater.wait_for_idle(Some(Duration::ZERO)));
    }

    #[test]
    fn update_failure_completes_the_loop_and_is_retrievable() {
        let (backend, updates) = FakeBackend::failing();
        let mut updater = BackgroundUpdater::new(Box::new(backend));
        updater.start().unwrap();

        let predicate_calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = predicate_calls.clone();
        updater
            .request_update(move || {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                false
            })
            .unwrap();

        // The foreground is never blocked forever by a failing runtime.
        assert!(updater.wait_for_idle(Some(TEST_WAIT)));
        assert_eq!(updates.load(Ordering::SeqCst), 1);
        assert_eq!(predicate_calls.load(Ordering::SeqCst), 0);
        assert!(matches!(
            updater.take_last_update_error(),
            Some(AstraError::NativeUpdate(_))
        ));
        assert!(updater.take_last_update_error().is_none());
        updater.stop();
    }

    #[test]
    fn update_retry_limit_caps_retries() {
        let (backend, updates) = FakeBackend::failing();
        let mut updater = BackgroundUpdater::with_config(
            Box::new(backend),
            UpdaterConfig {
                update_retry_limit: 2,
            },
        );
        updater.start().unwrap();

        updater.request_update(|| false).unwrap();
        assert!(updater.wait_for_idle(Some(TEST_WAIT)));
        // Initial attempt plus two retries.
        assert_eq!(updates.load(Ordering::SeqCst), 3);
        updater.stop();
    }

    #[test]
    fn timings_reflect_update_duration() {
        let (backend, _) = FakeBackend::with_delay(Duration::from_millis(5));
        let mut updater = BackgroundUpdater::new(Box::new(backend));
        updater.start().unwrap();

        updater.request_update(|| true).unwrap();
        assert!(updater.wait_for_idle(Some(TEST_WAIT)));

        let timings = updater.timings();
        assert!(timings.update_average >= Duration::from_millis(5));
        assert!(timings.update_average < Duration::from_secs(1));
        updater.stop();
    }

    #[test]
    fn drop_stops_the_worker() {
        let (backend, _, terminated) = FakeBackend::new();
        let mut updater = BackgroundUpdater::new(Box::new(backend));
        updater.start().unwrap();
        updater.request_update(|| true).unwrap();
        drop(updater);
        assert_eq!(terminated.load(Ordering::SeqCst), 1);
    }
}
