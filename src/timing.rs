use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Cumulative start/stop timer with a running average.
///
/// Records repeated operation durations and reports their mean over the
/// timer's whole lifetime (no sliding window, no eviction). Single-threaded
/// by design; the updater publishes averages cross-thread through
/// [`TimingsCell`].
#[derive(Debug, Default)]
pub struct RollingTimer {
    total: Duration,
    samples: u64,
    started: Option<Instant>,
}

impl RollingTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin timing an operation. Calling while already started restarts
    /// the measurement; the partial interval is discarded.
    pub fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Finish timing and fold the elapsed interval into the average.
    ///
    /// A stop without a prior start is a no-op, so callers may bracket each
    /// cycle with a defensive stop-then-start.
    pub fn stop(&mut self) {
        if let Some(t0) = self.started.take() {
            self.total += t0.elapsed();
            self.samples += 1;
        }
    }

    /// Mean of all recorded intervals, zero before the first sample.
    pub fn average(&self) -> Duration {
        if self.samples == 0 {
            Duration::ZERO
        } else {
            self.total / self.samples as u32
        }
    }

    /// Number of completed start/stop pairs.
    pub fn samples(&self) -> u64 {
        self.samples
    }
}

/// Snapshot of the updater's three rolling averages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackgroundTimings {
    /// Mean duration of the native blocking update call.
    pub update_average: Duration,
    /// Mean time the worker spent waiting for the native-access lock.
    pub lock_wait_average: Duration,
    /// Mean duration of a predicate evaluation.
    pub predicate_loop_average: Duration,
}

/// Lock-free publication slot for the worker's averages.
///
/// The worker stores nanosecond values with relaxed ordering after each
/// loop iteration; readers may observe values from different iterations.
/// That is acceptable for a diagnostic metric.
#[derive(Debug, Default)]
pub(crate) struct TimingsCell {
    update_ns: AtomicU64,
    lock_wait_ns: AtomicU64,
    predicate_ns: AtomicU64,
}

impl TimingsCell {
    pub fn publish(&self, update: &RollingTimer, lock_wait: &RollingTimer, predicate: &RollingTimer) {
        self.update_ns
            .store(update.average().as_nanos() as u64, Ordering::Relaxed);
        self.lock_wait_ns
            .store(lock_wait.average().as_nanos() as u64, Ordering::Relaxed);
        self.predicate_ns
            .store(predicate.average().as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> BackgroundTimings {
        BackgroundTimings {
            update_average: Duration::from_nanos(self.update_ns.load(Ordering::Relaxed)),
            lock_wait_average: Duration::from_nanos(self.lock_wait_ns.load(Ordering::Relaxed)),
            predicate_loop_average: Duration::from_nanos(self.predicate_ns.load(Ordering::Relaxed)),
        }
    }
}
