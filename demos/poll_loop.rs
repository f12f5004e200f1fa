//! Drive a simulated sensor runtime the way a frame loop would.
//!
//! Usage: cargo run --example poll_loop
//!
//! A fake backend stands in for the native runtime: each blocking update
//! "produces" a frame after a few milliseconds. The foreground loop runs at
//! ~60 Hz, polls for completion, reads the frame, and re-arms the worker.

use astra::{BackgroundUpdater, RollingTimer, SensorBackend};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Simulated native runtime. `frame_counter` plays the role of a
/// thread-safe accessor the predicate may read without the native lock.
struct SimulatedRuntime {
    frame_counter: Arc<AtomicU64>,
}

impl SensorBackend for SimulatedRuntime {
    fn initialize(&mut self) -> astra::Result<()> {
        println!("runtime initialized");
        Ok(())
    }

    fn update(&mut self) -> astra::Result<()> {
        // Pretend the pipeline needs a while and sometimes yields no frame.
        thread::sleep(Duration::from_millis(7));
        if self.frame_counter.load(Ordering::Relaxed) % 3 != 2 {
            self.frame_counter.fetch_add(1, Ordering::Relaxed);
        } else {
            self.frame_counter.fetch_add(2, Ordering::Relaxed);
        }
        Ok(())
    }

    fn terminate(&mut self) {
        println!("runtime terminated");
    }
}

fn main() {
    env_logger::init();

    let frame_counter = Arc::new(AtomicU64::new(0));
    let mut updater = BackgroundUpdater::new(Box::new(SimulatedRuntime {
        frame_counter: frame_counter.clone(),
    }));

    if let Err(e) = updater.start() {
        eprintln!("Failed to start updater: {}", e);
        std::process::exit(1);
    }

    let mut cycle_timer = RollingTimer::new();
    let mut frames_seen: u64 = 0;

    for cycle in 0..120 {
        cycle_timer.stop();
        cycle_timer.start();

        if updater.is_complete() {
            // Exclusive access is safe now; a real host would read streams here.
            updater.wait_for_idle(None);
            let produced = frame_counter.load(Ordering::Relaxed);
            if produced > frames_seen {
                frames_seen = produced;
            }

            let target = frames_seen + 1;
            let counter = frame_counter.clone();
            updater
                .request_update(move || counter.load(Ordering::Relaxed) >= target)
                .expect("idle updater accepts a request");
        }

        if cycle % 30 == 29 {
            let t = updater.timings();
            println!(
                "cycle {:>3}: frames={:<4} update_avg={:?} lock_wait_avg={:?} predicate_avg={:?} frame_cycle_avg={:?}",
                cycle + 1,
                frames_seen,
                t.update_average,
                t.lock_wait_average,
                t.predicate_loop_average,
                cycle_timer.average(),
            );
        }

        // ~60 Hz foreground cadence.
        thread::sleep(Duration::from_millis(16));
    }

    updater.stop();
    println!("done: {} frames over 120 cycles", frames_seen);
}
