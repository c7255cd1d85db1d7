//! Step scheduling
//!
//! The reel engine is a passive state machine. A [`StepTimer`] supplies the
//! delays between phases: real sleeps for live playback, or virtual time so
//! tests run a full spin synchronously.

use std::time::Duration;

use crate::reel::{ReelEngine, ReelEvent};

/// Waits out one scheduled delay
pub trait StepTimer {
    fn wait(&mut self, duration_ms: f64);
}

/// Sleeps the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadTimer;

impl StepTimer for ThreadTimer {
    fn wait(&mut self, duration_ms: f64) {
        if duration_ms > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(duration_ms / 1000.0));
        }
    }
}

/// Virtual clock: records requested waits without sleeping
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    elapsed_ms: f64,
    waits: usize,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total virtual time waited (ms)
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Number of waits requested
    pub fn waits(&self) -> usize {
        self.waits
    }
}

impl StepTimer for ManualTimer {
    fn wait(&mut self, duration_ms: f64) {
        self.elapsed_ms += duration_ms.max(0.0);
        self.waits += 1;
    }
}

/// Drive `engine` until it is idle, returning every event in order
pub fn run_to_completion(engine: &mut ReelEngine, timer: &mut dyn StepTimer) -> Vec<ReelEvent> {
    let mut events = Vec::new();
    while let Some(wait_ms) = engine.next_wakeup_ms() {
        timer.wait(wait_ms);
        events.extend(engine.advance(wait_ms));
    }
    events
}
