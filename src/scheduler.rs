//! Fixed-timestep accumulator.
//!
//! The host loop feeds wall-clock deltas in with [`FixedStep::accumulate`]
//! and drains whole steps with [`FixedStep::take_step`], so the simulation
//! rate is independent of the frame rate.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FixedStep {
    step: Duration,
    accumulated: Duration,
    running: bool,
}

impl FixedStep {
    pub fn new(step: Duration) -> Self {
        Self {
            step,
            accumulated: Duration::ZERO,
            running: false,
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// Change the step length.  Time already accumulated is kept.
    pub fn set_step(&mut self, step: Duration) {
        self.step = step;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start fresh: nothing carried over from before the pause.
    pub fn start(&mut self) {
        self.running = true;
        self.accumulated = Duration::ZERO;
    }

    /// Steps already accumulated are dropped; a pending `take_step` after
    /// this returns `false`.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn accumulate(&mut self, delta: Duration) {
        if self.running {
            self.accumulated += delta;
        }
    }

    /// Consume one step if enough time has built up.
    pub fn take_step(&mut self) -> bool {
        if !self.running || self.step.is_zero() || self.accumulated < self.step {
            return false;
        }
        self.accumulated -= self.step;
        true
    }
}
