//! Level timer - accumulates play time while running.
//!
//! Observers are notified on start/reset/restore and then only when the whole
//! number of elapsed seconds changes, never once per frame.

use crate::signal::Signal;

#[derive(Debug, Default)]
pub struct GameTimer {
    elapsed_secs: f64,
    running: bool,
    last_whole_secs: u64,
    pub on_updated: Signal<f64>,
}

impl GameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    /// Floor of the elapsed time, as used by the completion bonus.
    pub fn whole_secs(&self) -> u32 {
        self.elapsed_secs.floor() as u32
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start from zero.
    pub fn start(&mut self) {
        self.running = true;
        self.set_elapsed(0.0);
    }

    /// Continue counting from the current value (after a restore).
    pub fn resume(&mut self) {
        self.running = true;
    }

    /// Stop counting; the elapsed value is kept.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.set_elapsed(0.0);
    }

    /// Load a persisted value without starting.
    pub fn restore(&mut self, elapsed_secs: f64) {
        self.set_elapsed(sanitize(elapsed_secs));
    }

    /// Advance by `delta_secs` if running. Returns whether observers were notified.
    pub fn tick(&mut self, delta_secs: f64) -> bool {
        if !self.running {
            return false;
        }
        let delta = sanitize(delta_secs);
        if delta == 0.0 {
            return false;
        }
        self.elapsed_secs += delta;

        let whole = self.elapsed_secs.floor() as u64;
        if whole != self.last_whole_secs {
            self.last_whole_secs = whole;
            self.on_updated.emit(self.elapsed_secs);
            return true;
        }
        false
    }

    fn set_elapsed(&mut self, elapsed_secs: f64) {
        self.elapsed_secs = elapsed_secs;
        self.last_whole_secs = elapsed_secs.floor() as u64;
        self.on_updated.emit(elapsed_secs);
    }
}

// Negative, NaN and infinite inputs collapse to zero.
fn sanitize(secs: f64) -> f64 {
    if secs.is_finite() && secs > 0.0 {
        secs
    } else {
        0.0
    }
}
