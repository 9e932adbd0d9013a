//! Time management for the render tick.

use std::time::{Duration, Instant};

/// Manages frame timing for the render loop.
///
/// Particle motion is driven by [`Time::elapsed_seconds`], the wall-clock
/// time since start, so a slow tick never bunches up respawns.
#[derive(Debug)]
pub struct Time {
    /// Time when the engine started.
    start_time: Instant,
    /// Time of the last frame.
    last_frame: Instant,
    /// Total elapsed time since start.
    elapsed: Duration,
    /// Frame count since start.
    frame_count: u64,
    /// Target interval between ticks (default 60 Hz).
    tick_interval: Duration,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_frame: now,
            elapsed: Duration::ZERO,
            frame_count: 0,
            tick_interval: Duration::from_secs_f64(1.0 / 60.0),
        }
    }

    /// Update timing at the start of a new frame.
    pub fn update(&mut self) {
        let now = Instant::now();
        self.last_frame = now;
        self.elapsed = now - self.start_time;
        self.frame_count += 1;
    }

    /// Get total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Set the target tick rate in Hz. Non-positive rates are ignored.
    pub fn set_tick_rate(&mut self, hz: f64) {
        if hz > 0.0 && hz.is_finite() {
            self.tick_interval = Duration::from_secs_f64(1.0 / hz);
        } else {
            log::warn!("Ignoring invalid tick rate {hz}");
        }
    }

    /// Get the target tick interval.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// How long the loop should sleep before the next tick is due.
    pub fn time_until_next_tick(&self) -> Duration {
        self.tick_interval.saturating_sub(self.last_frame.elapsed())
    }
}
