//! Frame timing and sampled frame rate for the game loop.

use std::time::Instant;

/// Frames per frame-rate sample window.
pub const FRAME_RATE_SAMPLES: u32 = 50;

/// Frame clock with a frame rate sampled over fixed windows.
#[derive(Debug)]
pub struct Time {
    /// Time of the last frame.
    last_frame: Instant,
    /// Start of the current sample window.
    sample_start: Instant,
    /// Frames counted in the current sample window.
    sample_frame: u32,
    /// Frame rate measured over the last complete window.
    frame_rate: f32,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a time manager whose clock starts at `now`.
    pub fn starting_at(now: Instant) -> Self {
        Self {
            last_frame: now,
            sample_start: now,
            sample_frame: 0,
            frame_rate: 0.0,
        }
    }

    /// Update timing at the start of a new frame.
    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    /// Update timing with an explicit timestamp.
    pub fn update_at(&mut self, now: Instant) {
        self.last_frame = now;
        self.sample_frame += 1;
        if self.sample_frame >= FRAME_RATE_SAMPLES {
            let window = now.saturating_duration_since(self.sample_start).as_secs_f32();
            if window > 0.0 {
                self.frame_rate = self.sample_frame as f32 / window;
            }
            self.sample_frame = 0;
            self.sample_start = now;
        }
    }

    /// Timestamp of the current frame.
    pub fn now(&self) -> Instant {
        self.last_frame
    }

    /// Frame index inside the current sample window (0..FRAME_RATE_SAMPLES).
    pub fn sample_frame(&self) -> u32 {
        self.sample_frame
    }

    /// Frame rate of the last complete sample window, 0 until one completes.
    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }
}
