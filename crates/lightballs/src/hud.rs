//! HUD text: player position, score and sampled frame rate.

use engine_core::Time;
use glam::Vec3;

/// What the HUD shows this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudData {
    pub player_position: Vec3,
    pub score: u32,
    /// Last sampled frame rate.
    pub frame_rate: f32,
    /// Frame within the current sample window.
    pub sample_frame: u32,
}

impl HudData {
    pub fn new(player_position: Vec3, score: u32, time: &Time) -> Self {
        Self {
            player_position,
            score,
            frame_rate: time.frame_rate(),
            sample_frame: time.sample_frame(),
        }
    }

    pub fn player_line(&self) -> String {
        let p = self.player_position;
        format!("Player pos:<{:.6},{:.6},{:.6}> score: <{}>", p.x, p.y, p.z, self.score)
    }

    pub fn rate_line(&self) -> String {
        format!("FPS: {:.6} F: {:2}", self.frame_rate, self.sample_frame)
    }
}
