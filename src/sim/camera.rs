//! Smoothed follow camera with ease-out shake

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::Viewport;
use crate::approach;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Camera {
    /// Top-left corner of the view in world space
    pub pos: Vec2,
    pub shake_time_left: f32,
    pub shake_duration: f32,
    pub shake_magnitude: f32,
    /// Offset to add when rendering this frame
    pub shake_offset: Vec2,
}

impl Camera {
    /// Start a shake unless a stronger one is already running
    pub fn shake(&mut self, duration: f32, magnitude: f32) {
        if duration <= 0.0 || magnitude <= 0.0 {
            return;
        }
        if magnitude >= self.current_magnitude() {
            self.shake_duration = duration;
            self.shake_time_left = duration;
            self.shake_magnitude = magnitude;
        }
    }

    /// Eased magnitude right now (quadratic ease-out)
    pub fn current_magnitude(&self) -> f32 {
        if self.shake_time_left <= 0.0 || self.shake_duration <= 0.0 {
            return 0.0;
        }
        let k = self.shake_time_left / self.shake_duration;
        self.shake_magnitude * k * k
    }

    /// Follow `target` (the player's center) and advance the shake
    pub fn update(&mut self, target: Vec2, view: Viewport, tuning: &Tuning, rng: &mut Pcg32, dt: f32) {
        let goal_x = (target.x - view.width * 0.5).max(0.0);
        self.pos.x = approach(self.pos.x, goal_x, tuning.camera_rate_x, dt).max(0.0);

        let goal_y = (target.y - view.height * 0.5).clamp(tuning.camera_min_y, tuning.camera_max_y);
        self.pos.y =
            approach(self.pos.y, goal_y, tuning.camera_rate_y, dt).clamp(tuning.camera_min_y, tuning.camera_max_y);

        if self.shake_time_left > 0.0 {
            self.shake_time_left = (self.shake_time_left - dt).max(0.0);
            let magnitude = self.current_magnitude();
            self.shake_offset = if magnitude > 0.0 {
                Vec2::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0)) * magnitude
            } else {
                Vec2::ZERO
            };
        } else {
            self.shake_offset = Vec2::ZERO;
        }
    }

    /// Back to origin, no shake
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
