//! Blast Runner - an endless side-scrolling physics playground
//!
//! Core modules:
//! - `sim`: Simulation (physics, collisions, world generation, chain explosions)
//! - `tuning`: Data-driven game balance
//!
//! Rendering, audio and input polling belong to the host. The host feeds a
//! [`sim::TickInput`] per frame, reads snapshots back and consumes
//! [`sim::GameEvent`]s through an [`sim::EventSink`].

pub mod sim;
pub mod tuning;

pub use tuning::{Tuning, TuningError};

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Largest timestep a single tick will integrate (seconds)
    pub const MAX_DT: f32 = 0.04;

    /// Default viewport
    pub const VIEW_WIDTH: f32 = 1280.0;
    pub const VIEW_HEIGHT: f32 = 720.0;

    /// Downward acceleration (pixels/s², y grows downward)
    pub const GRAVITY: f32 = 2000.0;

    /// Player body
    pub const PLAYER_WIDTH: f32 = 32.0;
    pub const PLAYER_HEIGHT: f32 = 44.0;
    /// Horizontal speed cap without dash
    pub const MAX_SPEED: f32 = 420.0;
    /// Speed cap multiplier while dash is held
    pub const DASH_MULT: f32 = 1.6;
    pub const GROUND_ACCEL: f32 = 2400.0;
    pub const AIR_ACCEL: f32 = 1500.0;
    /// Per-tick multiplicative drag with no horizontal input
    pub const GROUND_FRICTION: f32 = 0.82;
    pub const AIR_FRICTION: f32 = 0.985;
    /// Upward velocity applied by both the ground and the airborne jump
    pub const JUMP_BASE: f32 = 760.0;

    /// Top surface of ground segments
    pub const GROUND_Y: f32 = 560.0;
    pub const GROUND_THICKNESS: f32 = 80.0;
    /// Where generation begins after a reset
    pub const WORLD_START_X: f32 = -200.0;
    /// First ground segment is always this wide so the spawn point has floor
    pub const SPAWN_PAD_WIDTH: f32 = 600.0;
    pub const SPAWN_X: f32 = 120.0;
    pub const CHUNK_SIZE: f32 = 1200.0;

    /// No gaps before this x
    pub const GAP_START_X: f32 = 900.0;
    /// No obstacles before this x
    pub const SAFE_START_X: f32 = 700.0;
    pub const MIN_ENEMY_SPACING: f32 = 420.0;
    pub const MIN_WALL_SPACING: f32 = 360.0;
    pub const MIN_HOOP_SPACING: f32 = 700.0;

    /// How far behind the camera's left edge entities survive
    pub const PRUNE_MARGIN: f32 = 400.0;
    /// Platforms whose right edge is this far behind the player collapse
    pub const COLLAPSE_BEHIND_MARGIN: f32 = 700.0;

    /// Session ends when the player falls this far below the viewport height
    pub const RESET_FALL_DEPTH: f32 = 900.0;
    pub const RESET_BEHIND_MARGIN: f32 = 400.0;
    pub const RESET_AHEAD_MARGIN: f32 = 400.0;

    /// Boxes and enemies
    pub const CRATE_SIZE: f32 = 28.0;
    pub const DEBRIS_SIZE: f32 = 16.0;
    pub const ENEMY_WIDTH: f32 = 30.0;
    pub const ENEMY_HEIGHT: f32 = 34.0;

    /// Visual effect caps
    pub const MAX_PARTICLES: usize = 600;
    pub const MAX_SMOKE: usize = 200;
}

/// Exponential approach of `current` toward `target` at `rate` per second
#[inline]
pub fn approach(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    current + (target - current) * (1.0 - (-rate * dt).exp())
}

/// Sign of `v`, or `fallback` when `v` is zero
#[inline]
pub fn sign_or(v: f32, fallback: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        fallback
    }
}
