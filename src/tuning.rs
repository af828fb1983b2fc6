//! Game balance and tuning
//!
//! Every magic number the simulation reads lives here so a host can load a
//! JSON override without recompiling. Missing fields fall back to
//! [`crate::consts`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Errors raised while loading a tuning file
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Simulation tuning knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Timing ===
    /// Largest dt a tick integrates
    pub max_dt: f32,

    // === Player ===
    pub gravity: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub max_speed: f32,
    pub dash_mult: f32,
    pub ground_accel: f32,
    pub air_accel: f32,
    pub ground_friction: f32,
    pub air_friction: f32,
    pub jump_base: f32,
    /// Landing faster than this plays an impact sound
    pub hard_landing_speed: f32,
    /// Boost applied when the player smashes an enemy or box
    pub contact_boost_x: f32,
    pub contact_boost_y: f32,

    // === Platform collapse under load ===
    /// Dwell time before collapse at zero speed (seconds)
    pub collapse_base_dwell: f32,
    /// Dwell lost per unit of horizontal speed
    pub collapse_speed_factor: f32,
    pub collapse_min_dwell: f32,
    /// Maximum divisor applied for vertically stacked platforms
    pub collapse_max_stack: u32,
    pub collapse_debris_min: u32,
    pub collapse_debris_max: u32,

    // === World generation ===
    pub ground_y: f32,
    pub ground_thickness: f32,
    pub world_start_x: f32,
    pub spawn_pad_width: f32,
    pub spawn_x: f32,
    pub chunk_size: f32,
    pub gap_start_x: f32,
    pub safe_start_x: f32,
    pub gap_chance: f64,
    pub gap_min: f32,
    pub gap_max: f32,
    pub floating_platform_chance: f64,
    pub segment_min: f32,
    pub segment_max: f32,
    pub crate_chance: f64,
    pub wall_chance: f64,
    pub hoop_chance: f64,
    pub enemy_chance: f64,
    pub min_enemy_spacing: f32,
    pub min_wall_spacing: f32,
    pub min_hoop_spacing: f32,
    pub prune_margin: f32,
    pub collapse_behind_margin: f32,

    // === Hoops ===
    pub hoop_radius: f32,
    pub hoop_launch_x: f32,
    pub hoop_launch_y: f32,
    pub hoop_cooldown: f32,

    // === Boxes and enemies ===
    pub crate_size: f32,
    pub debris_size: f32,
    pub crate_gravity_scale: f32,
    pub crate_drag: f32,
    pub enemy_width: f32,
    pub enemy_height: f32,
    pub enemy_gravity_scale: f32,
    pub enemy_drag: f32,
    pub enemy_walk_speed: f32,
    pub enemy_aggro_range: f32,
    /// Thrown entities settle below this speed once grounded
    pub settle_speed: f32,

    // === Blasts ===
    pub enemy_blast_radius: f32,
    pub enemy_blast_force: f32,
    pub enemy_chain_radius: f32,
    pub crate_blast_radius: f32,
    pub crate_blast_force: f32,
    pub crate_chain_radius: f32,
    /// Fixed upward bias added to every blast impulse
    pub blast_up_bias: f32,
    /// Boxes pushed faster than this detonate
    pub crate_chain_speed: f32,
    /// Impulse magnitude that ignites a box fuse
    pub ignite_impulse: f32,
    pub fuse_min: f32,
    pub fuse_max: f32,
    /// Secondary detonation delay range (seconds)
    pub chain_delay_min: f32,
    pub chain_delay_max: f32,

    // === Camera ===
    pub camera_rate_x: f32,
    pub camera_rate_y: f32,
    /// Camera y band, relative to ground level
    pub camera_min_y: f32,
    pub camera_max_y: f32,
    pub screen_shake: bool,
    pub enemy_shake: (f32, f32),
    pub crate_shake: (f32, f32),
    pub collapse_shake: (f32, f32),

    // === Session ===
    pub reset_fall_depth: f32,
    pub reset_behind_margin: f32,
    pub reset_ahead_margin: f32,

    // === Effects ===
    pub max_particles: usize,
    pub max_smoke: usize,
    pub smoke_interval: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_dt: MAX_DT,

            gravity: GRAVITY,
            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            max_speed: MAX_SPEED,
            dash_mult: DASH_MULT,
            ground_accel: GROUND_ACCEL,
            air_accel: AIR_ACCEL,
            ground_friction: GROUND_FRICTION,
            air_friction: AIR_FRICTION,
            jump_base: JUMP_BASE,
            hard_landing_speed: 900.0,
            contact_boost_x: 320.0,
            contact_boost_y: 520.0,

            collapse_base_dwell: 2.2,
            collapse_speed_factor: 0.0025,
            collapse_min_dwell: 0.35,
            collapse_max_stack: 3,
            collapse_debris_min: 3,
            collapse_debris_max: 5,

            ground_y: GROUND_Y,
            ground_thickness: GROUND_THICKNESS,
            world_start_x: WORLD_START_X,
            spawn_pad_width: SPAWN_PAD_WIDTH,
            spawn_x: SPAWN_X,
            chunk_size: CHUNK_SIZE,
            gap_start_x: GAP_START_X,
            safe_start_x: SAFE_START_X,
            gap_chance: 0.2,
            gap_min: 120.0,
            gap_max: 380.0,
            floating_platform_chance: 0.25,
            segment_min: 180.0,
            segment_max: 460.0,
            crate_chance: 0.3,
            wall_chance: 0.12,
            hoop_chance: 0.06,
            enemy_chance: 0.18,
            min_enemy_spacing: MIN_ENEMY_SPACING,
            min_wall_spacing: MIN_WALL_SPACING,
            min_hoop_spacing: MIN_HOOP_SPACING,
            prune_margin: PRUNE_MARGIN,
            collapse_behind_margin: COLLAPSE_BEHIND_MARGIN,

            hoop_radius: 42.0,
            hoop_launch_x: 650.0,
            hoop_launch_y: 1000.0,
            hoop_cooldown: 0.8,

            crate_size: CRATE_SIZE,
            debris_size: DEBRIS_SIZE,
            crate_gravity_scale: 0.9,
            crate_drag: 0.99,
            enemy_width: ENEMY_WIDTH,
            enemy_height: ENEMY_HEIGHT,
            enemy_gravity_scale: 0.98,
            enemy_drag: 0.97,
            enemy_walk_speed: 60.0,
            enemy_aggro_range: 600.0,
            settle_speed: 40.0,

            enemy_blast_radius: 220.0,
            enemy_blast_force: 900.0,
            enemy_chain_radius: 70.0,
            crate_blast_radius: 180.0,
            crate_blast_force: 700.0,
            crate_chain_radius: 60.0,
            blast_up_bias: 260.0,
            crate_chain_speed: 800.0,
            ignite_impulse: 300.0,
            fuse_min: 0.35,
            fuse_max: 0.9,
            chain_delay_min: 0.04,
            chain_delay_max: 0.16,

            camera_rate_x: 6.0,
            camera_rate_y: 4.0,
            camera_min_y: -360.0,
            camera_max_y: 160.0,
            screen_shake: true,
            enemy_shake: (0.35, 14.0),
            crate_shake: (0.25, 8.0),
            collapse_shake: (0.2, 5.0),

            reset_fall_depth: RESET_FALL_DEPTH,
            reset_behind_margin: RESET_BEHIND_MARGIN,
            reset_ahead_margin: RESET_AHEAD_MARGIN,

            max_particles: MAX_PARTICLES,
            max_smoke: MAX_SMOKE,
            smoke_interval: 0.05,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load a tuning file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("max_dt", self.max_dt),
            ("player_width", self.player_width),
            ("player_height", self.player_height),
            ("max_speed", self.max_speed),
            ("dash_mult", self.dash_mult),
            ("chunk_size", self.chunk_size),
            ("segment_min", self.segment_min),
            ("crate_size", self.crate_size),
            ("enemy_width", self.enemy_width),
            ("enemy_height", self.enemy_height),
            ("enemy_blast_radius", self.enemy_blast_radius),
            ("crate_blast_radius", self.crate_blast_radius),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| !(*v > 0.0)) {
            return Err(TuningError::Invalid(format!("{name} must be positive")));
        }

        let ranges = [
            ("gap", self.gap_min, self.gap_max),
            ("segment", self.segment_min, self.segment_max),
            ("fuse", self.fuse_min, self.fuse_max),
            ("chain_delay", self.chain_delay_min, self.chain_delay_max),
        ];
        if let Some((name, _, _)) = ranges.iter().find(|(_, lo, hi)| lo > hi) {
            return Err(TuningError::Invalid(format!("{name} range is inverted")));
        }

        let chances = [
            ("gap_chance", self.gap_chance),
            ("floating_platform_chance", self.floating_platform_chance),
            ("crate_chance", self.crate_chance),
            ("wall_chance", self.wall_chance),
            ("hoop_chance", self.hoop_chance),
            ("enemy_chance", self.enemy_chance),
        ];
        if let Some((name, _)) = chances.iter().find(|(_, p)| !(0.0..=1.0).contains(p)) {
            return Err(TuningError::Invalid(format!("{name} must be within [0, 1]")));
        }

        if self.collapse_debris_min > self.collapse_debris_max {
            return Err(TuningError::Invalid("collapse debris range is inverted".into()));
        }
        if self.collapse_max_stack == 0 {
            return Err(TuningError::Invalid("collapse_max_stack must be at least 1".into()));
        }
        Ok(())
    }

    /// Horizontal speed cap for the current dash state
    #[inline]
    pub fn max_speed(&self, dash: bool) -> f32 {
        if dash {
            self.max_speed * self.dash_mult
        } else {
            self.max_speed
        }
    }

    /// Shake magnitude multiplier (0 when screen shake is disabled)
    pub fn effective_shake_scale(&self) -> f32 {
        if self.screen_shake { 1.0 } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "max_speed": 500.0, "screen_shake": false }"#)
            .expect("valid tuning");
        assert_eq!(tuning.max_speed, 500.0);
        assert!(!tuning.screen_shake);
        assert_eq!(tuning.jump_base, JUMP_BASE);
        assert_eq!(tuning.effective_shake_scale(), 0.0);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = Tuning::from_json("{ max_speed: ").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = Tuning::from_json(r#"{ "gap_min": 400.0, "gap_max": 100.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid(_)));
    }

    #[test]
    fn test_non_positive_size_rejected() {
        let err = Tuning::from_json(r#"{ "crate_size": 0.0 }"#).unwrap_err();
        assert!(err.to_string().contains("crate_size"));
    }

    #[test]
    fn test_chance_outside_unit_interval_rejected() {
        let err = Tuning::from_json(r#"{ "enemy_chance": 1.5 }"#).unwrap_err();
        assert!(err.to_string().contains("enemy_chance"));
    }

    #[test]
    fn test_max_speed_with_dash() {
        let tuning = Tuning::default();
        assert_eq!(tuning.max_speed(false), MAX_SPEED);
        assert!((tuning.max_speed(true) - MAX_SPEED * DASH_MULT).abs() < 1e-4);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Tuning::load("/definitely/not/here/tuning.json").unwrap_err();
        assert!(matches!(err, TuningError::Io(_)));
    }
}
