//! Session aggregate
//!
//! [`GameState`] owns everything the simulation mutates: the player, the
//! entity registry, the generator, the camera, the RNG and the deferred
//! action queue. Reset is a method here rather than scattered clean-up.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::camera::Camera;
use super::chain::DeferredQueue;
use super::events::{EventSink, GameEvent, dispatch};
use super::generate::Generator;
use super::state::{Crate, Enemy, Hoop, Particle, Platform, Player, Smoke, Viewport, Wall};
use super::world::World;
use crate::tuning::Tuning;

/// Complete simulation state for one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub view: Viewport,
    /// Simulated seconds since the session started
    pub time: f64,
    pub time_ticks: u64,
    pub player: Player,
    pub world: World,
    pub generator: Generator,
    pub camera: Camera,
    pub deferred: DeferredQueue,
    /// Events raised since the last flush
    pub events: Vec<GameEvent>,
    /// Jump held on the previous tick (for edge detection)
    pub prev_jump: bool,
    /// Number of times the session has been reset
    pub resets: u32,
}

impl GameState {
    /// Create a new session with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let player = Player::new(Vec2::ZERO, Vec2::new(tuning.player_width, tuning.player_height));
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            world: World::new(tuning.max_particles, tuning.max_smoke),
            generator: Generator::new(tuning.world_start_x),
            tuning,
            view: Viewport::default(),
            time: 0.0,
            time_ticks: 0,
            player,
            camera: Camera::default(),
            deferred: DeferredQueue::default(),
            events: Vec::new(),
            prev_jump: false,
            resets: 0,
        };
        state.rebuild();
        state
    }

    /// Resize the viewport; takes effect on the next tick
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.view = Viewport {
            width: width.max(1.0),
            height: height.max(1.0),
        };
    }

    /// Where the player stands after a reset
    pub fn spawn_point(&self) -> Vec2 {
        Vec2::new(
            self.tuning.spawn_x,
            self.tuning.ground_y - self.tuning.player_height,
        )
    }

    /// How far ahead of the camera the world must be generated
    pub fn generation_target(&self) -> f32 {
        self.camera.pos.x + self.view.width * 1.5 + self.tuning.chunk_size
    }

    /// Has the player left the playable world?
    pub fn is_terminal(&self) -> bool {
        let p = &self.player;
        p.pos.y > self.view.height + self.tuning.reset_fall_depth
            || p.pos.x < -self.tuning.reset_behind_margin
            || p.pos.x > self.generator.frontier + self.tuning.reset_ahead_margin
    }

    /// Throw the run away and start over on fresh ground
    pub fn reset_all(&mut self) {
        self.resets += 1;
        log::info!(
            "Session reset #{} (player at {:.0}, {:.0})",
            self.resets,
            self.player.pos.x,
            self.player.pos.y
        );
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.world.clear();
        self.deferred.clear();
        self.generator.reset(self.tuning.world_start_x);
        self.camera.reset();
        let initial = self.generation_target();
        self.generator.extend(initial, &mut self.world, &mut self.rng, &self.tuning);

        self.player = Player::new(
            self.spawn_point(),
            Vec2::new(self.tuning.player_width, self.tuning.player_height),
        );
        self.player.on_ground = true;
        self.player.support = self
            .world
            .platforms
            .iter()
            .find(|p| self.player.center().x >= p.rect.x && self.player.center().x <= p.rect.right())
            .map(|p| p.id);
        self.prev_jump = false;
    }

    /// Drain queued events into the host. Sink failures are logged, never raised.
    pub fn flush_events(&mut self, sink: &mut dyn EventSink) -> usize {
        dispatch(std::mem::take(&mut self.events), sink)
    }

    /// Numbers for a debug overlay
    pub fn hud(&self) -> Hud {
        Hud {
            speed: self.player.vel.x.abs(),
            x: self.player.pos.x,
            y: self.player.pos.y,
            camera_x: self.camera.pos.x,
            live_objects: self.world.live_object_count(),
            resets: self.resets,
        }
    }

    /// Owned copy of everything a renderer draws
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            player: self.player.clone(),
            camera: self.camera.pos,
            shake_offset: self.camera.shake_offset,
            platforms: self.world.platforms.clone(),
            walls: self.world.walls.clone(),
            hoops: self.world.hoops.clone(),
            crates: self.world.crates.clone(),
            enemies: self.world.enemies.clone(),
            particles: self.world.particles.iter().cloned().collect(),
            smoke: self.world.smoke.iter().cloned().collect(),
        }
    }
}

/// Debug/HUD readout
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hud {
    pub speed: f32,
    pub x: f32,
    pub y: f32,
    pub camera_x: f32,
    pub live_objects: usize,
    pub resets: u32,
}

/// Read-only render view of one frame
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub player: Player,
    pub camera: Vec2,
    pub shake_offset: Vec2,
    pub platforms: Vec<Platform>,
    pub walls: Vec<Wall>,
    pub hoops: Vec<Hoop>,
    pub crates: Vec<Crate>,
    pub enemies: Vec<Enemy>,
    pub particles: Vec<Particle>,
    pub smoke: Vec<Smoke>,
}
