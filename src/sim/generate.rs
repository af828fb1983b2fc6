//! Procedural world generation
//!
//! The course is a 1D strip generated left to right. A cursor walks forward
//! emitting either a gap or a ground segment; each category of obstacle keeps
//! the x of its last spawn so spacing is enforced at spawn time.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::geom::Rect;
use super::state::{EntityId, Target};
use super::world::World;
use crate::tuning::Tuning;

/// Generation cursor and spacing trackers
#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    /// Rightmost generated x; never decreases between resets
    pub frontier: f32,
    pub last_enemy_x: f32,
    pub last_wall_x: f32,
    pub last_hoop_x: f32,
    /// Segments emitted since the last reset
    pub segments: u32,
}

impl Generator {
    pub fn new(start_x: f32) -> Self {
        Self {
            frontier: start_x,
            last_enemy_x: f32::NEG_INFINITY,
            last_wall_x: f32::NEG_INFINITY,
            last_hoop_x: f32::NEG_INFINITY,
            segments: 0,
        }
    }

    /// Back to sentinel values
    pub fn reset(&mut self, start_x: f32) {
        *self = Self::new(start_x);
    }

    /// Generate until the frontier reaches `to_x`. Returns segments emitted.
    ///
    /// Calling with a target at or behind the frontier does nothing.
    pub fn extend(&mut self, to_x: f32, world: &mut World, rng: &mut Pcg32, tuning: &Tuning) -> u32 {
        let mut emitted = 0;
        while self.frontier < to_x {
            let cursor = self.frontier;
            let advance = if self.segments > 0
                && cursor > tuning.gap_start_x
                && rng.random_bool(tuning.gap_chance)
            {
                self.emit_gap(cursor, world, rng, tuning)
            } else {
                self.emit_ground(cursor, world, rng, tuning)
            };
            // Guard against a degenerate tuning stalling the loop
            self.frontier = cursor + advance.max(1.0);
            self.segments += 1;
            emitted += 1;
        }
        if emitted > 0 {
            log::debug!("Generated {} segments, frontier now {:.0}", emitted, self.frontier);
        }
        emitted
    }

    /// Skip a gap, maybe bridging it with a floating platform
    fn emit_gap(&mut self, cursor: f32, world: &mut World, rng: &mut Pcg32, tuning: &Tuning) -> f32 {
        let gap = rng.random_range(tuning.gap_min..=tuning.gap_max);

        if rng.random_bool(tuning.floating_platform_chance) {
            let w = rng.random_range(110.0..=170.0);
            let x = cursor + gap * 0.3;
            let y = tuning.ground_y - rng.random_range(120.0..=200.0);
            world.spawn_platform(Rect::new(x, y, w, 20.0));

            if rng.random_bool(0.4) {
                let size = tuning.crate_size;
                let cx = x + rng.random_range(0.2..=0.8) * w - size * 0.5;
                world.spawn_crate(Vec2::new(cx, y - size), Vec2::ZERO, size);
            }

            let hoop_x = x + w * 0.5;
            if rng.random_bool(0.25) && hoop_x - self.last_hoop_x >= tuning.min_hoop_spacing {
                let hoop_y = y - rng.random_range(130.0..=180.0);
                world.spawn_hoop(
                    Vec2::new(hoop_x, hoop_y),
                    tuning.hoop_radius,
                    tuning.hoop_launch_x,
                    tuning.hoop_launch_y,
                );
                self.last_hoop_x = hoop_x;
            }
        }

        gap
    }

    /// Emit a ground platform and decorate it
    fn emit_ground(&mut self, cursor: f32, world: &mut World, rng: &mut Pcg32, tuning: &Tuning) -> f32 {
        let w = if self.segments == 0 {
            tuning.spawn_pad_width
        } else {
            rng.random_range(tuning.segment_min..=tuning.segment_max)
        };
        world.spawn_platform(Rect::new(cursor, tuning.ground_y, w, tuning.ground_thickness));

        if cursor < tuning.safe_start_x {
            return w;
        }

        // Boxes: 0 or 1, mostly 0
        if rng.random_bool(tuning.crate_chance) {
            let size = tuning.crate_size;
            let x = cursor + rng.random_range(0.15..=0.85) * w - size * 0.5;
            world.spawn_crate(Vec2::new(x, tuning.ground_y - size), Vec2::ZERO, size);
        }

        // Walls: 1-2, each spacing-checked against the previous wall
        if rng.random_bool(tuning.wall_chance) {
            let count = if rng.random_bool(0.5) { 1 } else { 2 };
            for _ in 0..count {
                let wall_w = rng.random_range(36.0..=48.0);
                let wall_h = rng.random_range(80.0..=150.0);
                let x = cursor + rng.random_range(0.2..=0.8) * (w - wall_w);
                if x - self.last_wall_x >= tuning.min_wall_spacing {
                    world.spawn_wall(Rect::new(x, tuning.ground_y - wall_h, wall_w, wall_h));
                    self.last_wall_x = x;
                }
            }
        }

        // Hoop floating above the segment
        let hoop_x = cursor + w * 0.5;
        if rng.random_bool(tuning.hoop_chance) && hoop_x - self.last_hoop_x >= tuning.min_hoop_spacing {
            let hoop_y = tuning.ground_y - rng.random_range(170.0..=240.0);
            world.spawn_hoop(
                Vec2::new(hoop_x, hoop_y),
                tuning.hoop_radius,
                tuning.hoop_launch_x,
                tuning.hoop_launch_y,
            );
            self.last_hoop_x = hoop_x;
        }

        // One enemy, spacing-checked against the last enemy
        if rng.random_bool(tuning.enemy_chance) {
            let x = cursor + rng.random_range(0.3..=0.8) * (w - tuning.enemy_width);
            if x - self.last_enemy_x >= tuning.min_enemy_spacing {
                world.spawn_enemy(
                    Vec2::new(x, tuning.ground_y - tuning.enemy_height),
                    Vec2::new(tuning.enemy_width, tuning.enemy_height),
                );
                self.last_enemy_x = x;
            }
        }

        w
    }
}

/// Remove everything outside `[min_x, max_x]` that may leave passively
///
/// Statics, effects and boxes behind `min_x` are dropped here. Enemies can
/// only leave by detonating, and thrown boxes past `max_x` or `max_y` have
/// flown out of the world, so those are returned instead. The flag says
/// whether the detonation should be visible: only thrown bodies whose center
/// is still inside `view`.
pub fn prune(world: &mut World, min_x: f32, max_x: f32, max_y: f32, view: &Rect) -> Vec<(Target, bool)> {
    let in_range = |r: &Rect| r.right() >= min_x && r.x <= max_x;

    world.platforms.retain(|p| in_range(&p.rect));
    world.walls.retain(|w| in_range(&w.rect));
    world
        .hoops
        .retain(|h| h.center.x + h.radius >= min_x && h.center.x - h.radius <= max_x);
    world.particles.retain(|p| p.pos.x >= min_x);
    world.smoke.retain(|s| s.pos.x >= min_x);

    let behind = |r: &Rect| r.right() < min_x;
    let flown_off = |r: &Rect| r.x > max_x || r.y > max_y;
    let visible = |r: &Rect| view.contains(r.center());

    let mut doomed = Vec::new();
    world.crates.retain(|c| {
        let r = Rect::new(c.pos.x, c.pos.y, c.size.x, c.size.y);
        if behind(&r) {
            return false;
        }
        if !flown_off(&r) {
            return true;
        }
        if c.thrown {
            doomed.push((Target::Crate(c.id), visible(&r)));
            return true;
        }
        false
    });

    for e in &world.enemies {
        let r = Rect::new(e.pos.x, e.pos.y, e.size.x, e.size.y);
        if behind(&r) || flown_off(&r) {
            let loud = e.thrown && !behind(&r) && visible(&r);
            doomed.push((Target::Enemy(e.id), loud));
        }
    }

    doomed
}

/// Platforms left far enough behind the player to crumble
pub fn trailing_platforms(world: &World, player_x: f32, margin: f32, support: Option<EntityId>) -> Vec<EntityId> {
    world
        .platforms
        .iter()
        .filter(|p| !p.collapsed && Some(p.id) != support && p.rect.right() < player_x - margin)
        .map(|p| p.id)
        .collect()
}
