//! Physics integration
//!
//! One integrator for every dynamic body (gravity, drag, position), plus the
//! player's controller on top: input acceleration, edge-triggered jumps and
//! the ground/air friction split.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::geom::{Body, Contact, Rect, overlap_area, resolve};
use super::state::{EntityId, Platform, Player, Wall};
use super::world::World;
use crate::tuning::Tuning;

/// Per-body integration parameters
#[derive(Debug, Clone, Copy)]
pub struct Motion {
    pub gravity: f32,
    /// Per-tick multiplicative horizontal drag
    pub drag: f32,
}

/// Advance velocity and position by `dt`
pub fn integrate<B: Body + ?Sized>(body: &mut B, motion: Motion, dt: f32) {
    let vel = body.vel_mut();
    vel.y += motion.gravity * dt;
    vel.x *= motion.drag;
    let delta = body.vel() * dt;
    body.translate(delta);
}

/// Result of pushing a body out of the static geometry
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticContacts {
    pub grounded: bool,
    /// Platform under the body after resolution (walls don't count)
    pub support: Option<EntityId>,
    /// Downward speed at the moment of landing
    pub landing_speed: f32,
    pub hit_side: bool,
}

/// Resolve a body against every platform and wall
///
/// Platforms go deepest overlap first. Landing on the slab carrying most of
/// the body lifts it clear of a flush neighbour, so a seam between two
/// segments at the same height never turns into a side push.
pub fn resolve_statics<B: Body + ?Sized>(body: &mut B, platforms: &[Platform], walls: &[Wall]) -> StaticContacts {
    let mut contacts = StaticContacts::default();

    let rect = body.rect();
    let mut touching: Vec<(&Platform, f32)> = platforms
        .iter()
        .filter(|p| !p.collapsed)
        .map(|p| (p, overlap_area(&rect, &p.rect)))
        .filter(|(_, area)| *area > 0.0)
        .collect();
    touching.sort_by(|a, b| b.1.total_cmp(&a.1));

    for (platform, _) in touching {
        let falling = body.vel().y;
        match resolve(body, &platform.rect) {
            Some(Contact::Landed) => {
                contacts.grounded = true;
                contacts.support = Some(platform.id);
                contacts.landing_speed = contacts.landing_speed.max(falling);
            }
            Some(Contact::Side) => contacts.hit_side = true,
            _ => {}
        }
    }

    for wall in walls {
        let falling = body.vel().y;
        match resolve(body, &wall.rect) {
            Some(Contact::Landed) => {
                contacts.grounded = true;
                contacts.landing_speed = contacts.landing_speed.max(falling);
            }
            Some(Contact::Side) => contacts.hit_side = true,
            _ => {}
        }
    }

    contacts
}

/// Held controls for one tick, with the jump edge already detected
#[derive(Debug, Clone, Copy, Default)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    /// Jump went from released to held this tick
    pub jump_pressed: bool,
    pub dash: bool,
}

/// What the player did this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerReport {
    pub jumped: bool,
    pub air_jumped: bool,
}

/// Apply input, gravity and jumps, then move the player
///
/// Gravity lands before the jump impulse so a jump leaves vy at exactly
/// `-jump_base` for the tick.
pub fn step_player(player: &mut Player, controls: Controls, tuning: &Tuning, dt: f32) -> PlayerReport {
    let mut report = PlayerReport::default();
    let dir = match (controls.left, controls.right) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    };
    let dash_mult = if controls.dash { tuning.dash_mult } else { 1.0 };

    if dir != 0.0 {
        let accel = if player.on_ground {
            tuning.ground_accel
        } else {
            tuning.air_accel
        };
        player.vel.x += dir * accel * dash_mult * dt;
        player.facing = dir;
    } else if player.on_ground {
        player.vel.x *= tuning.ground_friction;
    } else {
        player.vel.x *= tuning.air_friction;
    }
    clamp_speed(player, tuning, controls.dash);

    player.vel.y += tuning.gravity * dt;

    if controls.jump_pressed {
        if player.on_ground {
            player.vel.y = -tuning.jump_base;
            player.on_ground = false;
            player.support = None;
            player.jumps_left = 1;
            report.jumped = true;
        } else if player.jumps_left > 0 {
            player.vel.y = -tuning.jump_base;
            player.jumps_left -= 1;
            report.air_jumped = true;
        }
    }

    player.pos += player.vel * dt;
    report
}

/// Clamp horizontal speed to the cap for the current dash state
#[inline]
pub fn clamp_speed(player: &mut Player, tuning: &Tuning, dash: bool) {
    let cap = tuning.max_speed(dash);
    player.vel.x = player.vel.x.clamp(-cap, cap);
}

/// Collide the player with statics and update grounding
pub fn land_player(player: &mut Player, world: &World) -> StaticContacts {
    let contacts = resolve_statics(player, &world.platforms, &world.walls);
    player.on_ground = contacts.grounded;
    player.support = contacts.support;
    if contacts.grounded {
        player.jumps_left = 1;
    }
    contacts
}

/// Dwell time a platform tolerates before collapsing
///
/// Shrinks with horizontal speed down to a floor, then divides by the number
/// of platforms stacked over the same x (capped).
pub fn collapse_threshold(speed: f32, stacked: usize, tuning: &Tuning) -> f32 {
    let dwell = (tuning.collapse_base_dwell - speed.abs() * tuning.collapse_speed_factor)
        .max(tuning.collapse_min_dwell);
    let stack = (stacked as u32).clamp(1, tuning.collapse_max_stack);
    dwell / stack as f32
}

/// Accumulate load on the player's support; returns it if it should collapse
///
/// Every platform other than the current support has its timer reset.
pub fn track_load(player: &Player, world: &mut World, tuning: &Tuning, dt: f32) -> Option<EntityId> {
    let support = player.support;
    let mut overloaded = None;
    let stacked = world.platforms_spanning(player.center().x);

    for platform in world.platforms.iter_mut() {
        if Some(platform.id) == support {
            platform.occupied_timer += dt;
            if platform.occupied_timer > collapse_threshold(player.vel.x, stacked, tuning) {
                overloaded = Some(platform.id);
            }
        } else {
            platform.occupied_timer = 0.0;
        }
    }
    overloaded
}

/// Result of crumbling a platform
#[derive(Debug, Clone)]
pub struct Collapse {
    pub rect: Rect,
    pub debris: Vec<EntityId>,
}

/// Turn a platform into debris boxes and remove it for good
pub fn collapse_platform(world: &mut World, id: EntityId, rng: &mut Pcg32, tuning: &Tuning) -> Option<Collapse> {
    let mut platform = world.remove_platform(id)?;
    platform.collapsed = true;
    let rect = platform.rect;

    let count = rng.random_range(tuning.collapse_debris_min..=tuning.collapse_debris_max);
    let size = tuning.debris_size.min(rect.h).max(1.0);
    let mut debris = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let x = rect.x + rng.random_range(0.0..=1.0f32) * (rect.w - size).max(0.0);
        // Spawn inside the slab, below whatever stood on it
        let y = rect.y + (rect.h - size) * 0.5;
        let outward = if x + size * 0.5 < rect.center().x { -1.0 } else { 1.0 };
        let vel = Vec2::new(
            outward * rng.random_range(60.0..=220.0),
            -rng.random_range(180.0..=380.0),
        );
        debris.push(world.spawn_crate(Vec2::new(x, y), vel, size));
    }

    log::debug!("Platform {} collapsed into {} debris", id, debris.len());
    Some(Collapse { rect, debris })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn grounded_player(tuning: &Tuning) -> Player {
        let mut p = Player::new(
            Vec2::new(100.0, tuning.ground_y - tuning.player_height),
            Vec2::new(tuning.player_width, tuning.player_height),
        );
        p.on_ground = true;
        p
    }

    #[test]
    fn test_jump_then_air_jump_then_nothing() {
        let tuning = Tuning::default();
        let mut p = grounded_player(&tuning);
        let press = Controls {
            jump_pressed: true,
            ..Default::default()
        };
        let dt = 1.0 / 60.0;

        let r = step_player(&mut p, press, &tuning, dt);
        assert!(r.jumped);
        assert_eq!(p.vel.y, -tuning.jump_base);
        assert_eq!(p.jumps_left, 1);

        step_player(&mut p, Controls::default(), &tuning, dt);
        let r = step_player(&mut p, press, &tuning, dt);
        assert!(r.air_jumped);
        assert_eq!(p.vel.y, -tuning.jump_base);
        assert_eq!(p.jumps_left, 0);

        step_player(&mut p, Controls::default(), &tuning, dt);
        let before = p.vel.y;
        let r = step_player(&mut p, press, &tuning, dt);
        assert_eq!(r, PlayerReport::default());
        assert!(p.vel.y > before);
    }

    #[test]
    fn test_speed_cap_respects_dash() {
        let tuning = Tuning::default();
        let mut p = grounded_player(&tuning);
        let run = Controls {
            right: true,
            ..Default::default()
        };
        for _ in 0..200 {
            step_player(&mut p, run, &tuning, 1.0 / 60.0);
        }
        assert_eq!(p.vel.x, tuning.max_speed(false));

        let dash = Controls { dash: true, ..run };
        for _ in 0..200 {
            step_player(&mut p, dash, &tuning, 1.0 / 60.0);
        }
        assert!((p.vel.x - tuning.max_speed(true)).abs() < 1e-3);
    }

    #[test]
    fn test_integrate_uses_gravity_scale_and_drag() {
        let tuning = Tuning::default();
        let mut world = World::default();
        let id = world.spawn_crate(Vec2::ZERO, Vec2::new(100.0, 0.0), 28.0);
        let c = &mut world.crates[0];
        assert_eq!(c.id, id);
        let motion = Motion {
            gravity: tuning.gravity * tuning.crate_gravity_scale,
            drag: 0.5,
        };
        integrate(c, motion, 0.1);
        assert!((c.vel.y - 180.0).abs() < 1e-3);
        assert!((c.vel.x - 50.0).abs() < 1e-3);
        assert!((c.pos - Vec2::new(5.0, 18.0)).length() < 1e-3);
    }

    #[test]
    fn test_collapse_threshold_shape() {
        let tuning = Tuning::default();
        let idle = collapse_threshold(0.0, 1, &tuning);
        assert_eq!(idle, tuning.collapse_base_dwell);
        assert!(collapse_threshold(400.0, 1, &tuning) < idle);
        assert_eq!(collapse_threshold(1.0e6, 1, &tuning), tuning.collapse_min_dwell);
        assert!((collapse_threshold(0.0, 2, &tuning) - idle / 2.0).abs() < 1e-6);
        assert_eq!(collapse_threshold(0.0, 9, &tuning), collapse_threshold(0.0, 3, &tuning));
    }

    #[test]
    fn test_load_resets_other_platforms() {
        let tuning = Tuning::default();
        let mut world = World::default();
        let a = world.spawn_platform(Rect::new(0.0, tuning.ground_y, 300.0, 80.0));
        let b = world.spawn_platform(Rect::new(300.0, tuning.ground_y, 300.0, 80.0));
        world.platforms[1].occupied_timer = 1.5;

        let mut p = grounded_player(&tuning);
        p.support = Some(a);
        assert_eq!(track_load(&p, &mut world, &tuning, 0.5), None);
        assert_eq!(world.platforms[0].occupied_timer, 0.5);
        assert_eq!(world.platforms[1].occupied_timer, 0.0);

        for _ in 0..4 {
            track_load(&p, &mut world, &tuning, 0.5);
        }
        assert_eq!(track_load(&p, &mut world, &tuning, 0.5), Some(a));
        assert!(world.platform_index(b).is_some());
    }

    #[test]
    fn test_collapse_spawns_debris_and_removes_platform() {
        let tuning = Tuning::default();
        let mut world = World::default();
        let mut rng = Pcg32::seed_from_u64(5);
        let id = world.spawn_platform(Rect::new(0.0, tuning.ground_y, 300.0, 80.0));

        let collapse = collapse_platform(&mut world, id, &mut rng, &tuning).expect("platform exists");
        assert!((3..=5).contains(&collapse.debris.len()));
        assert_eq!(world.crates.len(), collapse.debris.len());
        assert!(world.crates.iter().all(|c| c.thrown && c.vel.y < 0.0));
        assert!(world.platforms.is_empty());
        assert!(collapse_platform(&mut world, id, &mut rng, &tuning).is_none());
    }

    #[test]
    fn test_flush_seam_is_not_a_side_contact() {
        let tuning = Tuning::default();
        let mut world = World::default();
        world.spawn_platform(Rect::new(0.0, tuning.ground_y, 300.0, 80.0));
        let next = world.spawn_platform(Rect::new(300.0, tuning.ground_y, 300.0, 80.0));

        // Trailing edge 0.3 px over the first slab, sunk one tick of gravity
        let mut p = grounded_player(&tuning);
        p.pos = Vec2::new(299.7, tuning.ground_y - tuning.player_height + 0.55);
        p.vel = Vec2::new(tuning.max_speed(false), 33.0);

        let contacts = land_player(&mut p, &world);
        assert!(contacts.grounded);
        assert!(!contacts.hit_side);
        assert_eq!(contacts.support, Some(next));
        assert_eq!(p.vel.x, tuning.max_speed(false));
        assert_eq!(p.pos.x, 299.7);
    }

    #[test]
    fn test_land_player_grants_air_jump() {
        let tuning = Tuning::default();
        let mut world = World::default();
        let id = world.spawn_platform(Rect::new(0.0, tuning.ground_y, 300.0, 80.0));
        let mut p = grounded_player(&tuning);
        p.on_ground = false;
        p.jumps_left = 0;
        p.pos.y += 3.0;
        p.vel.y = 400.0;

        let contacts = land_player(&mut p, &world);
        assert!(contacts.grounded);
        assert_eq!(contacts.landing_speed, 400.0);
        assert_eq!(p.support, Some(id));
        assert_eq!(p.jumps_left, 1);
        assert_eq!(p.vel.y, 0.0);
    }
}
