//! Explosions and chain reactions
//!
//! A detonation removes its entity, pushes every other box and enemy inside
//! the blast radius, and queues secondary detonations for anything pushed
//! hard or close enough. Secondaries go through a [`DeferredQueue`] keyed by
//! entity id and are re-validated when they fire.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::geom::Body;
use super::session::GameState;
use super::state::{Crate, Enemy, EntityId, Particle, Target};
use crate::tuning::Tuning;

pub const ENEMY_BURST_COLOR: u32 = 0xff5a1f;
pub const CRATE_BURST_COLOR: u32 = 0xffc14d;
pub const COLLAPSE_BURST_COLOR: u32 = 0x9a8b7a;

/// Blast shape for one category of explosion
#[derive(Debug, Clone, Copy)]
pub struct BlastProfile {
    pub radius: f32,
    pub force: f32,
    /// Inside this distance the recipient is doomed to detonate too
    pub chain_radius: f32,
    pub up_bias: f32,
}

impl BlastProfile {
    pub fn enemy(tuning: &Tuning) -> Self {
        Self {
            radius: tuning.enemy_blast_radius,
            force: tuning.enemy_blast_force,
            chain_radius: tuning.enemy_chain_radius,
            up_bias: tuning.blast_up_bias,
        }
    }

    pub fn crate_box(tuning: &Tuning) -> Self {
        Self {
            radius: tuning.crate_blast_radius,
            force: tuning.crate_blast_force,
            chain_radius: tuning.crate_chain_radius,
            up_bias: tuning.blast_up_bias,
        }
    }

    /// Impulse delivered at `offset` from the blast origin, if within range
    ///
    /// Falls off linearly to zero at the radius; coincident centers use a
    /// distance of 1 for the direction.
    pub fn impulse_at(&self, offset: Vec2) -> Option<(Vec2, f32)> {
        let dist = offset.length();
        if dist >= self.radius {
            return None;
        }
        let safe = if dist == 0.0 { 1.0 } else { dist };
        let dir = if dist == 0.0 { Vec2::NEG_Y } else { offset / safe };
        let magnitude = self.force * (1.0 - dist / self.radius);
        Some((dir * magnitude + Vec2::new(0.0, -self.up_bias), dist))
    }
}

/// One blast hitting one body
#[derive(Debug, Clone, Copy)]
pub struct BlastHit {
    pub impulse: Vec2,
    pub distance: f32,
    pub chain_radius: f32,
}

/// How a body reacted to a blast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlastResponse {
    Pushed,
    /// Light a fuse (boxes only)
    Ignite,
    /// Detonate after a short delay
    Detonate,
}

/// Anything a blast can throw around
pub trait Blastable: Body {
    fn target(&self) -> Target;
    fn on_blast(&mut self, hit: &BlastHit, tuning: &Tuning) -> BlastResponse;

    fn center(&self) -> Vec2 {
        self.rect().center()
    }
}

impl Blastable for Enemy {
    fn target(&self) -> Target {
        Target::Enemy(self.id)
    }

    fn on_blast(&mut self, hit: &BlastHit, _tuning: &Tuning) -> BlastResponse {
        self.vel += hit.impulse;
        self.thrown = true;
        self.on_ground = false;
        if hit.distance < hit.chain_radius {
            BlastResponse::Detonate
        } else {
            BlastResponse::Pushed
        }
    }
}

impl Blastable for Crate {
    fn target(&self) -> Target {
        Target::Crate(self.id)
    }

    fn on_blast(&mut self, hit: &BlastHit, tuning: &Tuning) -> BlastResponse {
        self.vel += hit.impulse;
        self.thrown = true;
        self.on_ground = false;
        if hit.distance < hit.chain_radius || self.vel.length() > tuning.crate_chain_speed {
            BlastResponse::Detonate
        } else if !self.hot && hit.impulse.length() > tuning.ignite_impulse {
            BlastResponse::Ignite
        } else {
            BlastResponse::Pushed
        }
    }
}

/// Push every body in range; collect the ones that must detonate or ignite
pub fn apply_blast<T: Blastable>(
    bodies: &mut [T],
    origin: Vec2,
    profile: &BlastProfile,
    tuning: &Tuning,
) -> Vec<(Target, BlastResponse)> {
    let mut reactions = Vec::new();
    for body in bodies.iter_mut() {
        let Some((impulse, distance)) = profile.impulse_at(body.center() - origin) else {
            continue;
        };
        let hit = BlastHit {
            impulse,
            distance,
            chain_radius: profile.chain_radius,
        };
        let response = body.on_blast(&hit, tuning);
        if response != BlastResponse::Pushed {
            reactions.push((body.target(), response));
        }
    }
    reactions
}

/// What a deferred action does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Detonate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deferred {
    /// Session time (seconds) at which the action fires
    pub fire_at: f64,
    pub target: Target,
    pub action: Action,
}

/// Pending secondary detonations
#[derive(Debug, Clone, Default)]
pub struct DeferredQueue {
    pending: Vec<Deferred>,
}

impl DeferredQueue {
    pub fn schedule(&mut self, fire_at: f64, target: Target, action: Action) {
        self.pending.push(Deferred {
            fire_at,
            target,
            action,
        });
    }

    /// Remove and return every action due at `now`, oldest first
    pub fn take_due(&mut self, now: f64) -> Vec<Deferred> {
        let mut due: Vec<Deferred> = Vec::new();
        self.pending.retain(|d| {
            if d.fire_at <= now {
                due.push(*d);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.fire_at.total_cmp(&b.fire_at));
        due
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn contains(&self, target: Target) -> bool {
        self.pending.iter().any(|d| d.target == target)
    }
}

/// Spray `count` particles from `pos`
pub fn emit_burst(state: &mut GameState, pos: Vec2, color: u32, count: u32, speed: (f32, f32), life: (f32, f32)) {
    for _ in 0..count {
        let angle = state.rng.random_range(0.0..std::f32::consts::TAU);
        let spd = state.rng.random_range(speed.0..=speed.1);
        let particle = Particle {
            pos,
            vel: Vec2::new(angle.cos(), angle.sin()) * spd,
            life: state.rng.random_range(life.0..=life.1),
            radius: state.rng.random_range(2.0..=5.0),
            color,
        };
        state.world.push_particle(particle);
    }
    state.events.push(GameEvent::ParticleBurst { pos, color, count });
}

/// Detonate `target` if it still exists. Returns whether anything happened.
///
/// `loud` controls visible/audible effects; the blast itself always applies
/// when loud. Silent detonations only remove the entity.
pub fn detonate(state: &mut GameState, target: Target, loud: bool) -> bool {
    let (origin, profile, color, count, speed, shake, volume) = match target {
        Target::Enemy(id) => {
            let Some(enemy) = state.world.remove_enemy(id) else {
                log::trace!("Skipping detonation of missing enemy {}", id);
                return false;
            };
            (
                enemy.center(),
                BlastProfile::enemy(&state.tuning),
                ENEMY_BURST_COLOR,
                28,
                (180.0, 520.0),
                state.tuning.enemy_shake,
                1.0,
            )
        }
        Target::Crate(id) => {
            let Some(c) = state.world.remove_crate(id) else {
                log::trace!("Skipping detonation of missing box {}", id);
                return false;
            };
            (
                c.center(),
                BlastProfile::crate_box(&state.tuning),
                CRATE_BURST_COLOR,
                14,
                (120.0, 340.0),
                state.tuning.crate_shake,
                0.6,
            )
        }
    };

    if !loud {
        log::debug!("Silently removed {:?}", target);
        return true;
    }

    log::debug!("Detonated {:?} at ({:.0}, {:.0})", target, origin.x, origin.y);
    emit_burst(state, origin, color, count, speed, (0.4, 0.9));
    state.events.push(GameEvent::explosion(volume));
    let scale = state.tuning.effective_shake_scale();
    state.camera.shake(shake.0, shake.1 * scale);

    let mut reactions = apply_blast(&mut state.world.enemies, origin, &profile, &state.tuning);
    reactions.extend(apply_blast(&mut state.world.crates, origin, &profile, &state.tuning));

    for (recipient, response) in reactions {
        match response {
            BlastResponse::Detonate => {
                let delay = state
                    .rng
                    .random_range(state.tuning.chain_delay_min..=state.tuning.chain_delay_max);
                state
                    .deferred
                    .schedule(state.time + delay as f64, recipient, Action::Detonate);
            }
            BlastResponse::Ignite => {
                if let Target::Crate(id) = recipient {
                    let fuse = state.rng.random_range(state.tuning.fuse_min..=state.tuning.fuse_max);
                    if let Some(i) = state.world.crate_index(id) {
                        state.world.crates[i].ignite(fuse);
                    }
                }
            }
            BlastResponse::Pushed => {}
        }
    }
    true
}

/// Fire every deferred action that has come due
pub fn fire_due(state: &mut GameState) -> usize {
    let due = state.deferred.take_due(state.time);
    let mut fired = 0;
    for deferred in due {
        match deferred.action {
            Action::Detonate => {
                if detonate(state, deferred.target, true) {
                    fired += 1;
                }
            }
        }
    }
    fired
}

/// Count down burning fuses; detonate the ones that run out
pub fn burn_fuses(state: &mut GameState, dt: f32) {
    let mut expired: Vec<EntityId> = Vec::new();
    for c in state.world.crates.iter_mut().filter(|c| c.hot) {
        c.hot_timer -= dt;
        if c.hot_timer <= 0.0 {
            expired.push(c.id);
        }
    }
    for id in expired {
        detonate(state, Target::Crate(id), true);
    }
}
