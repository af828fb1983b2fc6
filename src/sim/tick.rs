//! Per-frame simulation tick
//!
//! Order within one tick:
//! 1. terminal check (reset and stop)
//! 2. due secondary detonations
//! 3. player: input, integrate, collide, platform load
//! 4. generation ahead of the camera, pruning and trailing collapse behind it
//! 5. boxes and enemies: integrate, collide, fuses, smoke
//! 6. contacts (player vs enemy/box, enemy vs enemy)
//! 7. effects, camera, bounds

use glam::Vec2;
use rand::Rng;

use super::chain::{COLLAPSE_BURST_COLOR, burn_fuses, detonate, emit_burst, fire_due};
use super::events::GameEvent;
use super::generate::{prune, trailing_platforms};
use super::geom::{Body, Rect, overlaps};
use super::physics::{
    Controls, Motion, clamp_speed, collapse_platform, integrate, land_player, resolve_statics, step_player,
    track_load,
};
use super::session::GameState;
use super::state::{EntityId, Smoke, Target};
use crate::sign_or;
use crate::tuning::Tuning;

/// Held controls sampled by the host once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Jump key held (the edge is detected here)
    pub jump: bool,
    pub dash: bool,
}

/// Turns host timestamps into capped timesteps
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_dt: f32,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self { last_ms: None, max_dt }
    }

    /// Seconds since the previous timestamp, capped. The first call yields 0.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        dt.clamp(0.0, self.max_dt)
    }
}

/// Advance the session by `dt` seconds (capped at `tuning.max_dt`)
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let dt = dt.min(state.tuning.max_dt);
    if !(dt > 0.0) {
        return;
    }

    if state.is_terminal() {
        state.reset_all();
        // A key held through the reset must not count as a fresh press
        state.prev_jump = input.jump;
        return;
    }

    state.time += dt as f64;
    state.time_ticks += 1;

    fire_due(state);

    let controls = Controls {
        left: input.left,
        right: input.right,
        jump_pressed: input.jump && !state.prev_jump,
        dash: input.dash,
    };
    state.prev_jump = input.jump;
    update_player(state, controls, dt);

    let view = state.view;
    let target = state.generation_target();
    state.generator.extend(target, &mut state.world, &mut state.rng, &state.tuning);
    enforce_bounds(state);
    for id in trailing_platforms(
        &state.world,
        state.player.pos.x + state.player.size.x,
        state.tuning.collapse_behind_margin,
        state.player.support,
    ) {
        crumble(state, id);
    }

    update_crates(state, dt);
    update_enemies(state, dt);
    burn_fuses(state, dt);

    resolve_contacts(state, input.dash);

    state.world.advance_effects(dt, state.tuning.gravity);
    let center = state.player.center();
    state
        .camera
        .update(center, view, &state.tuning, &mut state.rng, dt);

    enforce_bounds(state);
    clamp_speed(&mut state.player, &state.tuning, input.dash);
}

fn update_player(state: &mut GameState, controls: Controls, dt: f32) {
    let report = step_player(&mut state.player, controls, &state.tuning, dt);
    if report.air_jumped {
        let pos = state.player.center() + Vec2::new(0.0, state.player.size.y * 0.5);
        emit_burst(state, pos, 0xdde6ff, 6, (60.0, 140.0), (0.2, 0.35));
    }

    let contacts = land_player(&mut state.player, &state.world);
    if contacts.landing_speed > state.tuning.hard_landing_speed {
        let volume = contacts.landing_speed / (state.tuning.hard_landing_speed * 2.0);
        state.events.push(GameEvent::impact(volume));
    }

    if let Some(id) = track_load(&state.player, &mut state.world, &state.tuning, dt) {
        crumble(state, id);
        state.player.on_ground = false;
        state.player.support = None;
    }

    for i in 0..state.world.hoops.len() {
        let hoop = &mut state.world.hoops[i];
        hoop.cooldown = (hoop.cooldown - dt).max(0.0);
        if !hoop.is_ready() || !state.player.rect().intersects_circle(hoop.center, hoop.radius) {
            continue;
        }
        hoop.cooldown = state.tuning.hoop_cooldown;
        let (center, launch_x, launch_y) = (hoop.center, hoop.launch_x, hoop.launch_y);

        state.player.vel = Vec2::new(launch_x * state.player.facing, -launch_y);
        state.player.on_ground = false;
        state.player.support = None;
        state.player.jumps_left = 1;
        clamp_speed(&mut state.player, &state.tuning, controls.dash);
        state.events.push(GameEvent::impact(0.8));
        emit_burst(state, center, 0x39d0ff, 16, (120.0, 260.0), (0.3, 0.6));
    }
}

/// Collapse a platform with full effects
fn crumble(state: &mut GameState, id: EntityId) {
    let Some(collapse) = collapse_platform(&mut state.world, id, &mut state.rng, &state.tuning) else {
        return;
    };
    if state.player.support == Some(id) {
        state.player.support = None;
        state.player.on_ground = false;
    }
    let center = collapse.rect.center();
    emit_burst(state, center, COLLAPSE_BURST_COLOR, 18, (80.0, 260.0), (0.4, 0.8));
    state.events.push(GameEvent::impact(0.5));
    let (duration, magnitude) = state.tuning.collapse_shake;
    let scale = state.tuning.effective_shake_scale();
    state.camera.shake(duration, magnitude * scale);
}

/// Thrown bodies that come to rest stop trailing smoke
fn settles(thrown: bool, on_ground: bool, vel: Vec2, tuning: &Tuning) -> bool {
    thrown && on_ground && vel.length() < tuning.settle_speed
}

fn update_crates(state: &mut GameState, dt: f32) {
    let tuning = &state.tuning;
    let motion = Motion {
        gravity: tuning.gravity * tuning.crate_gravity_scale,
        drag: tuning.crate_drag,
    };
    let mut puffs = Vec::new();

    for c in state.world.crates.iter_mut() {
        integrate(c, motion, dt);
        let contacts = resolve_statics(c, &state.world.platforms, &state.world.walls);
        c.on_ground = contacts.grounded;
        if c.on_ground {
            c.vel.x *= tuning.ground_friction;
        }
        if settles(c.thrown, c.on_ground, c.vel, tuning) {
            c.thrown = false;
        }
        if c.thrown || c.hot {
            c.smoke_timer -= dt;
            if c.smoke_timer <= 0.0 {
                c.smoke_timer = tuning.smoke_interval;
                let color = if c.hot { 0x5a4a40 } else { 0x6b6b6b };
                puffs.push((c.center(), c.vel * -0.1, color));
            }
        }
    }
    emit_smoke(state, puffs);
}

fn update_enemies(state: &mut GameState, dt: f32) {
    let tuning = &state.tuning;
    let motion = Motion {
        gravity: tuning.gravity * tuning.enemy_gravity_scale,
        drag: tuning.enemy_drag,
    };
    let player_x = state.player.center().x;
    let mut puffs = Vec::new();

    for e in state.world.enemies.iter_mut() {
        if e.on_ground && !e.thrown {
            let dx = player_x - e.center().x;
            e.vel.x = if dx.abs() < tuning.enemy_aggro_range {
                sign_or(dx, 0.0) * tuning.enemy_walk_speed
            } else {
                0.0
            };
        }
        integrate(e, motion, dt);
        let contacts = resolve_statics(e, &state.world.platforms, &state.world.walls);
        e.on_ground = contacts.grounded;
        if settles(e.thrown, e.on_ground, e.vel, tuning) {
            e.thrown = false;
        }
        if e.thrown {
            e.smoke_timer -= dt;
            if e.smoke_timer <= 0.0 {
                e.smoke_timer = tuning.smoke_interval;
                puffs.push((e.center(), e.vel * -0.1, 0x7a3b2e));
            }
        }
    }
    emit_smoke(state, puffs);
}

fn emit_smoke(state: &mut GameState, puffs: Vec<(Vec2, Vec2, u32)>) {
    for (pos, vel, color) in puffs {
        let jitter = Vec2::new(state.rng.random_range(-12.0..=12.0), state.rng.random_range(-12.0..=12.0));
        state.world.push_smoke(Smoke {
            pos,
            vel: vel + jitter,
            life: state.rng.random_range(0.45..=0.8),
            radius: state.rng.random_range(4.0..=7.0),
            color,
        });
    }
}

/// Unconditional detonation triggers
fn resolve_contacts(state: &mut GameState, dash: bool) {
    let player_rect = state.player.rect();

    let smashed: Vec<(Target, Vec2)> = state
        .world
        .enemies
        .iter()
        .filter(|e| overlaps(&player_rect, &e.rect()))
        .map(|e| (Target::Enemy(e.id), e.center()))
        .chain(
            state
                .world
                .crates
                .iter()
                .filter(|c| overlaps(&player_rect, &c.rect()))
                .map(|c| (Target::Crate(c.id), c.center())),
        )
        .collect();

    for (target, center) in smashed {
        if detonate(state, target, true) {
            let away = sign_or(state.player.center().x - center.x, state.player.facing);
            state.player.vel.x += away * state.tuning.contact_boost_x;
            state.player.vel.y = state.player.vel.y.min(-state.tuning.contact_boost_y);
            state.player.on_ground = false;
            state.player.support = None;
            clamp_speed(&mut state.player, &state.tuning, dash);
        }
    }

    // Reverse index order so a removal never shifts a pair we still need
    let mut pairs = Vec::new();
    let enemies = &state.world.enemies;
    for i in (0..enemies.len()).rev() {
        for j in (0..i).rev() {
            if overlaps(&enemies[i].rect(), &enemies[j].rect()) {
                pairs.push((enemies[i].id, enemies[j].id));
            }
        }
    }
    for (a, b) in pairs {
        detonate(state, Target::Enemy(a), true);
        detonate(state, Target::Enemy(b), true);
    }
}

/// Keep every entity inside `[camera.x - prune_margin, frontier]`
fn enforce_bounds(state: &mut GameState) {
    let min_x = state.camera.pos.x - state.tuning.prune_margin;
    let max_x = state.generator.frontier;
    let max_y = state.view.height + state.tuning.reset_fall_depth;
    let view = Rect::new(state.camera.pos.x, state.camera.pos.y, state.view.width, state.view.height);
    for (target, loud) in prune(&mut state.world, min_x, max_x, max_y, &view) {
        detonate(state, target, loud);
    }
}
