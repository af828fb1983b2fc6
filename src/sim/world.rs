//! Entity registry
//!
//! Owns every collection of world entities. Spawning and removal go through
//! here so ids stay unique for the whole session and deferred actions can
//! re-validate their targets by id.

use std::collections::VecDeque;

use glam::Vec2;

use super::geom::Rect;
use super::state::{Crate, Enemy, EntityId, Hoop, Particle, Platform, Smoke, Wall};

/// All entities except the player
#[derive(Debug, Clone)]
pub struct World {
    pub platforms: Vec<Platform>,
    pub walls: Vec<Wall>,
    pub hoops: Vec<Hoop>,
    pub crates: Vec<Crate>,
    pub enemies: Vec<Enemy>,
    /// Oldest first, so the cap evicts from the front
    pub particles: VecDeque<Particle>,
    pub smoke: VecDeque<Smoke>,
    pub max_particles: usize,
    pub max_smoke: usize,
    next_id: EntityId,
}

impl Default for World {
    fn default() -> Self {
        Self::new(crate::consts::MAX_PARTICLES, crate::consts::MAX_SMOKE)
    }
}

impl World {
    pub fn new(max_particles: usize, max_smoke: usize) -> Self {
        Self {
            platforms: Vec::new(),
            walls: Vec::new(),
            hoops: Vec::new(),
            crates: Vec::new(),
            enemies: Vec::new(),
            particles: VecDeque::new(),
            smoke: VecDeque::new(),
            max_particles,
            max_smoke,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID (never reused within a session)
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Drop every entity. Ids keep counting so stale references stay stale.
    pub fn clear(&mut self) {
        self.platforms.clear();
        self.walls.clear();
        self.hoops.clear();
        self.crates.clear();
        self.enemies.clear();
        self.particles.clear();
        self.smoke.clear();
    }

    pub fn spawn_platform(&mut self, rect: Rect) -> EntityId {
        let id = self.next_entity_id();
        self.platforms.push(Platform {
            id,
            rect,
            occupied_timer: 0.0,
            collapsed: false,
        });
        id
    }

    pub fn spawn_wall(&mut self, rect: Rect) -> EntityId {
        let id = self.next_entity_id();
        self.walls.push(Wall { id, rect });
        id
    }

    pub fn spawn_hoop(&mut self, center: Vec2, radius: f32, launch_x: f32, launch_y: f32) -> EntityId {
        let id = self.next_entity_id();
        self.hoops.push(Hoop {
            id,
            center,
            radius,
            launch_x,
            launch_y,
            cooldown: 0.0,
        });
        id
    }

    pub fn spawn_crate(&mut self, pos: Vec2, vel: Vec2, size: f32) -> EntityId {
        let id = self.next_entity_id();
        let mut c = Crate::new(id, pos, size);
        c.vel = vel;
        c.thrown = vel != Vec2::ZERO;
        self.crates.push(c);
        id
    }

    pub fn spawn_enemy(&mut self, pos: Vec2, size: Vec2) -> EntityId {
        let id = self.next_entity_id();
        self.enemies.push(Enemy::new(id, pos, size));
        id
    }

    /// Add a particle, evicting the oldest past the cap
    pub fn push_particle(&mut self, particle: Particle) {
        if self.max_particles == 0 {
            return;
        }
        if self.particles.len() >= self.max_particles {
            self.particles.pop_front();
        }
        self.particles.push_back(particle);
    }

    pub fn push_smoke(&mut self, smoke: Smoke) {
        if self.max_smoke == 0 {
            return;
        }
        if self.smoke.len() >= self.max_smoke {
            self.smoke.pop_front();
        }
        self.smoke.push_back(smoke);
    }

    pub fn crate_index(&self, id: EntityId) -> Option<usize> {
        self.crates.iter().position(|c| c.id == id)
    }

    pub fn enemy_index(&self, id: EntityId) -> Option<usize> {
        self.enemies.iter().position(|e| e.id == id)
    }

    pub fn platform_index(&self, id: EntityId) -> Option<usize> {
        self.platforms.iter().position(|p| p.id == id)
    }

    pub fn remove_crate(&mut self, id: EntityId) -> Option<Crate> {
        self.crate_index(id).map(|i| self.crates.remove(i))
    }

    pub fn remove_enemy(&mut self, id: EntityId) -> Option<Enemy> {
        self.enemy_index(id).map(|i| self.enemies.remove(i))
    }

    pub fn remove_platform(&mut self, id: EntityId) -> Option<Platform> {
        self.platform_index(id).map(|i| self.platforms.remove(i))
    }

    /// Top surface of the highest platform spanning `x`
    ///
    /// Returns `f32::INFINITY` when nothing is under `x` ("fall forever").
    pub fn ground_height_at(&self, x: f32) -> f32 {
        self.platforms
            .iter()
            .filter(|p| !p.collapsed && x >= p.rect.x && x <= p.rect.right())
            .map(|p| p.rect.y)
            .fold(f32::INFINITY, f32::min)
    }

    /// Platforms whose horizontal span covers `x`
    pub fn platforms_spanning(&self, x: f32) -> usize {
        self.platforms
            .iter()
            .filter(|p| !p.collapsed && x >= p.rect.x && x <= p.rect.right())
            .count()
    }

    /// Advance particles and smoke, purging anything whose life ran out
    pub fn advance_effects(&mut self, dt: f32, gravity: f32) {
        for p in self.particles.iter_mut() {
            p.vel.y += gravity * 0.6 * dt;
            p.vel *= 0.99;
            p.pos += p.vel * dt;
            p.life -= dt;
        }
        self.particles.retain(|p| p.life > 0.0);

        for s in self.smoke.iter_mut() {
            s.vel *= 0.96;
            s.vel.y -= 30.0 * dt;
            s.pos += s.vel * dt;
            s.radius += 14.0 * dt;
            s.life -= dt;
        }
        self.smoke.retain(|s| s.life > 0.0);
    }

    /// Everything the HUD counts as "live"
    pub fn live_object_count(&self) -> usize {
        self.platforms.len()
            + self.walls.len()
            + self.hoops.len()
            + self.crates.len()
            + self.enemies.len()
            + self.particles.len()
            + self.smoke.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(life: f32) -> Particle {
        Particle {
            pos: Vec2::ZERO,
            vel: Vec2::new(50.0, -80.0),
            life,
            radius: 3.0,
            color: 0xffaa00,
        }
    }

    #[test]
    fn test_ids_are_unique_across_kinds() {
        let mut world = World::default();
        let a = world.spawn_crate(Vec2::ZERO, Vec2::ZERO, 28.0);
        let b = world.spawn_enemy(Vec2::ZERO, Vec2::new(30.0, 34.0));
        let c = world.spawn_platform(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(a != b && b != c && a != c);

        world.clear();
        let d = world.spawn_crate(Vec2::ZERO, Vec2::ZERO, 28.0);
        assert!(d > c);
    }

    #[test]
    fn test_remove_is_exactly_once() {
        let mut world = World::default();
        let id = world.spawn_enemy(Vec2::ZERO, Vec2::new(30.0, 34.0));
        assert!(world.remove_enemy(id).is_some());
        assert!(world.remove_enemy(id).is_none());
        assert!(world.enemies.is_empty());
    }

    #[test]
    fn test_ground_height_without_platform_is_infinite() {
        let mut world = World::default();
        world.spawn_platform(Rect::new(0.0, 500.0, 100.0, 40.0));
        world.spawn_platform(Rect::new(20.0, 380.0, 60.0, 20.0));
        assert_eq!(world.ground_height_at(50.0), 380.0);
        assert_eq!(world.ground_height_at(10.0), 500.0);
        assert_eq!(world.ground_height_at(150.0), f32::INFINITY);
        assert_eq!(world.platforms_spanning(50.0), 2);
    }

    #[test]
    fn test_expired_particles_are_purged() {
        let mut world = World::default();
        for i in 0..40 {
            world.push_particle(particle(0.2 + i as f32 * 0.02));
        }
        let max_life = 0.2 + 39.0 * 0.02;
        let dt = 1.0 / 60.0;
        let mut elapsed = 0.0;
        // One extra step absorbs float drift between the two accumulations
        while elapsed <= max_life + dt {
            world.advance_effects(dt, 2000.0);
            elapsed += dt;
        }
        assert!(world.particles.is_empty());
    }

    #[test]
    fn test_particle_cap_evicts_oldest() {
        let mut world = World::new(3, 3);
        for i in 0..5 {
            world.push_particle(particle(1.0 + i as f32));
        }
        assert_eq!(world.particles.len(), 3);
        assert_eq!(world.particles[0].life, 3.0);
        assert_eq!(world.particles.back().map(|p| p.life), Some(5.0));
    }

    #[test]
    fn test_smoke_cap_evicts_oldest() {
        let mut world = World::new(3, 2);
        for i in 0..4 {
            world.push_smoke(Smoke {
                pos: Vec2::ZERO,
                vel: Vec2::ZERO,
                life: i as f32,
                radius: 4.0,
                color: 0x6b6b6b,
            });
        }
        let lives: Vec<f32> = world.smoke.iter().map(|s| s.life).collect();
        assert_eq!(lives, vec![2.0, 3.0]);
    }
}
