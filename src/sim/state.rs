//! Entity schemas
//!
//! Every entity carries its full schema from spawn; optional behaviour (fuses,
//! ground support, collapse) is a field with a default rather than something
//! bolted on later.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::{Body, Rect};

/// Stable identifier for anything the registry owns
pub type EntityId = u32;

/// Viewport size in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: crate::consts::VIEW_WIDTH,
            height: crate::consts::VIEW_HEIGHT,
        }
    }
}

/// The controllable actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    /// +1 facing right, -1 facing left
    pub facing: f32,
    pub on_ground: bool,
    /// Airborne jumps remaining (0 or 1)
    pub jumps_left: u8,
    /// Platform currently carrying the player (walls don't count)
    pub support: Option<EntityId>,
}

impl Player {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
            facing: 1.0,
            on_ground: false,
            jumps_left: 1,
            support: None,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }
}

impl Body for Player {
    fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }
    fn translate(&mut self, delta: Vec2) {
        self.pos += delta;
    }
    fn vel(&self) -> Vec2 {
        self.vel
    }
    fn vel_mut(&mut self) -> &mut Vec2 {
        &mut self.vel
    }
}

/// Walkable slab; collapses under sustained load or when left behind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: EntityId,
    pub rect: Rect,
    /// Seconds the player has continuously stood on this platform
    pub occupied_timer: f32,
    pub collapsed: bool,
}

/// Static obstacle, solid from every side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wall {
    pub id: EntityId,
    pub rect: Rect,
}

/// Circular launch trigger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hoop {
    pub id: EntityId,
    pub center: Vec2,
    pub radius: f32,
    pub launch_x: f32,
    pub launch_y: f32,
    /// Seconds until the hoop can fire again
    pub cooldown: f32,
}

impl Hoop {
    pub fn is_ready(&self) -> bool {
        self.cooldown <= 0.0
    }
}

/// Destructible box
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crate {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub thrown: bool,
    pub on_ground: bool,
    /// Ignited by a nearby blast; detonates when `hot_timer` runs out
    pub hot: bool,
    pub hot_timer: f32,
    /// Seconds until the next smoke puff
    pub smoke_timer: f32,
}

impl Crate {
    pub fn new(id: EntityId, pos: Vec2, size: f32) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            size: Vec2::splat(size),
            thrown: false,
            on_ground: false,
            hot: false,
            hot_timer: 0.0,
            smoke_timer: 0.0,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Light the fuse (no-op if already burning)
    pub fn ignite(&mut self, fuse: f32) {
        if !self.hot {
            self.hot = true;
            self.hot_timer = fuse;
        }
    }
}

impl Body for Crate {
    fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }
    fn translate(&mut self, delta: Vec2) {
        self.pos += delta;
    }
    fn vel(&self) -> Vec2 {
        self.vel
    }
    fn vel_mut(&mut self) -> &mut Vec2 {
        &mut self.vel
    }
}

/// Hostile actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub thrown: bool,
    pub on_ground: bool,
    pub smoke_timer: f32,
}

impl Enemy {
    pub fn new(id: EntityId, pos: Vec2, size: Vec2) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            size,
            thrown: false,
            on_ground: false,
            smoke_timer: 0.0,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }
}

impl Body for Enemy {
    fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }
    fn translate(&mut self, delta: Vec2) {
        self.pos += delta;
    }
    fn vel(&self) -> Vec2 {
        self.vel
    }
    fn vel_mut(&mut self) -> &mut Vec2 {
        &mut self.vel
    }
}

/// Explosion debris
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds remaining
    pub life: f32,
    pub radius: f32,
    /// 0xRRGGBB
    pub color: u32,
}

/// Trail puff left by thrown entities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Smoke {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub radius: f32,
    pub color: u32,
}

/// A destructible entity that a deferred detonation can name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Enemy(EntityId),
    Crate(EntityId),
}
