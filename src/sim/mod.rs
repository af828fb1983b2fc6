//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Timestep supplied by the host, capped per tick
//! - Seeded RNG only
//! - Stable iteration order (registry insertion order)
//! - No rendering, audio or platform dependencies

pub mod camera;
pub mod chain;
pub mod events;
pub mod generate;
pub mod geom;
pub mod physics;
pub mod session;
pub mod state;
pub mod tick;
pub mod world;

pub use camera::Camera;
pub use chain::{Action, DeferredQueue, detonate};
pub use events::{EventSink, GameEvent, RecordingSink, SinkError, SoundKind};
pub use generate::Generator;
pub use geom::{Body, Contact, Rect, min_translation, overlaps, resolve};
pub use session::{GameState, Hud, RenderSnapshot};
pub use state::{Crate, Enemy, EntityId, Hoop, Particle, Platform, Player, Smoke, Target, Viewport, Wall};
pub use tick::{FrameClock, TickInput, tick};
pub use world::World;
