//! Notifications emitted for the host
//!
//! The simulation never waits on its consumers: events queue up during a tick
//! and are drained through an [`EventSink`] afterwards. A sink that fails is
//! logged and skipped.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Sound categories the host may map to samples or synthesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundKind {
    Impact,
    Explosion,
}

/// Something the host should present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Play a sound; `volume` is a 0-1 hint
    Sound { kind: SoundKind, volume: f32 },
    /// Spawn a visual burst at `pos`
    ParticleBurst { pos: Vec2, color: u32, count: u32 },
}

impl GameEvent {
    pub fn impact(volume: f32) -> Self {
        GameEvent::Sound {
            kind: SoundKind::Impact,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    pub fn explosion(volume: f32) -> Self {
        GameEvent::Sound {
            kind: SoundKind::Explosion,
            volume: volume.clamp(0.0, 1.0),
        }
    }
}

/// Failure reported by a host sink
#[derive(Debug, thiserror::Error)]
#[error("event sink failed: {0}")]
pub struct SinkError(pub String);

/// Host-side consumer of simulation events
pub trait EventSink {
    fn handle(&mut self, event: &GameEvent) -> Result<(), SinkError>;
}

/// Collects events into a Vec (handy for tests and replays)
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<GameEvent>,
}

impl EventSink for RecordingSink {
    fn handle(&mut self, event: &GameEvent) -> Result<(), SinkError> {
        self.events.push(event.clone());
        Ok(())
    }
}

/// Feed every event to `sink`, swallowing failures. Returns how many failed.
pub fn dispatch(events: impl IntoIterator<Item = GameEvent>, sink: &mut dyn EventSink) -> usize {
    let mut failures = 0;
    for event in events {
        if let Err(err) = sink.handle(&event) {
            failures += 1;
            log::warn!("Dropped {:?}: {}", event, err);
        }
    }
    failures
}
