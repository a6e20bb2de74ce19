//! AquaVision - a fish dodging trainer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (patterns, motion, collisions, phase state)
//! - `session`: Drives a mission, feeding input in and progress out
//! - `progress`: Per-mission attempt/completion counters
//! - `persistence`: Durable storage backends for progress
//! - `settings`: Data-driven configuration

pub mod error;
pub mod persistence;
pub mod progress;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::StoreError;
pub use progress::{ProgressRecord, ProgressReport, ProgressStore};
pub use session::Session;
pub use settings::{EyeSide, Rgb, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (~60 Hz)
    pub const TICK_MS: u64 = 16;

    /// Phases per mission
    pub const TOTAL_PHASES: u32 = 15;
    /// Index of the final ("boss") phase
    pub const LAST_PHASE: u32 = TOTAL_PHASES - 1;
    /// Number of selectable missions
    pub const MISSION_COUNT: u32 = 5;
    /// A phase cannot clear before this much time has passed
    pub const MIN_PHASE_MS: u64 = 1000;

    /// Viewport dimensions
    pub const VIEWPORT_WIDTH: f32 = 600.0;
    pub const VIEWPORT_HEIGHT: f32 = 600.0;
    /// Obstacles are removed once this far outside the viewport
    pub const DESPAWN_MARGIN: f32 = 100.0;

    /// Nominal fish box (player and obstacles share the silhouette)
    pub const FISH_WIDTH: f32 = 100.0;
    pub const FISH_HEIGHT: f32 = 40.0;
    /// Spawn size that maps to the nominal fish box
    pub const NOMINAL_SPAWN_SIZE: f32 = 30.0;

    /// Player spawn (top-left of the fish box)
    pub const PLAYER_START_X: f32 = 300.0;
    pub const PLAYER_START_Y: f32 = 300.0;
    /// Velocity gained per tick for each held direction
    pub const PLAYER_ACCELERATION: f32 = 0.5;
    /// Speed cap (vector magnitude)
    pub const PLAYER_MAX_SPEED: f32 = 5.0;
    /// Velocity multiplier applied every tick
    pub const PLAYER_FRICTION: f32 = 0.92;

    /// Vertical drift added per tick is `sin(phase) * DRIFT_AMPLITUDE`
    pub const DRIFT_AMPLITUDE: f32 = 0.3;
    /// Oscillation phase advance per tick
    pub const DRIFT_STEP: f32 = 0.1;
}

/// Difficulty level for a mission id. Mission ids start at 1.
#[inline]
pub fn level_for_mission(mission_id: u32) -> u32 {
    mission_id.max(1)
}
