//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, storage or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod input;
pub mod motion;
pub mod pattern;
pub mod rect;
pub mod scheduler;
pub mod state;
pub mod tick;

pub use autopilot::Autopilot;
pub use collision::{Contact, HitPart, Hitbox, find_contact};
pub use input::{Command, Direction, InputEvent, InputQueue};
pub use motion::{step_obstacle, step_obstacles, step_player};
pub use pattern::{Difficulty, SpawnInstruction, pattern_for, phase_name};
pub use rect::Rect;
pub use scheduler::SpawnScheduler;
pub use state::{
    Arena, Entity, Facing, GameEvent, Intent, MissionOutcome, MissionState, MissionStatus,
    Obstacle, Outcome, PhaseRecord, PhaseSummary, Player,
};
pub use tick::{PhaseTransition, apply_command, apply_input, evaluate_phase, start_attempt, tick};
