//! Mission state and core simulation types
//!
//! Everything the tick mutates lives here. Presentation code reads it, never
//! writes it.

use std::fmt;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::pattern::SpawnInstruction;
use super::rect::Rect;
use super::scheduler::SpawnScheduler;
use crate::consts::*;
use crate::level_for_mission;

/// Current status of a mission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionStatus {
    /// Created, no attempt started yet
    Ready,
    /// Phase in progress, spawns still pending
    Spawning,
    /// Phase in progress, everything spawned, obstacles still live
    Active,
    /// Tick and spawn countdowns suspended
    Paused,
    /// Final phase cleared
    Complete,
    /// Collision ended the attempt
    Failed,
    /// Player left the mission
    Abandoned,
}

impl MissionStatus {
    /// True while the tick advances the simulation
    pub fn is_running(&self) -> bool {
        matches!(self, MissionStatus::Spawning | MissionStatus::Active)
    }

    /// True once the attempt can no longer change
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MissionStatus::Complete | MissionStatus::Failed | MissionStatus::Abandoned
        )
    }
}

/// Horizontal facing; the head sits on this side of the body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Facing implied by a horizontal velocity (vertical movers face right)
    pub fn from_velocity(vx: f32) -> Self {
        if vx < 0.0 { Facing::Left } else { Facing::Right }
    }
}

/// A moving fish body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Top-left corner of the nominal box
    pub pos: Vec2,
    pub vel: Vec2,
    /// Drift oscillator (radians)
    pub oscillation_phase: f32,
    pub facing: Facing,
    pub width: f32,
    pub height: f32,
}

impl Entity {
    pub fn new(pos: Vec2, vel: Vec2, width: f32, height: f32) -> Self {
        Self {
            pos,
            vel,
            oscillation_phase: 0.0,
            facing: Facing::from_velocity(vel.x),
            width,
            height,
        }
    }

    /// Nominal bounding box (before any hitbox scaling)
    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }
}

/// Held directional keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// The player's fish
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Entity,
    pub intent: Intent,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            body: Entity::new(
                Vec2::new(PLAYER_START_X, PLAYER_START_Y),
                Vec2::ZERO,
                FISH_WIDTH,
                FISH_HEIGHT,
            ),
            intent: Intent::default(),
        }
    }
}

/// An obstacle fish
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub body: Entity,
}

impl Obstacle {
    /// Build an obstacle from a spawn recipe. `size` scales the nominal fish box.
    pub fn from_instruction(id: u32, instruction: &SpawnInstruction, oscillation_phase: f32) -> Self {
        let scale = instruction.size / NOMINAL_SPAWN_SIZE;
        let mut body = Entity::new(
            instruction.origin(),
            instruction.velocity(),
            FISH_WIDTH * scale,
            FISH_HEIGHT * scale,
        );
        body.oscillation_phase = oscillation_phase;
        Self { id, body }
    }
}

/// Play area bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
    /// Distance outside the viewport at which obstacles are dropped
    pub despawn_margin: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: VIEWPORT_WIDTH,
            height: VIEWPORT_HEIGHT,
            despawn_margin: DESPAWN_MARGIN,
        }
    }
}

impl Arena {
    /// True once a position has left the viewport by more than the margin
    pub fn is_out_of_bounds(&self, pos: Vec2) -> bool {
        let m = self.despawn_margin;
        pos.x < -m || pos.x > self.width + m || pos.y < -m || pos.y > self.height + m
    }
}

/// Timing and result of one phase within an attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub mission_id: u32,
    pub phase_index: u32,
    pub started_ms: u64,
    pub ended_ms: Option<u64>,
    pub survived_ms: u64,
    pub success: bool,
}

impl PhaseRecord {
    pub fn new(mission_id: u32, phase_index: u32, started_ms: u64) -> Self {
        Self {
            mission_id,
            phase_index,
            started_ms,
            ended_ms: None,
            survived_ms: 0,
            success: false,
        }
    }

    /// Close the record. Only the first call has any effect.
    pub fn complete(&mut self, now_ms: u64, success: bool) {
        if self.ended_ms.is_some() {
            return;
        }
        self.ended_ms = Some(now_ms);
        self.survived_ms = now_ms.saturating_sub(self.started_ms);
        self.success = success;
    }

    pub fn is_closed(&self) -> bool {
        self.ended_ms.is_some()
    }
}

impl fmt::Display for PhaseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Mission {}, Phase {}: {:.2}s ({})",
            self.mission_id,
            self.phase_index + 1,
            self.survived_ms as f64 / 1000.0,
            if self.success { "Success" } else { "Failed" }
        )
    }
}

/// How an attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Completed,
    Failed,
}

/// Per-phase line of a mission outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSummary {
    pub phase_index: u32,
    pub survived_ms: u64,
    pub success: bool,
}

/// Result of a finished attempt, handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionOutcome {
    pub mission_id: u32,
    pub outcome: Outcome,
    pub phase_records: Vec<PhaseSummary>,
}

impl MissionOutcome {
    pub fn from_records(mission_id: u32, outcome: Outcome, records: &[PhaseRecord]) -> Self {
        Self {
            mission_id,
            outcome,
            phase_records: records
                .iter()
                .map(|r| PhaseSummary {
                    phase_index: r.phase_index,
                    survived_ms: r.survived_ms,
                    success: r.success,
                })
                .collect(),
        }
    }

    /// Total time survived across all phases
    pub fn total_survived_ms(&self) -> u64 {
        self.phase_records.iter().map(|p| p.survived_ms).sum()
    }

    pub fn phases_cleared(&self) -> usize {
        self.phase_records.iter().filter(|p| p.success).count()
    }
}

/// Notable things that happened during a tick or command
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    AttemptStarted { mission_id: u32, attempt: u32 },
    PhaseStarted { phase: u32 },
    ObstacleSpawned { id: u32 },
    ObstacleDespawned { id: u32 },
    Collision { phase: u32, obstacle_id: u32 },
    PhaseCleared { phase: u32, survived_ms: u64 },
    MissionEnded(MissionOutcome),
    Paused,
    Resumed,
    Abandoned { phase: u32 },
}

/// Complete state of one mission attempt (deterministic for a given seed)
#[derive(Debug, Clone)]
pub struct MissionState {
    pub mission_id: u32,
    pub level: u32,
    /// Attempts started in this session (1-based once started)
    pub attempt: u32,
    /// Base seed; each attempt derives its own RNG stream from it
    pub seed: u64,
    pub arena: Arena,
    pub phase_index: u32,
    /// Simulation clock; only advances while running
    pub clock_ms: u64,
    pub phase_start_ms: u64,
    pub status: MissionStatus,
    pub player: Player,
    /// Live obstacles (sorted by id for determinism)
    pub obstacles: Vec<Obstacle>,
    /// History of the current attempt, one entry per phase entered
    pub phase_records: Vec<PhaseRecord>,
    pub scheduler: SpawnScheduler,
    pub rng: Pcg32,
    next_id: u32,
}

impl MissionState {
    /// Create a mission that has not started yet. Call `tick::start_attempt` to begin.
    pub fn new(mission_id: u32, arena: Arena, seed: u64) -> Self {
        Self {
            mission_id,
            level: level_for_mission(mission_id),
            attempt: 0,
            seed,
            arena,
            phase_index: 0,
            clock_ms: 0,
            phase_start_ms: 0,
            status: MissionStatus::Ready,
            player: Player::default(),
            obstacles: Vec::new(),
            phase_records: Vec::new(),
            scheduler: SpawnScheduler::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Milliseconds since the current phase began
    pub fn elapsed_phase_ms(&self) -> u64 {
        self.clock_ms.saturating_sub(self.phase_start_ms)
    }

    /// Record for the phase currently being played
    pub fn current_record_mut(&mut self) -> Option<&mut PhaseRecord> {
        self.phase_records.last_mut()
    }

    /// Reset everything for a fresh attempt. Keeps the mission and the clock.
    pub fn reset_attempt(&mut self) {
        self.attempt += 1;
        let stream = self
            .seed
            .wrapping_mul(31)
            .wrapping_add(u64::from(self.mission_id) << 32)
            .wrapping_add(u64::from(self.attempt));
        self.rng = Pcg32::seed_from_u64(stream);
        self.player = Player::default();
        self.obstacles.clear();
        self.phase_records.clear();
        self.scheduler.cancel_all();
        self.phase_index = 0;
    }

    /// Ensure obstacles are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.obstacles.sort_by_key(|o| o.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_record_completes_once() {
        let mut record = PhaseRecord::new(2, 3, 1000);
        record.complete(5210, true);
        record.complete(9000, false);
        assert_eq!(record.survived_ms, 4210);
        assert!(record.success);
        assert_eq!(record.to_string(), "Mission 2, Phase 4: 4.21s (Success)");
    }

    #[test]
    fn test_arena_margin() {
        let arena = Arena::default();
        assert!(!arena.is_out_of_bounds(Vec2::new(-100.0, 300.0)));
        assert!(arena.is_out_of_bounds(Vec2::new(-100.5, 300.0)));
        assert!(arena.is_out_of_bounds(Vec2::new(700.5, 300.0)));
        assert!(arena.is_out_of_bounds(Vec2::new(300.0, 701.0)));
        assert!(!arena.is_out_of_bounds(Vec2::new(650.0, 650.0)));
    }

    #[test]
    fn test_outcome_serializes_lowercase() {
        let outcome = MissionOutcome {
            mission_id: 1,
            outcome: Outcome::Failed,
            phase_records: vec![PhaseSummary {
                phase_index: 0,
                survived_ms: 1200,
                success: false,
            }],
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"outcome\":\"failed\""));
        assert_eq!(outcome.total_survived_ms(), 1200);
        assert_eq!(outcome.phases_cleared(), 0);
    }

    #[test]
    fn test_obstacle_size_scales_box() {
        let small = SpawnInstruction::new(0, -50.0, 300.0, 1.0, 0.0, 15.0);
        let obstacle = Obstacle::from_instruction(7, &small, 0.0);
        assert!((obstacle.body.width - 50.0).abs() < 1e-4);
        assert!((obstacle.body.height - 20.0).abs() < 1e-4);
        assert_eq!(obstacle.body.facing, Facing::Right);
    }
}
