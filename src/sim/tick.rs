//! Fixed timestep simulation tick
//!
//! Advances a mission attempt by one 16ms step and runs the phase state
//! machine: a collision fails the mission, and a phase clears once every
//! obstacle is gone and at least a second has passed.

use rand::Rng;

use super::collision::find_contact;
use super::input::{Command, InputEvent};
use super::motion::{step_obstacles, step_player};
use super::pattern::{pattern_for, phase_name};
use super::state::{
    GameEvent, MissionOutcome, MissionState, MissionStatus, Obstacle, Outcome, PhaseRecord,
};
use crate::consts::*;

/// What the phase state machine decided for this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseTransition {
    /// Keep playing the current phase
    Stay,
    /// Collision: the attempt is over
    Fail { obstacle_id: u32 },
    /// Phase cleared, move to `next`
    Advance { next: u32 },
    /// Final phase cleared
    Complete,
}

/// Pure transition rule.
///
/// A collision always wins. Otherwise the phase clears only when nothing is
/// live, nothing is still scheduled, and `MIN_PHASE_MS` has elapsed.
pub fn evaluate_phase(
    collided_with: Option<u32>,
    live_obstacles: usize,
    pending_spawns: usize,
    elapsed_ms: u64,
    phase: u32,
) -> PhaseTransition {
    if let Some(obstacle_id) = collided_with {
        return PhaseTransition::Fail { obstacle_id };
    }
    if live_obstacles > 0 || pending_spawns > 0 || elapsed_ms < MIN_PHASE_MS {
        return PhaseTransition::Stay;
    }
    if phase >= LAST_PHASE {
        PhaseTransition::Complete
    } else {
        PhaseTransition::Advance { next: phase + 1 }
    }
}

/// Begin a fresh attempt at phase 0 (first start and every restart)
pub fn start_attempt(state: &mut MissionState) -> Vec<GameEvent> {
    state.reset_attempt();
    let mut events = vec![GameEvent::AttemptStarted {
        mission_id: state.mission_id,
        attempt: state.attempt,
    }];
    log::info!(
        "Mission {} attempt {} (level {})",
        state.mission_id,
        state.attempt,
        state.level
    );
    enter_phase(state, 0, &mut events);
    events
}

/// Reset the obstacle field and arm the spawns for `phase`
fn enter_phase(state: &mut MissionState, phase: u32, events: &mut Vec<GameEvent>) {
    state.phase_index = phase;
    state.phase_start_ms = state.clock_ms;
    state.obstacles.clear();
    state.scheduler.cancel_all();

    let pattern = pattern_for(state.level, phase);
    state.scheduler.arm(&pattern, state.phase_start_ms);
    state
        .phase_records
        .push(PhaseRecord::new(state.mission_id, phase, state.clock_ms));
    state.status = MissionStatus::Spawning;

    log::info!(
        "Phase {}/{} started: {} ({} fish)",
        phase + 1,
        TOTAL_PHASES,
        phase_name(phase),
        pattern.len()
    );
    events.push(GameEvent::PhaseStarted { phase });
}

/// Apply one control command. Commands that make no sense in the current
/// status are ignored.
pub fn apply_command(state: &mut MissionState, command: Command) -> Vec<GameEvent> {
    let mut events = Vec::new();
    match (command, state.status) {
        (Command::Pause, status) if status.is_running() => {
            state.scheduler.suspend();
            state.status = MissionStatus::Paused;
            events.push(GameEvent::Paused);
        }
        (Command::Resume, MissionStatus::Paused) => {
            state.scheduler.resume(state.phase_start_ms);
            state.status = if state.scheduler.is_idle() {
                MissionStatus::Active
            } else {
                MissionStatus::Spawning
            };
            events.push(GameEvent::Resumed);
        }
        (Command::Restart, MissionStatus::Paused | MissionStatus::Failed | MissionStatus::Complete) => {
            events = start_attempt(state);
        }
        (Command::Abandon, status) if !status.is_terminal() && status != MissionStatus::Ready => {
            let now = state.clock_ms;
            if let Some(record) = state.current_record_mut() {
                record.complete(now, false);
            }
            state.scheduler.cancel_all();
            state.obstacles.clear();
            state.status = MissionStatus::Abandoned;
            log::info!("Mission {} abandoned at phase {}", state.mission_id, state.phase_index + 1);
            events.push(GameEvent::Abandoned {
                phase: state.phase_index,
            });
        }
        (command, status) => {
            log::debug!("Ignoring {:?} while {:?}", command, status);
        }
    }
    events
}

/// Apply one input event (key transition or command)
pub fn apply_input(state: &mut MissionState, event: InputEvent) -> Vec<GameEvent> {
    match event {
        // Key state is tracked even while paused so releases are never lost
        InputEvent::Key { direction, pressed } => {
            state.player.intent.set(direction, pressed);
            Vec::new()
        }
        InputEvent::Command(command) => apply_command(state, command),
    }
}

/// Advance the mission by one fixed timestep
pub fn tick(state: &mut MissionState, inputs: &[InputEvent]) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for &input in inputs {
        events.extend(apply_input(state, input));
    }

    // Paused, finished, or never started: the clock stands still
    if !state.status.is_running() {
        return events;
    }

    state.clock_ms += TICK_MS;

    // Due spawns join the field
    for instruction in state.scheduler.drain_due(state.clock_ms) {
        let id = state.next_entity_id();
        let oscillation_phase = state.rng.random_range(0.0..std::f32::consts::TAU);
        state
            .obstacles
            .push(Obstacle::from_instruction(id, &instruction, oscillation_phase));
        events.push(GameEvent::ObstacleSpawned { id });
    }
    state.normalize_order();

    step_player(&mut state.player, &state.arena);
    for id in step_obstacles(&mut state.obstacles, &state.arena) {
        events.push(GameEvent::ObstacleDespawned { id });
    }

    let contact = find_contact(&state.player.body, &state.obstacles);
    state.status = if state.scheduler.is_idle() {
        MissionStatus::Active
    } else {
        MissionStatus::Spawning
    };

    let transition = evaluate_phase(
        contact.map(|c| c.obstacle_id),
        state.obstacles.len(),
        state.scheduler.pending(),
        state.elapsed_phase_ms(),
        state.phase_index,
    );

    let now = state.clock_ms;
    let phase = state.phase_index;
    match transition {
        PhaseTransition::Stay => {}
        PhaseTransition::Fail { obstacle_id } => {
            if let Some(record) = state.current_record_mut() {
                record.complete(now, false);
            }
            state.scheduler.cancel_all();
            state.status = MissionStatus::Failed;
            log::info!(
                "Collision with fish {} at phase {}/{} ({:?})",
                obstacle_id,
                phase + 1,
                TOTAL_PHASES,
                contact.map(|c| (c.player_part, c.obstacle_part))
            );
            events.push(GameEvent::Collision { phase, obstacle_id });
            events.push(GameEvent::MissionEnded(MissionOutcome::from_records(
                state.mission_id,
                Outcome::Failed,
                &state.phase_records,
            )));
        }
        PhaseTransition::Advance { next } => {
            events.push(clear_phase(state, now));
            enter_phase(state, next, &mut events);
        }
        PhaseTransition::Complete => {
            events.push(clear_phase(state, now));
            state.status = MissionStatus::Complete;
            let outcome =
                MissionOutcome::from_records(state.mission_id, Outcome::Completed, &state.phase_records);
            log::info!(
                "Mission {} complete in {:.1}s",
                state.mission_id,
                outcome.total_survived_ms() as f64 / 1000.0
            );
            events.push(GameEvent::MissionEnded(outcome));
        }
    }

    events
}

/// Close the current phase record as a success
fn clear_phase(state: &mut MissionState, now: u64) -> GameEvent {
    let phase = state.phase_index;
    let mut survived_ms = 0;
    if let Some(record) = state.current_record_mut() {
        record.complete(now, true);
        survived_ms = record.survived_ms;
    }
    log::info!(
        "Phase {}/{} cleared in {:.1}s",
        phase + 1,
        TOTAL_PHASES,
        survived_ms as f64 / 1000.0
    );
    GameEvent::PhaseCleared { phase, survived_ms }
}
