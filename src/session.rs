//! A running mission
//!
//! Owns the simulation state, the pending input and the progress store, and
//! turns phase/mission boundary events into progress writes. Presentation
//! code pushes input whenever it arrives and calls `tick` once per frame.

use crate::progress::{ProgressReport, ProgressStore};
use crate::settings::Settings;
use crate::sim::{
    GameEvent, InputEvent, InputQueue, MissionState, Outcome, start_attempt, tick,
};

#[derive(Debug)]
pub struct Session {
    state: MissionState,
    input: InputQueue,
    store: ProgressStore,
}

impl Session {
    /// Create a mission from `settings` and start its first attempt
    pub fn start(settings: &Settings, store: ProgressStore, mission_id: u32) -> Self {
        if !store.is_unlocked(mission_id) {
            log::warn!("Mission {} is still locked, starting anyway", mission_id);
        }
        let mut session = Self {
            state: MissionState::new(mission_id, settings.arena(), settings.seed),
            input: InputQueue::new(),
            store,
        };
        let events = start_attempt(&mut session.state);
        session.record(&events);
        session
    }

    /// Queue an input event for the next tick
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Advance one tick, returning what happened
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let inputs = self.input.drain();
        let events = tick(&mut self.state, &inputs);
        self.record(&events);
        events
    }

    /// Progress writes for boundary events
    fn record(&mut self, events: &[GameEvent]) {
        let mission = self.state.mission_id;
        for event in events {
            match event {
                GameEvent::AttemptStarted { .. } => {
                    self.store.record_attempt_start(mission);
                }
                GameEvent::PhaseCleared { phase, .. } => {
                    self.store.record_phase_reached(mission, *phase);
                }
                GameEvent::MissionEnded(outcome) => match outcome.outcome {
                    Outcome::Completed => {
                        self.store.record_completion(mission);
                    }
                    Outcome::Failed => {
                        log::info!(
                            "Mission {} failed after {} phases ({})",
                            mission,
                            outcome.phases_cleared(),
                            self.store.report(mission)
                        );
                    }
                },
                _ => {}
            }
        }
    }

    pub fn state(&self) -> &MissionState {
        &self.state
    }

    /// Current phase index and time spent in it
    pub fn phase_progress(&self) -> (u32, u64) {
        (self.state.phase_index, self.state.elapsed_phase_ms())
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    pub fn report(&self) -> ProgressReport {
        self.store.report(self.state.mission_id)
    }

    /// End the session, handing the store back for the next mission
    pub fn into_store(self) -> ProgressStore {
        self.store
    }
}
