//! Demo controller
//!
//! Plays a mission by emitting the same key events a human would. Used by
//! the headless runner and handy for soak-testing patterns.

use glam::Vec2;

use super::input::{Direction, InputEvent};
use super::state::{Intent, MissionState};

/// How far ahead (in ticks) obstacle positions are projected
const LOOKAHEAD_TICKS: f32 = 20.0;
/// Obstacles whose projected centre is farther than this are ignored
const DANGER_RADIUS: f32 = 160.0;
/// Steering components smaller than this do not press a key
const DEADZONE: f32 = 0.25;

/// Key-pressing demo player
#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    held: Intent,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Desired steering direction (unnormalised) for the current state
    pub fn steer(state: &MissionState) -> Vec2 {
        let player = &state.player.body;
        let centre = player.bounds().center();

        // Find the most threatening obstacle (closest projected centre)
        let threat = state
            .obstacles
            .iter()
            .map(|o| {
                let future = o.body.bounds().center() + o.body.vel * LOOKAHEAD_TICKS;
                (future, future.distance(centre))
            })
            .filter(|(_, dist)| *dist < DANGER_RADIUS)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        match threat {
            Some((future, dist)) => {
                let away = (centre - future).normalize_or(Vec2::Y);
                // Closer threats push harder; a weak pull home keeps us off the walls
                let home = Vec2::new(state.arena.width, state.arena.height) / 2.0 - centre;
                away * (DANGER_RADIUS / dist.max(1.0)) + home.normalize_or_zero() * 0.3
            }
            None => {
                // Drift back toward the middle of the arena
                let home = Vec2::new(state.arena.width, state.arena.height) / 2.0 - centre;
                if home.length() > 40.0 {
                    home.normalize_or_zero()
                } else {
                    Vec2::ZERO
                }
            }
        }
    }

    /// Key transitions needed to follow `steer` this tick
    pub fn plan(&mut self, state: &MissionState) -> Vec<InputEvent> {
        let dir = Self::steer(state);
        let wanted = Intent {
            up: dir.y < -DEADZONE,
            down: dir.y > DEADZONE,
            left: dir.x < -DEADZONE,
            right: dir.x > DEADZONE,
        };

        let mut events = Vec::new();
        for (direction, was, now) in [
            (Direction::Up, self.held.up, wanted.up),
            (Direction::Down, self.held.down, wanted.down),
            (Direction::Left, self.held.left, wanted.left),
            (Direction::Right, self.held.right, wanted.right),
        ] {
            if was != now {
                events.push(InputEvent::Key {
                    direction,
                    pressed: now,
                });
            }
        }
        self.held = wanted;
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::pattern::SpawnInstruction;
    use crate::sim::state::{Arena, Obstacle};

    fn state_with_obstacle(x: f32, y: f32, vx: f32) -> MissionState {
        let mut state = MissionState::new(1, Arena::default(), 7);
        let spawn = SpawnInstruction::new(0, x, y, vx, 0.0, 30.0);
        state.obstacles.push(Obstacle::from_instruction(1, &spawn, 0.0));
        state
    }

    #[test]
    fn test_steers_away_from_incoming_fish() {
        // Fish approaching from the left, slightly above the player
        let state = state_with_obstacle(150.0, 270.0, 3.0);
        let dir = Autopilot::steer(&state);
        assert!(dir.y > 0.0, "should dodge downward, got {dir:?}");
    }

    #[test]
    fn test_idle_at_centre_without_threats() {
        let mut state = MissionState::new(1, Arena::default(), 7);
        state.player.body.pos = Vec2::new(250.0, 280.0);
        let mut pilot = Autopilot::new();
        assert!(pilot.plan(&state).is_empty());
    }

    #[test]
    fn test_plan_emits_only_transitions() {
        let state = state_with_obstacle(150.0, 270.0, 3.0);
        let mut pilot = Autopilot::new();
        let first = pilot.plan(&state);
        assert!(first.contains(&InputEvent::press(Direction::Down)));
        // Same situation: keys already held, nothing new to send
        assert!(pilot.plan(&state).is_empty());
    }
}
