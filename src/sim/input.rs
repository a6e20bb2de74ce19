//! Input events from the presentation layer
//!
//! The UI pushes events whenever its toolkit delivers them; the simulation
//! drains the queue once at the start of each tick.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::state::Intent;

/// Directional keys (arrows or WASD, mapped by the presentation layer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Control commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Pause,
    Resume,
    Restart,
    Abandon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    Key { direction: Direction, pressed: bool },
    Command(Command),
}

impl InputEvent {
    pub fn press(direction: Direction) -> Self {
        InputEvent::Key {
            direction,
            pressed: true,
        }
    }

    pub fn release(direction: Direction) -> Self {
        InputEvent::Key {
            direction,
            pressed: false,
        }
    }
}

impl Intent {
    /// Apply a key transition
    pub fn set(&mut self, direction: Direction, pressed: bool) {
        match direction {
            Direction::Up => self.up = pressed,
            Direction::Down => self.down = pressed,
            Direction::Left => self.left = pressed,
            Direction::Right => self.right = pressed,
        }
    }
}

/// FIFO of events waiting for the next tick
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    /// Take every queued event in arrival order
    pub fn drain(&mut self) -> Vec<InputEvent> {
        self.events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
