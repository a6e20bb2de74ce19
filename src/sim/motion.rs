//! Per-tick motion integration
//!
//! Units are pixels and pixels/tick; there is no `dt` because the simulation
//! only ever advances by one fixed tick.

use glam::Vec2;

use super::state::{Arena, Facing, Obstacle, Player};
use crate::consts::*;

/// Advance the player one tick: input acceleration, speed cap, friction,
/// integration, then viewport clamp.
pub fn step_player(player: &mut Player, arena: &Arena) {
    let intent = player.intent;
    let body = &mut player.body;

    let mut accel = Vec2::ZERO;
    if intent.up {
        accel.y -= PLAYER_ACCELERATION;
    }
    if intent.down {
        accel.y += PLAYER_ACCELERATION;
    }
    if intent.left {
        accel.x -= PLAYER_ACCELERATION;
        body.facing = Facing::Left;
    }
    if intent.right {
        accel.x += PLAYER_ACCELERATION;
        body.facing = Facing::Right;
    }
    body.vel += accel;

    // Rescale the whole vector so diagonals are not faster than straight lines
    body.vel = body.vel.clamp_length_max(PLAYER_MAX_SPEED);
    body.vel *= PLAYER_FRICTION;

    body.pos += body.vel;

    let max_x = (arena.width - body.width).max(0.0);
    let max_y = (arena.height - body.height).max(0.0);
    if body.pos.x < 0.0 || body.pos.x > max_x {
        body.pos.x = body.pos.x.clamp(0.0, max_x);
        body.vel.x = 0.0;
    }
    if body.pos.y < 0.0 || body.pos.y > max_y {
        body.pos.y = body.pos.y.clamp(0.0, max_y);
        body.vel.y = 0.0;
    }
}

/// Advance an obstacle one tick: straight line plus a small vertical wobble
pub fn step_obstacle(obstacle: &mut Obstacle) {
    let body = &mut obstacle.body;
    body.pos += body.vel;
    body.pos.y += body.oscillation_phase.sin() * DRIFT_AMPLITUDE;
    body.oscillation_phase += DRIFT_STEP;
}

/// Move every obstacle and drop the ones that left the arena.
///
/// Returns the ids of removed obstacles.
pub fn step_obstacles(obstacles: &mut Vec<Obstacle>, arena: &Arena) -> Vec<u32> {
    let mut removed = Vec::new();
    obstacles.retain_mut(|obstacle| {
        step_obstacle(obstacle);
        if arena.is_out_of_bounds(obstacle.body.pos) {
            removed.push(obstacle.id);
            false
        } else {
            true
        }
    });
    removed
}
