//! Fish-shaped collision detection
//!
//! A fish is narrower than its sprite box and tapers toward the tail, so a
//! single box feels unfair. Each entity is read as three boxes instead (head,
//! body, tail) and every player box is tested against every obstacle box.

use glam::Vec2;

use super::rect::Rect;
use super::state::{Entity, Facing, Obstacle};

/// Fraction of the nominal box the silhouette occupies
pub const VISUAL_SCALE: f32 = 0.85;
/// Extra shrink for body and tail boxes (the head keeps its full size)
pub const PART_SHRINK: f32 = 0.85;

/// `[x, y, width, height]` as fractions of the scaled box, for a right-facing fish.
/// Tuned by feel; left-facing fish mirror the x offsets.
pub const HEAD_PROPORTIONS: [f32; 4] = [0.62, 0.18, 0.38, 0.64];
pub const BODY_PROPORTIONS: [f32; 4] = [0.28, 0.10, 0.40, 0.80];
pub const TAIL_PROPORTIONS: [f32; 4] = [0.00, 0.28, 0.30, 0.44];

/// Which part of a fish a hitbox belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Head,
    Body,
    Tail,
}

/// Three-box approximation of a fish
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub parts: [(HitPart, Rect); 3],
}

impl Hitbox {
    /// Decompose an entity using its current position and facing
    pub fn for_entity(entity: &Entity) -> Self {
        let scaled = entity.bounds().scaled(VISUAL_SCALE);
        let part = |proportions: [f32; 4], shrink: f32| {
            let [fx, fy, fw, fh] = proportions;
            let fx = match entity.facing {
                Facing::Right => fx,
                Facing::Left => 1.0 - fx - fw,
            };
            let rect = Rect::from_min_size(
                scaled.min + scaled.size * Vec2::new(fx, fy),
                scaled.size * Vec2::new(fw, fh),
            );
            rect.scaled(shrink)
        };
        Self {
            parts: [
                (HitPart::Head, part(HEAD_PROPORTIONS, 1.0)),
                (HitPart::Body, part(BODY_PROPORTIONS, PART_SHRINK)),
                (HitPart::Tail, part(TAIL_PROPORTIONS, PART_SHRINK)),
            ],
        }
    }

    /// First overlapping pair, as (our part, their part)
    pub fn first_overlap(&self, other: &Hitbox) -> Option<(HitPart, HitPart)> {
        for (ours, a) in &self.parts {
            for (theirs, b) in &other.parts {
                if a.intersects(b) {
                    return Some((*ours, *theirs));
                }
            }
        }
        None
    }
}

/// A detected player/obstacle contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub obstacle_id: u32,
    pub player_part: HitPart,
    pub obstacle_part: HitPart,
}

/// Test the player against every live obstacle.
///
/// Stops at the first intersection; any single contact is a failure, so the
/// order in which pairs are tested does not change the outcome.
pub fn find_contact(player: &Entity, obstacles: &[Obstacle]) -> Option<Contact> {
    let player_box = Hitbox::for_entity(player);
    let player_bounds = player.bounds();
    obstacles.iter().find_map(|obstacle| {
        // Cheap reject on nominal boxes first
        if !player_bounds.intersects(&obstacle.body.bounds()) {
            return None;
        }
        let (player_part, obstacle_part) =
            player_box.first_overlap(&Hitbox::for_entity(&obstacle.body))?;
        Some(Contact {
            obstacle_id: obstacle.id,
            player_part,
            obstacle_part,
        })
    })
}
