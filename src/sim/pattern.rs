//! Phase choreographies
//!
//! `pattern_for(level, phase)` is a pure table lookup: the same inputs always
//! give the same, delay-ordered list of spawn recipes. Higher levels speed the
//! fish up and, past fixed level thresholds, layer extra fish onto the base
//! choreography.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{LAST_PHASE, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

/// Level-1 horizontal speed before the per-level step
pub const BASE_SPEED: f32 = 1.2;
/// Speed added per difficulty level
pub const LEVEL_SPEED_STEP: f32 = 0.3;
/// Complexity growth per level above 1
pub const COMPLEXITY_STEP: f32 = 0.15;
/// Tracking phases run slightly below the level's entry speed
pub const TRACKING_SPEED_RATIO: f32 = 0.9;

/// Bursts stop growing past this many extra fish
pub const MAX_EXTRA_FISH: u32 = 12;

/// Spawn sizes (30 maps to the nominal 100x40 fish)
pub const STANDARD_SIZE: f32 = 30.0;
pub const SMALL_SIZE: f32 = 25.0;

// Entry lines just outside the viewport
const LEFT: f32 = -50.0;
const RIGHT: f32 = VIEWPORT_WIDTH + 50.0;
const TOP: f32 = -50.0;
const BOTTOM: f32 = VIEWPORT_HEIGHT + 50.0;
const MID: f32 = VIEWPORT_HEIGHT / 2.0;

/// Ring radius for circular pursuit, measured from the fish box anchor
const RING_RADIUS: f32 = 340.0;
/// Circular pursuit aims this far off-centre (radians)
const RING_SWIRL: f32 = 0.4;

/// A timed recipe for one obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnInstruction {
    /// Delay after phase start
    pub delay_ms: u64,
    pub origin_x: f32,
    pub origin_y: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub size: f32,
}

impl SpawnInstruction {
    pub fn new(delay_ms: u64, origin_x: f32, origin_y: f32, velocity_x: f32, velocity_y: f32, size: f32) -> Self {
        Self {
            delay_ms,
            origin_x,
            origin_y,
            velocity_x,
            velocity_y,
            size,
        }
    }

    #[inline]
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.origin_x, self.origin_y)
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.velocity_x, self.velocity_y)
    }
}

/// Speed knobs derived from a level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Difficulty {
    pub level: u32,
    pub base_speed: f32,
    pub complexity: f32,
    pub extra_fish: u32,
}

impl Difficulty {
    pub fn for_level(level: u32) -> Self {
        let level = level.max(1);
        Self {
            level,
            base_speed: BASE_SPEED + level as f32 * LEVEL_SPEED_STEP,
            complexity: 1.0 + (level - 1) as f32 * COMPLEXITY_STEP,
            extra_fish: level.saturating_sub(1).min(MAX_EXTRA_FISH),
        }
    }

    /// Gentle speed for the opening tracking phases
    pub fn tracking_speed(&self) -> f32 {
        (BASE_SPEED + (self.level - 1) as f32 * LEVEL_SPEED_STEP) * TRACKING_SPEED_RATIO
    }

    /// Base speed scaled by complexity, used from phase 4 on
    pub fn scaled_speed(&self) -> f32 {
        self.base_speed * self.complexity
    }

    /// Gap between fish in a burst, shrinking with complexity
    fn burst_spacing_ms(&self, base_ms: f32) -> u64 {
        (base_ms / self.complexity).round() as u64
    }
}

/// Human-readable phase name (for logs and HUD)
pub fn phase_name(phase: u32) -> &'static str {
    match phase {
        0 => "single tracking",
        1 => "opposite tracking",
        2 => "vertical tracking",
        3 => "diagonal pursuit",
        4 => "smooth pursuit",
        5 => "saccadic bursts",
        6 => "convergence",
        7 => "divergence",
        8 => "figure-eight",
        9 => "peripheral spread",
        10 => "vergence crossing",
        11 => "rapid bursts",
        12 => "circular pursuit",
        13 => "advanced vergence",
        14 => "final wave",
        _ => "warm-up",
    }
}

/// Spawn list under construction
struct Pattern {
    spawns: Vec<SpawnInstruction>,
}

impl Pattern {
    fn new() -> Self {
        Self { spawns: Vec::new() }
    }

    fn add(&mut self, delay_ms: u64, x: f32, y: f32, vx: f32, vy: f32, size: f32) -> &mut Self {
        self.spawns.push(SpawnInstruction::new(delay_ms, x, y, vx, vy, size));
        self
    }

    /// Standard-size fish
    fn fish(&mut self, delay_ms: u64, x: f32, y: f32, vx: f32, vy: f32) -> &mut Self {
        self.add(delay_ms, x, y, vx, vy, STANDARD_SIZE)
    }

    fn finish(mut self) -> Vec<SpawnInstruction> {
        // Stable: simultaneous spawns keep their authored order
        self.spawns.sort_by_key(|s| s.delay_ms);
        self.spawns
    }
}

/// Build the spawn list for a phase of a mission at `level`.
///
/// Phases past the last one fall back to a single fish from the left edge.
pub fn pattern_for(level: u32, phase: u32) -> Vec<SpawnInstruction> {
    let d = Difficulty::for_level(level);
    let level = d.level;
    let t = d.tracking_speed();
    let s = d.base_speed;
    let v = d.scaled_speed();
    let mut p = Pattern::new();

    match phase {
        // Single fish crossing left to right
        0 => {
            p.fish(0, LEFT, MID, t, 0.0);
            if level >= 2 {
                p.fish(800, LEFT, 150.0, t, 0.0);
            }
            if level >= 4 {
                p.fish(800, LEFT, 450.0, t, 0.0);
            }
        }
        // Mirror of phase 0
        1 => {
            p.fish(0, RIGHT, MID, -t, 0.0);
            if level >= 2 {
                p.fish(800, RIGHT, 450.0, -t, 0.0);
            }
            if level >= 4 {
                p.fish(800, RIGHT, 150.0, -t, 0.0);
            }
        }
        // Top to bottom
        2 => {
            p.fish(0, MID, TOP, 0.0, t);
            if level >= 3 {
                p.fish(700, 150.0, BOTTOM, 0.0, -t);
            }
            if level >= 5 {
                p.fish(700, 450.0, BOTTOM, 0.0, -t);
            }
        }
        // Corner to corner
        3 => {
            let k = s * 0.7;
            p.fish(0, LEFT, TOP, k, k);
            if level >= 2 {
                p.fish(600, RIGHT, BOTTOM, -k, -k);
            }
            if level >= 4 {
                p.fish(1200, RIGHT, TOP, -k, k);
            }
            if level >= 5 {
                p.fish(1200, LEFT, BOTTOM, k, -k);
            }
        }
        // Slow, gently sloped glides
        4 => {
            let k = s * 0.6 * d.complexity;
            p.fish(0, LEFT, 200.0, k, 0.25)
                .fish(1500, RIGHT, 400.0, -k, -0.25);
            if level >= 3 {
                p.fish(3000, LEFT, MID, k, 0.0);
            }
            if level >= 5 {
                p.fish(3000, RIGHT, 100.0, -k, 0.35);
            }
        }
        // Quick darting fish in close succession
        5 => {
            let k = s * 1.5 * d.complexity;
            let gap = d.burst_spacing_ms(250.0);
            for i in 0..3u32 {
                p.add(u64::from(i) * gap, LEFT, 150.0 + 150.0 * i as f32, k, 0.0, SMALL_SIZE);
            }
            if level >= 3 {
                for i in 0..3u32 {
                    let delay = gap / 2 + u64::from(i) * gap;
                    p.add(delay, RIGHT, 75.0 + 150.0 * i as f32, -k, 0.0, SMALL_SIZE);
                }
            }
            if level >= 5 {
                p.add(3 * gap + gap / 2, MID, TOP, 0.0, k, SMALL_SIZE);
            }
        }
        // Fish meeting in the middle
        6 => {
            p.fish(0, LEFT, MID, v, 0.0).fish(0, RIGHT, MID, -v, 0.0);
            if level >= 2 {
                p.fish(500, MID, TOP, 0.0, v).fish(500, MID, BOTTOM, 0.0, -v);
            }
            if level >= 4 {
                let k = v * 0.7;
                p.fish(1000, LEFT, TOP, k, k)
                    .fish(1000, RIGHT, TOP, -k, k)
                    .fish(1000, LEFT, BOTTOM, k, -k)
                    .fish(1000, RIGHT, BOTTOM, -k, -k);
            }
        }
        // Pairs leaving a shared entry point and fanning out
        7 => {
            p.fish(0, MID, TOP, -v * 0.5, v).fish(0, MID, TOP, v * 0.5, v);
            if level >= 3 {
                p.fish(600, MID, BOTTOM, -v * 0.5, -v)
                    .fish(600, MID, BOTTOM, v * 0.5, -v);
            }
            if level >= 5 {
                p.fish(1200, LEFT, MID, v, -v * 0.4)
                    .fish(1200, LEFT, MID, v, v * 0.4);
            }
        }
        // Crossing sine-like paths from both sides
        8 => {
            p.fish(0, LEFT, 150.0, v, v * 0.4)
                .fish(0, LEFT, 450.0, v, -v * 0.4)
                .fish(700, RIGHT, 150.0, -v, v * 0.4)
                .fish(700, RIGHT, 450.0, -v, -v * 0.4);
            if level >= 4 {
                p.fish(1400, MID, TOP, 0.0, v);
            }
        }
        // Small fish hugging the edges
        9 => {
            p.add(0, LEFT, 40.0, v, 0.0, SMALL_SIZE)
                .add(0, LEFT, 530.0, v, 0.0, SMALL_SIZE)
                .add(400, RIGHT, 40.0, -v, 0.0, SMALL_SIZE)
                .add(400, RIGHT, 530.0, -v, 0.0, SMALL_SIZE);
            if level >= 2 {
                p.add(800, 40.0, TOP, 0.0, v, SMALL_SIZE)
                    .add(800, 530.0, BOTTOM, 0.0, -v, SMALL_SIZE);
            }
        }
        // X-shaped crossings, upper then lower
        10 => {
            p.fish(0, LEFT, 100.0, v, v * 0.5)
                .fish(0, RIGHT, 100.0, -v, v * 0.5)
                .fish(900, LEFT, 500.0, v, -v * 0.5)
                .fish(900, RIGHT, 500.0, -v, -v * 0.5);
            if level >= 3 {
                p.fish(1800, MID, TOP, 0.0, v * 1.1);
            }
        }
        // Burst whose length grows with the level
        11 => {
            let count = d.extra_fish.saturating_add(3);
            let gap = d.burst_spacing_ms(300.0);
            let k = v * 1.2;
            for i in 0..count {
                let y = 80.0 + ((u64::from(i) * 130) % 440) as f32;
                let delay = u64::from(i) * gap;
                if i % 2 == 0 {
                    p.add(delay, LEFT, y, k, 0.0, SMALL_SIZE);
                } else {
                    p.add(delay, RIGHT, y, -k, 0.0, SMALL_SIZE);
                }
            }
            if level >= 3 {
                p.fish(u64::from(count) * gap, MID, TOP, 0.0, v);
            }
        }
        // Fish entering from a ring, swirling past the centre
        12 => {
            let count: u32 = if level >= 4 { 8 } else { 6 };
            let anchor = Vec2::new(VIEWPORT_WIDTH / 2.0 - 50.0, VIEWPORT_HEIGHT / 2.0 - 20.0);
            for i in 0..count {
                let angle = i as f32 * TAU / count as f32;
                let origin = anchor + Vec2::new(angle.cos(), angle.sin()) * RING_RADIUS;
                let heading = -Vec2::new((angle + RING_SWIRL).cos(), (angle + RING_SWIRL).sin()) * v;
                p.fish(u64::from(i) * 350, origin.x, origin.y, heading.x, heading.y);
            }
        }
        // Faster converging pairs with vertical drift
        13 => {
            let k = v * 1.2;
            p.fish(0, LEFT, 150.0, k, k * 0.25)
                .fish(0, RIGHT, 450.0, -k, -k * 0.25)
                .fish(600, LEFT, 450.0, k, -k * 0.25)
                .fish(600, RIGHT, 150.0, -k, k * 0.25);
            if level >= 3 {
                p.fish(1200, MID, TOP, 0.0, k);
            }
            if level >= 5 {
                p.fish(1200, MID, BOTTOM, 0.0, -k);
            }
        }
        // Four waves replaying earlier motifs
        LAST_PHASE => {
            let k = v * 0.7;
            // Tracking pair
            p.fish(0, LEFT, 200.0, v, 0.0).fish(0, RIGHT, 400.0, -v, 0.0);
            // Diagonal cross
            p.fish(1500, LEFT, TOP, k, k).fish(1500, RIGHT, TOP, -k, k);
            // Burst
            let count = d.extra_fish.saturating_add(3);
            let gap = d.burst_spacing_ms(250.0);
            for i in 0..count {
                let y = 100.0 + ((u64::from(i) * 110) % 400) as f32;
                let delay = 3000 + u64::from(i) * gap;
                if i % 2 == 0 {
                    p.add(delay, LEFT, y, v * 1.2, 0.0, SMALL_SIZE);
                } else {
                    p.add(delay, RIGHT, y, -v * 1.2, 0.0, SMALL_SIZE);
                }
            }
            // Vertical convergence
            let finale = 4500 + u64::from(count) * gap;
            p.fish(finale, MID, TOP, 0.0, v).fish(finale, MID, BOTTOM, 0.0, -v);
            if level >= 2 {
                p.add(4500, LEFT, 40.0, v, 0.0, SMALL_SIZE)
                    .add(4500, RIGHT, 530.0, -v, 0.0, SMALL_SIZE);
            }
            if level >= 5 {
                p.fish(finale + 1500, LEFT, BOTTOM, k, -k)
                    .fish(finale + 1500, RIGHT, BOTTOM, -k, -k);
            }
        }
        _ => {
            p.fish(0, LEFT, MID, s, 0.0);
        }
    }

    p.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TOTAL_PHASES;
    use crate::sim::state::Arena;
    use proptest::prelude::*;

    #[test]
    fn test_level_one_opening_phase() {
        let pattern = pattern_for(1, 0);
        assert_eq!(pattern.len(), 1);
        let spawn = pattern[0];
        assert!((spawn.velocity_x - 1.08).abs() < 1e-5);
        assert_eq!(spawn.velocity_y, 0.0);
        assert_eq!(spawn.origin_x, -50.0);
        assert_eq!(spawn.origin_y, 300.0);
        assert_eq!(spawn.delay_ms, 0);
    }

    #[test]
    fn test_difficulty_formulas() {
        let d = Difficulty::for_level(3);
        assert!((d.base_speed - 2.1).abs() < 1e-5);
        assert!((d.complexity - 1.3).abs() < 1e-5);
        assert_eq!(d.extra_fish, 2);
        assert_eq!(Difficulty::for_level(1).extra_fish, 0);
        assert_eq!(Difficulty::for_level(u32::MAX).extra_fish, MAX_EXTRA_FISH);
    }

    #[test]
    fn test_extreme_levels_still_build() {
        for level in [MAX_EXTRA_FISH + 1, 1_000_000, u32::MAX] {
            for phase in 0..TOTAL_PHASES {
                let pattern = pattern_for(level, phase);
                assert!(!pattern.is_empty(), "level {level} phase {phase}");
                assert!(pattern.iter().all(|s| s.velocity_x.is_finite() && s.velocity_y.is_finite()));
            }
        }
        assert_eq!(pattern_for(u32::MAX, 11).len(), 3 + MAX_EXTRA_FISH as usize + 1);
    }

    #[test]
    fn test_out_of_range_phase_falls_back() {
        for phase in [TOTAL_PHASES, 99, u32::MAX] {
            let pattern = pattern_for(2, phase);
            assert_eq!(pattern.len(), 1);
            assert_eq!(pattern[0].origin_x, -50.0);
            assert_eq!(pattern[0].origin_y, 300.0);
            assert!((pattern[0].velocity_x - Difficulty::for_level(2).base_speed).abs() < 1e-6);
        }
    }

    #[test]
    fn test_thresholds_add_spawns() {
        assert_eq!(pattern_for(1, 0).len(), 1);
        assert_eq!(pattern_for(2, 0).len(), 2);
        assert_eq!(pattern_for(4, 0).len(), 3);
        assert_eq!(pattern_for(2, 2).len(), 1);
        assert_eq!(pattern_for(3, 2).len(), 2);
        assert_eq!(pattern_for(5, 2).len(), 3);
        assert_eq!(pattern_for(3, 12).len(), 6);
        assert_eq!(pattern_for(4, 12).len(), 8);
    }

    #[test]
    fn test_burst_scales_with_extra_fish() {
        assert_eq!(pattern_for(1, 11).len(), 3);
        assert_eq!(pattern_for(2, 11).len(), 4);
        // Level 3 adds the closing vertical fish on top of 3 + 2
        assert_eq!(pattern_for(3, 11).len(), 6);
    }

    #[test]
    fn test_spawns_enter_the_arena() {
        let arena = Arena::default();
        for level in 1..=6 {
            for phase in 0..TOTAL_PHASES {
                for spawn in pattern_for(level, phase) {
                    let origin = spawn.origin();
                    assert!(!arena.is_out_of_bounds(origin), "level {level} phase {phase}: {spawn:?}");
                    assert!(spawn.velocity().length() > 0.0);
                    assert!(!arena.is_out_of_bounds(origin + spawn.velocity()));
                }
            }
        }
    }

    proptest! {
        #[test]
        fn prop_patterns_nonempty_sorted_and_pure(level in 1u32..=u32::MAX, phase in 0u32..TOTAL_PHASES) {
            let a = pattern_for(level, phase);
            let b = pattern_for(level, phase);
            prop_assert!(!a.is_empty());
            prop_assert_eq!(&a, &b);
            prop_assert!(a.windows(2).all(|w| w[0].delay_ms <= w[1].delay_ms));
        }
    }
}
