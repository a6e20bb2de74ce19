//! Pending spawn queue
//!
//! Spawns are keyed by the simulation time at which they fall due and drained
//! by the tick. Nothing here runs on its own: if the tick doesn't run, no
//! spawn fires.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use super::pattern::SpawnInstruction;

/// A spawn waiting for its due time
#[derive(Debug, Clone)]
struct ScheduledSpawn {
    due_ms: u64,
    /// Arm order; breaks ties so equal due times drain in pattern order
    seq: u64,
    instruction: SpawnInstruction,
}

impl ScheduledSpawn {
    fn key(&self) -> (u64, u64) {
        (self.due_ms, self.seq)
    }
}

impl PartialEq for ScheduledSpawn {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ScheduledSpawn {}

impl PartialOrd for ScheduledSpawn {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledSpawn {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Min-queue of spawns keyed by due time
#[derive(Debug, Clone, Default)]
pub struct SpawnScheduler {
    queue: BinaryHeap<Reverse<ScheduledSpawn>>,
    /// Spawns parked by `suspend`, as (seq, instruction). Delays stay phase-relative.
    parked: Vec<(u64, SpawnInstruction)>,
    next_seq: u64,
}

impl SpawnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule one spawn per instruction at `phase_start_ms + delay_ms`
    pub fn arm(&mut self, pattern: &[SpawnInstruction], phase_start_ms: u64) {
        for instruction in pattern {
            let seq = self.next_seq;
            self.next_seq += 1;
            self.push(seq, *instruction, phase_start_ms);
        }
        log::debug!("Armed {} spawns at t={}ms", pattern.len(), phase_start_ms);
    }

    fn push(&mut self, seq: u64, instruction: SpawnInstruction, phase_start_ms: u64) {
        self.queue.push(Reverse(ScheduledSpawn {
            due_ms: phase_start_ms.saturating_add(instruction.delay_ms),
            seq,
            instruction,
        }));
    }

    /// Pop every spawn due at or before `now_ms`, earliest first
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<SpawnInstruction> {
        let mut due = Vec::new();
        while let Some(Reverse(next)) = self.queue.peek() {
            if next.due_ms > now_ms {
                break;
            }
            if let Some(Reverse(spawn)) = self.queue.pop() {
                due.push(spawn.instruction);
            }
        }
        due
    }

    /// Drop every pending spawn, including parked ones
    pub fn cancel_all(&mut self) {
        self.queue.clear();
        self.parked.clear();
    }

    /// Park all pending spawns. They keep their phase-relative delays.
    pub fn suspend(&mut self) {
        self.parked
            .extend(self.queue.drain().map(|Reverse(s)| (s.seq, s.instruction)));
        self.parked.sort_by_key(|(seq, _)| *seq);
    }

    /// Re-arm parked spawns against `phase_start_ms`
    pub fn resume(&mut self, phase_start_ms: u64) {
        for (seq, instruction) in std::mem::take(&mut self.parked) {
            self.push(seq, instruction, phase_start_ms);
        }
    }

    /// Spawns still waiting (queued or parked)
    pub fn pending(&self) -> usize {
        self.queue.len() + self.parked.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    pub fn is_suspended(&self) -> bool {
        !self.parked.is_empty()
    }

    /// Due time of the next queued spawn
    pub fn next_due_ms(&self) -> Option<u64> {
        self.queue.peek().map(|Reverse(s)| s.due_ms)
    }
}
