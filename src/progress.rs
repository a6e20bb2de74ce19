//! Per-mission progress counters
//!
//! One record per mission: attempts, completions and the furthest phase
//! reached. Every operation is an upsert that is saved before it is
//! committed in memory; if the save fails the operation is dropped and
//! logged, and the mission carries on.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::consts::{MISSION_COUNT, TOTAL_PHASES};
use crate::persistence::ProgressBackend;

/// Stored counters for one mission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub mission: u32,
    pub total_attempts: u32,
    pub successful_completions: u32,
    /// Phases cleared in the best attempt (1-based, 0 = none)
    pub highest_phase_reached: u32,
    pub last_updated: DateTime<Utc>,
}

impl ProgressRecord {
    pub fn new(mission: u32) -> Self {
        Self {
            mission,
            total_attempts: 0,
            successful_completions: 0,
            highest_phase_reached: 0,
            last_updated: Utc::now(),
        }
    }

    /// Completions as a percentage of attempts (0 when never attempted)
    pub fn success_rate(&self) -> f64 {
        if self.total_attempts == 0 {
            0.0
        } else {
            f64::from(self.successful_completions) / f64::from(self.total_attempts) * 100.0
        }
    }
}

/// Human-readable summary of a mission's record
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressReport {
    NotPlayed,
    Played {
        attempts: u32,
        completions: u32,
        success_rate: f64,
        highest_phase: u32,
    },
}

impl fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressReport::NotPlayed => write!(f, "Not played yet"),
            ProgressReport::Played {
                attempts,
                completions,
                success_rate,
                highest_phase,
            } => write!(
                f,
                "Attempts: {} | Completions: {} | Success rate: {:.1}% | Highest phase: {}/{}",
                attempts, completions, success_rate, highest_phase, TOTAL_PHASES
            ),
        }
    }
}

/// Progress table backed by a durable store
pub struct ProgressStore {
    records: BTreeMap<u32, ProgressRecord>,
    backend: Box<dyn ProgressBackend>,
}

impl fmt::Debug for ProgressStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressStore")
            .field("records", &self.records)
            .finish_non_exhaustive()
    }
}

impl ProgressStore {
    /// Load the table from `backend`. An unreadable store starts empty.
    pub fn open(backend: Box<dyn ProgressBackend>) -> Self {
        let records = match backend.load() {
            Ok(records) => {
                log::info!("Progress store opened ({} missions on record)", records.len());
                records.into_iter().map(|r| (r.mission, r)).collect()
            }
            Err(err) => {
                log::warn!("Progress store unreadable, starting empty: {}", err);
                BTreeMap::new()
            }
        };
        Self { records, backend }
    }

    /// Apply `change` to the mission's record (inserting it if absent), save,
    /// and commit only if the save succeeded.
    fn upsert(&mut self, mission: u32, op: &str, change: impl FnOnce(&mut ProgressRecord)) -> bool {
        let mut updated = self
            .records
            .get(&mission)
            .cloned()
            .unwrap_or_else(|| ProgressRecord::new(mission));
        change(&mut updated);
        updated.last_updated = Utc::now();

        let mut table: Vec<ProgressRecord> = self
            .records
            .values()
            .filter(|r| r.mission != mission)
            .cloned()
            .collect();
        table.push(updated.clone());
        table.sort_by_key(|r| r.mission);

        match self.backend.save(&table) {
            Ok(()) => {
                self.records.insert(mission, updated);
                true
            }
            Err(err) => {
                log::error!("Failed to save {} for mission {}: {}", op, mission, err);
                false
            }
        }
    }

    /// Count a new attempt. Returns false if the write was dropped.
    pub fn record_attempt_start(&mut self, mission: u32) -> bool {
        self.upsert(mission, "attempt", |r| r.total_attempts += 1)
    }

    /// Note that phase `phase` (0-based) was cleared
    pub fn record_phase_reached(&mut self, mission: u32, phase: u32) -> bool {
        self.upsert(mission, "phase", |r| {
            r.highest_phase_reached = r.highest_phase_reached.max(phase + 1);
        })
    }

    /// Count a completed attempt. Only updates an existing record, and never
    /// lets completions outnumber attempts.
    pub fn record_completion(&mut self, mission: u32) -> bool {
        let allowed = self
            .records
            .get(&mission)
            .is_some_and(|r| r.successful_completions < r.total_attempts);
        if !allowed {
            log::warn!("Ignoring completion for mission {} with no open attempt on record", mission);
            return false;
        }
        self.upsert(mission, "completion", |r| r.successful_completions += 1)
    }

    pub fn record(&self, mission: u32) -> Option<&ProgressRecord> {
        self.records.get(&mission)
    }

    pub fn report(&self, mission: u32) -> ProgressReport {
        match self.records.get(&mission) {
            None => ProgressReport::NotPlayed,
            Some(r) if r.total_attempts == 0 => ProgressReport::NotPlayed,
            Some(r) => ProgressReport::Played {
                attempts: r.total_attempts,
                completions: r.successful_completions,
                success_rate: r.success_rate(),
                highest_phase: r.highest_phase_reached,
            },
        }
    }

    /// Mission 1 is always open; each later mission opens once the previous
    /// one has been completed at least once.
    pub fn is_unlocked(&self, mission: u32) -> bool {
        match mission {
            0 => false,
            1 => true,
            m if m > MISSION_COUNT => false,
            m => self
                .records
                .get(&(m - 1))
                .is_some_and(|r| r.successful_completions > 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::persistence::MemoryBackend;
    use proptest::prelude::*;

    /// Backend whose saves always fail
    struct BrokenDisk;

    impl ProgressBackend for BrokenDisk {
        fn load(&self) -> Result<Vec<ProgressRecord>, StoreError> {
            Ok(Vec::new())
        }

        fn save(&mut self, _records: &[ProgressRecord]) -> Result<(), StoreError> {
            Err(std::io::Error::other("disk full").into())
        }
    }

    fn memory_store() -> ProgressStore {
        ProgressStore::open(Box::new(MemoryBackend::new()))
    }

    #[test]
    fn test_not_played_sentinel() {
        let store = memory_store();
        assert_eq!(store.report(3), ProgressReport::NotPlayed);
        assert_eq!(store.report(3).to_string(), "Not played yet");
    }

    #[test]
    fn test_row_without_attempts_is_not_played() {
        let mut store = memory_store();
        assert!(store.record_phase_reached(3, 4));
        assert_eq!(store.record(3).unwrap().highest_phase_reached, 5);
        assert_eq!(store.report(3), ProgressReport::NotPlayed);
    }

    #[test]
    fn test_completion_needs_an_attempt() {
        let mut store = memory_store();
        assert!(!store.record_completion(2));
        assert!(store.record(2).is_none());

        store.record_attempt_start(2);
        assert!(store.record_completion(2));
        // A second completion for the same single attempt is dropped
        assert!(!store.record_completion(2));
        let record = store.record(2).unwrap();
        assert_eq!((record.total_attempts, record.successful_completions), (1, 1));
    }

    #[test]
    fn test_attempts_count_exactly() {
        let mut store = memory_store();
        for _ in 0..7 {
            assert!(store.record_attempt_start(2));
        }
        assert_eq!(store.record(2).unwrap().total_attempts, 7);
        assert_eq!(store.record(2).unwrap().successful_completions, 0);
    }

    #[test]
    fn test_report_format() {
        let mut store = memory_store();
        store.record_attempt_start(1);
        store.record_attempt_start(1);
        store.record_attempt_start(1);
        store.record_completion(1);
        store.record_phase_reached(1, 14);
        assert_eq!(
            store.report(1).to_string(),
            "Attempts: 3 | Completions: 1 | Success rate: 33.3% | Highest phase: 15/15"
        );
    }

    #[test]
    fn test_failed_save_is_a_noop() {
        let mut store = ProgressStore::open(Box::new(BrokenDisk));
        assert!(!store.record_attempt_start(1));
        assert!(!store.record_phase_reached(1, 4));
        assert_eq!(store.report(1), ProgressReport::NotPlayed);
    }

    #[test]
    fn test_reopen_sees_saved_records() {
        let mut backend = MemoryBackend::new();
        let mut record = ProgressRecord::new(4);
        record.total_attempts = 2;
        record.highest_phase_reached = 6;
        backend.save(&[record]).unwrap();

        let store = ProgressStore::open(Box::new(backend));
        assert_eq!(store.record(4).unwrap().highest_phase_reached, 6);
    }

    #[test]
    fn test_unlocks_follow_completions() {
        let mut store = memory_store();
        assert!(store.is_unlocked(1));
        assert!(!store.is_unlocked(2));
        assert!(!store.is_unlocked(0));

        store.record_attempt_start(1);
        assert!(!store.is_unlocked(2));
        store.record_completion(1);
        assert!(store.is_unlocked(2));
        assert!(!store.is_unlocked(3));
        assert!(!store.is_unlocked(MISSION_COUNT + 1));
    }

    proptest! {
        #[test]
        fn prop_attempts_never_below_completions(ops in proptest::collection::vec(0u8..3, 1..60)) {
            let mut store = memory_store();
            for op in ops {
                match op {
                    0 => { store.record_attempt_start(1); }
                    1 => { store.record_completion(1); }
                    _ => { store.record_phase_reached(1, 3); }
                }
                if let Some(r) = store.record(1) {
                    prop_assert!(r.total_attempts >= r.successful_completions);
                }
            }
        }

        #[test]
        fn prop_highest_phase_is_running_max(phases in proptest::collection::vec(0u32..15, 1..40)) {
            let mut store = memory_store();
            let mut previous = 0;
            for &phase in &phases {
                store.record_phase_reached(5, phase);
                let highest = store.record(5).unwrap().highest_phase_reached;
                prop_assert!(highest >= previous);
                previous = highest;
            }
            prop_assert_eq!(previous, phases.iter().max().unwrap() + 1);
        }
    }
}
