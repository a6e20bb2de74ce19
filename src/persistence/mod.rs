//! Durable storage for mission progress
//!
//! Features:
//! - Versioned JSON envelope
//! - Atomic replace (tmp → save) with the old save copied to a backup
//! - Recovery from the backup when the save itself is missing
//! - In-memory backend for tests and throwaway sessions

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::progress::ProgressRecord;

/// Current on-disk format version
pub const FORMAT_VERSION: u32 = 1;

/// Where the progress table lives
pub trait ProgressBackend {
    /// Read every stored record. An absent store is an empty table.
    fn load(&self) -> Result<Vec<ProgressRecord>, StoreError>;

    /// Replace the stored table with `records`
    fn save(&mut self, records: &[ProgressRecord]) -> Result<(), StoreError>;
}

/// On-disk document
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    saved_at: DateTime<Utc>,
    missions: Vec<ProgressRecord>,
}

/// JSON file with atomic replace and one backup generation
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, extension: &str) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".");
        name.push(extension);
        PathBuf::from(name)
    }

    /// Path of the previous generation
    pub fn backup_path(&self) -> PathBuf {
        self.sibling("bak")
    }

    fn temp_path(&self) -> PathBuf {
        self.sibling("tmp")
    }
}

impl ProgressBackend for JsonFileBackend {
    fn load(&self) -> Result<Vec<ProgressRecord>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let backup = self.backup_path();
                match fs::read_to_string(&backup) {
                    Ok(contents) => {
                        log::warn!(
                            "Progress file {} missing, recovering from {}",
                            self.path.display(),
                            backup.display()
                        );
                        contents
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                        log::info!("No progress file at {}, starting fresh", self.path.display());
                        return Ok(Vec::new());
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            Err(err) => return Err(err.into()),
        };

        let envelope: Envelope = serde_json::from_str(&contents)?;
        if envelope.version > FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: envelope.version,
                supported: FORMAT_VERSION,
            });
        }
        log::debug!(
            "Loaded {} mission records saved at {}",
            envelope.missions.len(),
            envelope.saved_at
        );
        Ok(envelope.missions)
    }

    fn save(&mut self, records: &[ProgressRecord]) -> Result<(), StoreError> {
        let envelope = Envelope {
            version: FORMAT_VERSION,
            saved_at: Utc::now(),
            missions: records.to_vec(),
        };
        let json = serde_json::to_string_pretty(&envelope)?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let tmp = self.temp_path();
        fs::write(&tmp, json)?;
        // The primary file stays in place until the rename replaces it
        if self.path.exists() {
            fs::copy(&self.path, self.backup_path())?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Volatile backend; nothing survives the process
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    records: Vec<ProgressRecord>,
    /// Successful saves so far
    pub saves: usize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing table
    pub fn with_records(records: Vec<ProgressRecord>) -> Self {
        Self { records, saves: 0 }
    }
}

impl ProgressBackend for MemoryBackend {
    fn load(&self) -> Result<Vec<ProgressRecord>, StoreError> {
        Ok(self.records.clone())
    }

    fn save(&mut self, records: &[ProgressRecord]) -> Result<(), StoreError> {
        self.records = records.to_vec();
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("aquavision-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn record(mission: u32, attempts: u32) -> ProgressRecord {
        let mut record = ProgressRecord::new(mission);
        record.total_attempts = attempts;
        record
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = scratch_dir("missing");
        let backend = JsonFileBackend::new(dir.join("progress.json"));
        assert!(backend.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load_with_backup_rotation() {
        let dir = scratch_dir("rotate");
        let mut backend = JsonFileBackend::new(dir.join("progress.json"));

        backend.save(&[record(1, 1)]).unwrap();
        assert!(!backend.backup_path().exists());

        backend.save(&[record(1, 2), record(2, 1)]).unwrap();
        assert!(backend.backup_path().exists());
        assert!(!dir.join("progress.json.tmp").exists());

        let loaded = backend.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].total_attempts, 2);

        // Previous generation is still readable
        let previous = JsonFileBackend::new(backend.backup_path()).load().unwrap();
        assert_eq!(previous.len(), 1);
        assert_eq!(previous[0].total_attempts, 1);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_interrupted_save_recovers_from_backup() {
        let dir = scratch_dir("interrupted");
        let mut backend = JsonFileBackend::new(dir.join("progress.json"));
        let mut best = record(1, 4);
        best.highest_phase_reached = 9;
        backend.save(&[best]).unwrap();
        backend.save(&[record(1, 5)]).unwrap();

        // Primary lost between writes: only the previous generation and a temp file remain
        fs::remove_file(backend.path()).unwrap();
        fs::write(dir.join("progress.json.tmp"), "{ half written").unwrap();

        let loaded = backend.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].total_attempts, 4);
        assert_eq!(loaded[0].highest_phase_reached, 9);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_newer_version_rejected() {
        let dir = scratch_dir("version");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("progress.json");
        fs::write(
            &path,
            r#"{"version": 99, "saved_at": "2024-01-01T00:00:00Z", "missions": []}"#,
        )
        .unwrap();
        let err = JsonFileBackend::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedVersion { found: 99, .. }));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = scratch_dir("corrupt");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("progress.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JsonFileBackend::new(&path).load(),
            Err(StoreError::Serialize(_))
        ));
        let _ = fs::remove_dir_all(&dir);
    }
}
