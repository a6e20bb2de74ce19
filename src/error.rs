//! Storage error types
//!
//! Returned by the progress backends and by `Settings::save`. `ProgressStore`
//! turns them into logged no-ops so a broken disk never interrupts a mission.

use std::fmt;
use std::io;

#[derive(Debug)]
pub enum StoreError {
    /// Reading, writing or renaming a file failed
    Io(io::Error),
    /// The document could not be encoded or decoded
    Serialize(serde_json::Error),
    /// The file was written by a newer build
    UnsupportedVersion {
        found: u32,
        supported: u32,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "storage I/O failed: {err}"),
            StoreError::Serialize(err) => write!(f, "stored document is malformed: {err}"),
            StoreError::UnsupportedVersion { found, supported } => write!(
                f,
                "file version {found} is newer than supported version {supported}"
            ),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(err) => Some(err),
            StoreError::Serialize(err) => Some(err),
            StoreError::UnsupportedVersion { .. } => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialize(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_problem() {
        let err = StoreError::UnsupportedVersion {
            found: 9,
            supported: 1,
        };
        assert_eq!(
            err.to_string(),
            "file version 9 is newer than supported version 1"
        );

        let io_err: StoreError = io::Error::new(io::ErrorKind::PermissionDenied, "locked").into();
        assert!(io_err.to_string().contains("locked"));
        assert!(std::error::Error::source(&io_err).is_some());
    }
}
