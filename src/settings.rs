//! Game settings and preferences
//!
//! Persisted as a JSON file next to the progress store. Any field missing
//! from the file keeps its default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::StoreError;
use crate::sim::Arena;

/// Default base seed for obstacle drift
pub const DEFAULT_SEED: u64 = 0x5EED_F15E;

/// Which eye is being trained (the lazy one)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EyeSide {
    #[default]
    Left,
    Right,
}

impl EyeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            EyeSide::Left => "left",
            EyeSide::Right => "right",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "left" | "l" => Some(EyeSide::Left),
            "right" | "r" => Some(EyeSide::Right),
            _ => None,
        }
    }
}

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const RED: Rgb = Rgb(200, 0, 0);
    pub const BLUE: Rgb = Rgb(0, 100, 255);

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Arena ===
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Obstacles are dropped this far outside the viewport
    pub despawn_margin: f32,

    // === Simulation ===
    /// Base RNG seed; each attempt derives its own stream
    pub seed: u64,

    // === Storage ===
    pub progress_path: PathBuf,

    // === Anaglyph ===
    pub eye_side: EyeSide,
    pub player_color: Rgb,
    pub obstacle_color: Rgb,
}

impl Default for Settings {
    fn default() -> Self {
        let (player_color, obstacle_color) = Self::palette_for(EyeSide::default());
        Self {
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            despawn_margin: DESPAWN_MARGIN,

            seed: DEFAULT_SEED,

            progress_path: PathBuf::from("progress.json"),

            eye_side: EyeSide::default(),
            player_color,
            obstacle_color,
        }
    }
}

impl Settings {
    /// (player, obstacle) colours for a trained eye.
    ///
    /// The player fish is drawn in the colour only the lazy eye can see.
    pub fn palette_for(eye: EyeSide) -> (Rgb, Rgb) {
        match eye {
            EyeSide::Right => (Rgb::RED, Rgb::BLUE),
            EyeSide::Left => (Rgb::BLUE, Rgb::RED),
        }
    }

    /// Switch the trained eye and swap the palette to match
    pub fn set_eye_side(&mut self, eye: EyeSide) {
        self.eye_side = eye;
        let (player, obstacle) = Self::palette_for(eye);
        self.player_color = player;
        self.obstacle_color = obstacle;
    }

    /// Play area used by the motion model
    pub fn arena(&self) -> Arena {
        Arena {
            width: self.viewport_width,
            height: self.viewport_height,
            despawn_margin: self.despawn_margin,
        }
    }

    /// Load settings from `path`, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(err) => {
                    log::warn!("Ignoring corrupt settings file {}: {}", path.display(), err);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings to `path`
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_follows_eye() {
        let mut settings = Settings::default();
        assert_eq!(settings.player_color, Rgb::BLUE);
        assert_eq!(settings.obstacle_color, Rgb::RED);

        settings.set_eye_side(EyeSide::Right);
        assert_eq!(settings.player_color, Rgb::RED);
        assert_eq!(settings.obstacle_color, Rgb::BLUE);
        assert_eq!(settings.player_color.to_hex(), "#c80000");
    }

    #[test]
    fn test_missing_fields_keep_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"eye_side": "right", "seed": 9}"#).unwrap();
        assert_eq!(settings.eye_side, EyeSide::Right);
        assert_eq!(settings.seed, 9);
        assert_eq!(settings.viewport_width, VIEWPORT_WIDTH);
        assert_eq!(settings.arena(), Arena::default());
    }

    #[test]
    fn test_older_files_with_tick_length_still_load() {
        // Tick length is fixed by the simulation, not configurable
        let settings: Settings = serde_json::from_str(r#"{"tick_ms": 33, "seed": 5}"#).unwrap();
        assert_eq!(settings.seed, 5);
        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("tick_ms"));
    }

    #[test]
    fn test_load_falls_back_on_corrupt_file() {
        let dir = std::env::temp_dir().join(format!("aquavision-settings-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");

        fs::write(&path, "not json at all").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());

        let mut custom = Settings::default();
        custom.set_eye_side(EyeSide::Right);
        custom.seed = 42;
        custom.save(&path).unwrap();
        assert_eq!(Settings::load(&path), custom);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_save_failure_is_not_blamed_on_progress() {
        let dir = std::env::temp_dir().join(format!("aquavision-settings-dir-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        // Writing to a directory path fails
        let err = Settings::default().save(&dir).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(err.to_string().starts_with("storage I/O failed"));
        assert!(!err.to_string().contains("progress"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_eye_side_parsing() {
        assert_eq!(EyeSide::from_str("RIGHT"), Some(EyeSide::Right));
        assert_eq!(EyeSide::from_str("l"), Some(EyeSide::Left));
        assert_eq!(EyeSide::from_str("both"), None);
        assert_eq!(EyeSide::Right.as_str(), "right");
    }
}
