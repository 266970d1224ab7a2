use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::engine::PlayMode;

/// Range allowed for the lookahead beat count.
pub const BEATS_AHEAD_MIN: u32 = 1;
pub const BEATS_AHEAD_MAX: u32 = 16;

/// User settings for the accessibility layer.
///
/// The engine only reads these; persistence is driven by the host's
/// settings UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessSettings {
    /// Play mode restored at startup; `None` plays the game unmodified.
    pub play_mode: Option<PlayMode>,
    /// Lookahead beat count: how far ahead pattern preview cues fire, and
    /// the listen-repeat group size.
    pub beats_ahead: u32,
}

impl Default for AccessSettings {
    fn default() -> Self {
        Self {
            play_mode: None,
            beats_ahead: 4,
        }
    }
}

impl AccessSettings {
    /// Load settings from disk, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from_file().unwrap_or_default().clamped()
    }

    fn load_from_file() -> Result<Self> {
        let path = Self::settings_path()?;
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save settings to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::settings_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn settings_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = ProjectDirs::from("com", "tapcue", "tapcue") {
            Ok(proj_dirs.config_dir().join("settings.json"))
        } else {
            Ok(PathBuf::from(".tapcue-settings.json"))
        }
    }

    /// Well-known location of the user-supplied cue clip.
    pub fn cue_file_path() -> PathBuf {
        if let Some(proj_dirs) = ProjectDirs::from("com", "tapcue", "tapcue") {
            proj_dirs.data_dir().join("audio").join("tap_cue.wav")
        } else {
            PathBuf::from("tap_cue.wav")
        }
    }

    /// Clamp out-of-range values from hand-edited settings files.
    pub fn clamped(mut self) -> Self {
        self.beats_ahead = self.beats_ahead.clamp(BEATS_AHEAD_MIN, BEATS_AHEAD_MAX);
        self
    }
}
