use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::output::file::{OVERVIEW_FILE, PERSPECTIVE_FILE};
use crate::playback::{PlaybackConfig, DEFAULT_STRIDE};

/// Persistent playback settings
///
/// Missing fields take their defaults, so a partial file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Records skipped per tick
    pub stride: u64,
    /// Milliseconds between ticks
    pub interval_ms: u64,
    /// Directory the documents are written to
    pub output_dir: PathBuf,
    pub overview_file: String,
    pub perspective_file: String,
    /// Label of the overview ground marker
    pub marker_name: String,
    /// GPS week of the recording, for SBET time-of-week stamps
    pub gps_week: u32,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            stride: DEFAULT_STRIDE,
            interval_ms: 1000,
            output_dir: PathBuf::from("."),
            overview_file: OVERVIEW_FILE.to_string(),
            perspective_file: PERSPECTIVE_FILE.to_string(),
            marker_name: "CFBCN".to_string(),
            gps_week: 0,
        }
    }
}

impl PlaybackSettings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("pos2kml").join("settings.json"))
    }

    /// Load settings from `path`, or the user config location when `None`
    ///
    /// A missing or unreadable file yields the defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(Self::config_path) {
            Some(path) => path,
            None => return Self::default(),
        };

        if !path.exists() {
            debug!("No settings at {}, using defaults", path.display());
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => {
                    debug!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    warn!("Ignoring malformed settings {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Could not read settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn overview_path(&self) -> PathBuf {
        self.output_dir.join(&self.overview_file)
    }

    pub fn perspective_path(&self) -> PathBuf {
        self.output_dir.join(&self.perspective_file)
    }

    /// Playback configuration starting at `start_index`
    pub fn playback_config(&self, start_index: Option<u64>) -> PlaybackConfig {
        PlaybackConfig {
            start_index,
            stride: self.stride.max(1),
            interval: Duration::from_millis(self.interval_ms),
        }
    }
}
