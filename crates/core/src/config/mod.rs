use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{OverlayVariant, Result, SwitcherError, VideoSource};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// File holding the persisted record. `None` keeps everything in memory.
    pub storage_path: Option<PathBuf>,
    pub default_overlay: OverlayVariant,
    pub default_video: VideoSource,
    /// Load the sample broadcast data on first start of an installation.
    pub seed_sample_data: bool,
    pub cue: CueConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_path: None,
            default_overlay: OverlayVariant::LowerThird,
            default_video: VideoSource::Camera,
            seed_sample_data: true,
            cue: CueConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.cue.validate()
    }
}

/// Timing of the program-output transition cue.
///
/// The cue fades in to fully opaque, holds, then fades out. The deferred
/// overlay swap fires `swap_delay_ms` after the cue starts and must land
/// inside the opaque window `[fade_in_ms, fade_in_ms + hold_ms]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CueConfig {
    pub fade_in_ms: u64,
    pub hold_ms: u64,
    pub fade_out_ms: u64,
    pub swap_delay_ms: u64,
}

impl Default for CueConfig {
    fn default() -> Self {
        Self {
            fade_in_ms: 100,
            hold_ms: 60,
            fade_out_ms: 200,
            swap_delay_ms: 120,
        }
    }
}

impl CueConfig {
    pub fn total_ms(&self) -> u64 {
        self.fade_in_ms + self.hold_ms + self.fade_out_ms
    }

    pub fn opaque_window(&self) -> (u64, u64) {
        (self.fade_in_ms, self.fade_in_ms + self.hold_ms)
    }

    pub fn validate(&self) -> Result<()> {
        let (start, end) = self.opaque_window();
        if self.swap_delay_ms < start || self.swap_delay_ms > end {
            return Err(SwitcherError::InvalidCue(format!(
                "swap delay {}ms falls outside the opaque window {start}..={end}ms",
                self.swap_delay_ms
            )));
        }
        Ok(())
    }
}
