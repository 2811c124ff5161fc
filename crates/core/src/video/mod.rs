use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{render::SurfaceUpdate, Scope, SwitcherError};

/// Named video feed behind the overlays.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum VideoSource {
    #[default]
    Camera,
    Replay,
    Aerial,
    Slate,
}

impl VideoSource {
    pub const ALL: [VideoSource; 4] = [
        VideoSource::Camera,
        VideoSource::Replay,
        VideoSource::Aerial,
        VideoSource::Slate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VideoSource::Camera => "camera",
            VideoSource::Replay => "replay",
            VideoSource::Aerial => "aerial",
            VideoSource::Slate => "slate",
        }
    }

    pub fn next(self) -> Self {
        let index = Self::ALL
            .iter()
            .position(|source| *source == self)
            .unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoSource {
    type Err = SwitcherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == wanted)
            .ok_or_else(|| SwitcherError::UnknownVideoSource(wanted.to_string()))
    }
}

/// Selected video source for both outputs. Live changes carry no cue of
/// their own; they ride along with the overlay cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoState {
    preview: VideoSource,
    live: VideoSource,
}

impl VideoState {
    pub fn new(initial: VideoSource) -> Self {
        Self {
            preview: initial,
            live: initial,
        }
    }

    pub fn preview(&self) -> VideoSource {
        self.preview
    }

    pub fn live(&self) -> VideoSource {
        self.live
    }

    pub fn select_preview(&mut self, source: VideoSource) -> SurfaceUpdate {
        self.preview = source;
        tracing::debug!(video = %source, "preview video selected");
        SurfaceUpdate::Video {
            scope: Scope::Preview,
            source,
        }
    }

    pub fn commit_live(&mut self, source: VideoSource) -> SurfaceUpdate {
        self.live = source;
        SurfaceUpdate::Video {
            scope: Scope::Live,
            source,
        }
    }

    pub fn cycle(&mut self) -> SurfaceUpdate {
        self.select_preview(self.preview.next())
    }
}
