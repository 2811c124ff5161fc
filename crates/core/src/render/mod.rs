use std::collections::{BTreeMap, BTreeSet};

use crate::{fields::TextUpdate, OverlayVariant, Scope, Theme, VideoSource};

/// Visible change the core asks the rendering surface to make. The core
/// addresses the surface by key and scope only, never by element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceUpdate {
    Text(TextUpdate),
    /// Make `variant` the only active overlay in `scope`.
    Overlay {
        scope: Scope,
        variant: OverlayVariant,
    },
    HelpText(String),
    Video {
        scope: Scope,
        source: VideoSource,
    },
    /// Restart the transition cue from its first frame.
    CueStarted {
        scope: Scope,
    },
    CueCleared {
        scope: Scope,
    },
    CameraAttached {
        scope: Scope,
        stream: String,
    },
    CameraDetached,
    Theme(Theme),
    /// Blocking notice for the operator.
    Notice(String),
}

/// Rendering backend abstraction.
pub trait Surface {
    fn apply(&mut self, update: &SurfaceUpdate);

    /// Whether the surface can play a transition cue. Without one, overlay
    /// commits swap immediately.
    fn has_cue_layer(&self) -> bool {
        true
    }

    fn apply_updates(&mut self, updates: &[SurfaceUpdate]) {
        for update in updates {
            self.apply(update);
        }
    }
}

/// In-memory surface that records what would be on screen.
#[derive(Debug, Clone)]
pub struct RenderSurface {
    texts: BTreeMap<String, String>,
    overlays: BTreeMap<Scope, BTreeSet<OverlayVariant>>,
    video: BTreeMap<Scope, VideoSource>,
    camera: BTreeMap<Scope, String>,
    help_text: Option<String>,
    cue_active: bool,
    cue_triggers: BTreeMap<Scope, u32>,
    theme: Theme,
    notices: Vec<String>,
    cue_layer: bool,
    help_panel: bool,
}

impl Default for RenderSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface {
    pub fn new() -> Self {
        Self {
            texts: BTreeMap::new(),
            overlays: BTreeMap::new(),
            video: BTreeMap::new(),
            camera: BTreeMap::new(),
            help_text: None,
            cue_active: false,
            cue_triggers: BTreeMap::new(),
            theme: Theme::default(),
            notices: Vec::new(),
            cue_layer: true,
            help_panel: true,
        }
    }

    /// Surface without a cue layer element.
    pub fn without_cue_layer(mut self) -> Self {
        self.cue_layer = false;
        self
    }

    /// Surface without the overlay help panel; help text updates are dropped.
    pub fn without_help_panel(mut self) -> Self {
        self.help_panel = false;
        self
    }

    pub fn text(&self, target: &str) -> Option<&str> {
        self.texts.get(target).map(String::as_str)
    }

    pub fn active_overlays(&self, scope: Scope) -> Vec<OverlayVariant> {
        self.overlays
            .get(&scope)
            .map(|active| active.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn video(&self, scope: Scope) -> Option<VideoSource> {
        self.video.get(&scope).copied()
    }

    pub fn camera_stream(&self, scope: Scope) -> Option<&str> {
        self.camera.get(&scope).map(String::as_str)
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help_text.as_deref()
    }

    pub fn cue_active(&self) -> bool {
        self.cue_active
    }

    pub fn cue_triggers(&self, scope: Scope) -> u32 {
        self.cue_triggers.get(&scope).copied().unwrap_or(0)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }
}

impl Surface for RenderSurface {
    fn apply(&mut self, update: &SurfaceUpdate) {
        match update {
            SurfaceUpdate::Text(text) => {
                self.texts.insert(text.target.clone(), text.text.clone());
            }
            SurfaceUpdate::Overlay { scope, variant } => {
                let active = self.overlays.entry(*scope).or_default();
                active.clear();
                if !variant.is_none() {
                    active.insert(*variant);
                }
            }
            SurfaceUpdate::HelpText(help) => {
                if self.help_panel {
                    self.help_text = Some(help.clone());
                }
            }
            SurfaceUpdate::Video { scope, source } => {
                self.video.insert(*scope, *source);
            }
            SurfaceUpdate::CueStarted { scope } => {
                if self.cue_layer {
                    self.cue_active = true;
                    *self.cue_triggers.entry(*scope).or_default() += 1;
                }
            }
            SurfaceUpdate::CueCleared { .. } => self.cue_active = false,
            SurfaceUpdate::CameraAttached { scope, stream } => {
                self.camera.insert(*scope, stream.clone());
            }
            SurfaceUpdate::CameraDetached => self.camera.clear(),
            SurfaceUpdate::Theme(theme) => self.theme = *theme,
            SurfaceUpdate::Notice(message) => self.notices.push(message.clone()),
        }
    }

    fn has_cue_layer(&self) -> bool {
        self.cue_layer
    }
}
