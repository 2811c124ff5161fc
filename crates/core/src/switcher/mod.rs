use crate::{
    camera::{CameraService, CameraStream},
    config::AppConfig,
    fields::{self, FieldRegistry, TextUpdate},
    hotkey::{Action, Dispatch, HotkeyMap, KeyPress},
    overlay::OverlayState,
    render::{RenderSurface, Surface, SurfaceUpdate},
    scene::{SceneStore, Snapshot},
    storage::{JsonFileStorage, MemoryStorage, Storage, SAMPLE_LOADED_KEY, THEME_KEY},
    timeline::SwitchClock,
    video::VideoState,
    OverlayVariant, Scope, Theme, VideoSource,
};

/// Single owner of all switcher state: staged and live selections, field
/// values, scene slots and the console peripherals.
///
/// Every operation runs to completion on the caller's thread and pushes the
/// resulting [`SurfaceUpdate`]s to the surface. The only deferred work is the
/// live overlay swap, which fires from [`Switcher::advance`].
pub struct Switcher<S: Surface = RenderSurface> {
    config: AppConfig,
    fields: FieldRegistry,
    overlay: OverlayState,
    video: VideoState,
    scenes: SceneStore,
    hotkeys: HotkeyMap,
    clock: SwitchClock,
    theme: Theme,
    storage: Box<dyn Storage>,
    camera: Box<dyn CameraService>,
    stream: Option<CameraStream>,
    surface: S,
}

impl<S: Surface> Switcher<S> {
    pub fn new(
        config: AppConfig,
        storage: Box<dyn Storage>,
        camera: Box<dyn CameraService>,
        surface: S,
    ) -> Self {
        let scenes = SceneStore::load(
            storage.as_ref(),
            config.default_overlay,
            config.default_video,
        );
        let mut switcher = Self {
            fields: FieldRegistry::broadcast_layout(),
            overlay: OverlayState::new(config.default_overlay, config.cue),
            video: VideoState::new(config.default_video),
            scenes,
            hotkeys: HotkeyMap::broadcast_defaults(),
            clock: SwitchClock::new(),
            theme: Theme::default(),
            storage,
            camera,
            stream: None,
            surface,
            config,
        };
        switcher.initialise();
        switcher
    }

    /// Builds a switcher from `config`, opening file storage when a path is
    /// configured. Unusable storage degrades to an in-memory record.
    pub fn from_config(config: AppConfig, camera: Box<dyn CameraService>, surface: S) -> Self {
        let storage: Box<dyn Storage> = match &config.storage_path {
            Some(path) => match JsonFileStorage::open(path) {
                Ok(storage) => Box::new(storage),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "persistence unavailable, continuing in memory");
                    Box::new(MemoryStorage::new())
                }
            },
            None => Box::new(MemoryStorage::new()),
        };
        Self::new(config, storage, camera, surface)
    }

    fn initialise(&mut self) {
        let mut updates: Vec<_> = texts(self.fields.render_all()).collect();
        let initial = self.config.default_overlay;
        updates.extend(self.overlay.select_preview(initial));
        updates.extend(self.overlay.commit_live(initial, false, self.clock.now_ms(), false));
        let video = self.config.default_video;
        updates.push(self.video.select_preview(video));
        updates.push(self.video.commit_live(video));
        self.surface.apply_updates(&updates);

        let theme = match self.storage.get(THEME_KEY) {
            Ok(stored) => stored.map(|value| Theme::from_stored(&value)).unwrap_or_default(),
            Err(err) => {
                tracing::warn!(error = %err, "theme not readable, using dark");
                Theme::default()
            }
        };
        self.apply_theme(theme);

        if self.config.seed_sample_data {
            self.seed_sample_once();
        }
    }

    fn seed_sample_once(&mut self) {
        match self.storage.get(SAMPLE_LOADED_KEY) {
            Ok(Some(_)) => {}
            Ok(None) => {
                self.load_sample_data();
                if let Err(err) = self.storage.set(SAMPLE_LOADED_KEY, "1") {
                    tracing::warn!(error = %err, "sample-data flag not persisted");
                }
            }
            Err(err) => tracing::warn!(error = %err, "skipping sample data, storage unreadable"),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    pub fn overlay(&self) -> &OverlayState {
        &self.overlay
    }

    pub fn video(&self) -> &VideoState {
        &self.video
    }

    pub fn scenes(&self) -> &SceneStore {
        &self.scenes
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn camera_stream(&self) -> Option<&CameraStream> {
        self.stream.as_ref()
    }

    pub fn staged_snapshot(&self) -> Snapshot {
        Snapshot {
            overlay: self.overlay.preview(),
            video: self.video.preview(),
            fields: self.fields.capture_staged(),
        }
    }

    pub fn live_snapshot(&self) -> Snapshot {
        Snapshot {
            overlay: self.overlay.live(),
            video: self.video.live(),
            fields: self.fields.capture_live(),
        }
    }

    /// Operator edit of a staged field.
    pub fn set_field(&mut self, key: &str, value: &str) {
        let updates: Vec<_> = texts(self.fields.set_staged(key, value)).collect();
        self.surface.apply_updates(&updates);
    }

    pub fn select_overlay(&mut self, variant: OverlayVariant) {
        let updates = self.overlay.select_preview(variant);
        self.surface.apply_updates(&updates);
    }

    pub fn cycle_overlay(&mut self) {
        let updates = self.overlay.cycle();
        self.surface.apply_updates(&updates);
    }

    pub fn select_video(&mut self, source: VideoSource) {
        let update = self.video.select_preview(source);
        self.surface.apply(&update);
    }

    pub fn cycle_video(&mut self) {
        let update = self.video.cycle();
        self.surface.apply(&update);
    }

    /// Captures the staged snapshot into the 0-based slot and persists it.
    pub fn save_scene(&mut self, index: usize) -> bool {
        let snapshot = self.staged_snapshot();
        let saved = self.scenes.save(index, snapshot, self.storage.as_mut());
        if saved {
            tracing::info!(slot = index + 1, "scene saved");
        }
        saved
    }

    /// Pushes a slot back into preview. Live output is never touched, and a
    /// slot without fields leaves the staged fields as they are.
    pub fn recall_scene(&mut self, index: usize) -> bool {
        let Some(snapshot) = self.scenes.slot(index).map(|slot| slot.snapshot()) else {
            tracing::debug!(index, "ignoring recall of missing scene slot");
            return false;
        };
        let mut updates = self.overlay.select_preview(snapshot.overlay);
        updates.push(self.video.select_preview(snapshot.video));
        if !snapshot.fields.is_empty() {
            updates.extend(texts(self.fields.apply_to_staged(&snapshot.fields)));
        }
        self.surface.apply_updates(&updates);
        tracing::info!(slot = index + 1, overlay = %snapshot.overlay, "scene recalled");
        true
    }

    pub fn rename_scene(&mut self, index: usize, name: &str) -> bool {
        self.scenes.rename(index, name, self.storage.as_mut())
    }

    /// Publishes the whole staged snapshot to the live output.
    ///
    /// Fields land first, then the video source, then the overlay commit
    /// whose cue hides the feed cut.
    pub fn take_live(&mut self) {
        let staged = self.fields.capture_staged();
        let mut updates = Vec::new();
        for (key, value) in &staged {
            updates.extend(texts(self.fields.set_live(key, value)));
        }
        updates.push(self.video.commit_live(self.video.preview()));
        let cue_layer = self.surface.has_cue_layer();
        updates.extend(self.overlay.commit_live(
            self.overlay.preview(),
            true,
            self.clock.now_ms(),
            cue_layer,
        ));
        self.surface.apply_updates(&updates);
        tracing::info!(
            overlay = %self.overlay.live(),
            video = %self.video.live(),
            "took staged state live"
        );
    }

    /// Moves the clock forward and fires due cue events.
    pub fn advance(&mut self, delta_ms: u64) {
        let now = self.clock.advance(delta_ms);
        let updates = self.overlay.advance(now);
        self.surface.apply_updates(&updates);
    }

    pub fn toggle_theme(&mut self) {
        self.apply_theme(self.theme.toggled());
    }

    /// Writes the sample broadcast data to both outputs.
    pub fn load_sample_data(&mut self) {
        let mut updates = Vec::new();
        for (key, value) in fields::sample_values() {
            updates.extend(texts(self.fields.set_staged(&key, &value)));
            updates.extend(texts(self.fields.set_live(&key, &value)));
        }
        self.surface.apply_updates(&updates);
        tracing::info!("sample data loaded");
    }

    /// Replaces any running camera stream with a freshly acquired one on
    /// both outputs. Failure becomes an operator notice.
    pub fn start_camera(&mut self) {
        self.release_camera();
        match self.camera.acquire() {
            Ok(stream) => {
                let updates: Vec<_> = Scope::ALL
                    .into_iter()
                    .map(|scope| SurfaceUpdate::CameraAttached {
                        scope,
                        stream: stream.id.clone(),
                    })
                    .collect();
                self.surface.apply_updates(&updates);
                tracing::info!(stream = %stream.id, "camera started");
                self.stream = Some(stream);
            }
            Err(err) => {
                tracing::warn!(error = %err, "camera unavailable");
                self.surface.apply(&SurfaceUpdate::Notice(err.to_string()));
            }
        }
    }

    /// Releases peripherals before the console goes away.
    pub fn shutdown(&mut self) {
        self.release_camera();
    }

    pub fn handle_key(&mut self, press: &KeyPress) -> Dispatch {
        let dispatch = self.hotkeys.resolve(press);
        match dispatch {
            Dispatch::Handled(action) => self.dispatch(action),
            Dispatch::Suppressed(reason) => {
                tracing::debug!(?press, ?reason, "hotkey suppressed")
            }
            Dispatch::Ignored => {}
        }
        dispatch
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::TakeLive => self.take_live(),
            Action::RecallScene(index) => {
                self.recall_scene(index);
            }
            Action::SaveScene(index) => {
                self.save_scene(index);
            }
            Action::CycleOverlay => self.cycle_overlay(),
            Action::CycleVideo => self.cycle_video(),
            Action::ToggleTheme => self.toggle_theme(),
            Action::LoadSampleData => self.load_sample_data(),
            Action::StartCamera => self.start_camera(),
        }
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.surface.apply(&SurfaceUpdate::Theme(theme));
        if let Err(err) = self.storage.set(THEME_KEY, theme.as_str()) {
            tracing::warn!(error = %err, "theme not persisted");
        }
    }

    fn release_camera(&mut self) {
        if let Some(stream) = self.stream.take() {
            self.camera.release(&stream);
            self.surface.apply(&SurfaceUpdate::CameraDetached);
        }
    }
}

fn texts(updates: Vec<TextUpdate>) -> impl Iterator<Item = SurfaceUpdate> {
    updates.into_iter().map(SurfaceUpdate::Text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraError;

    /// Surface that keeps every update in arrival order.
    #[derive(Default)]
    struct LogSurface {
        log: Vec<SurfaceUpdate>,
    }

    impl Surface for LogSurface {
        fn apply(&mut self, update: &SurfaceUpdate) {
            self.log.push(update.clone());
        }
    }

    #[derive(Default)]
    struct FakeCamera {
        acquired: u32,
    }

    impl CameraService for FakeCamera {
        fn acquire(&mut self) -> Result<CameraStream, CameraError> {
            self.acquired += 1;
            Ok(CameraStream {
                id: format!("cam-{}", self.acquired),
            })
        }

        fn release(&mut self, _stream: &CameraStream) {}
    }

    struct DeniedCamera;

    impl CameraService for DeniedCamera {
        fn acquire(&mut self) -> Result<CameraStream, CameraError> {
            Err(CameraError::Denied)
        }

        fn release(&mut self, _stream: &CameraStream) {}
    }

    fn quiet_config() -> AppConfig {
        AppConfig {
            seed_sample_data: false,
            ..AppConfig::default()
        }
    }

    fn log_switcher() -> Switcher<LogSurface> {
        Switcher::new(
            quiet_config(),
            Box::new(MemoryStorage::new()),
            Box::new(crate::NoCamera),
            LogSurface::default(),
        )
    }

    fn position(log: &[SurfaceUpdate], wanted: impl Fn(&SurfaceUpdate) -> bool) -> usize {
        log.iter().position(wanted).expect("update should be present")
    }

    #[test]
    fn take_live_lands_fields_then_video_then_cue() {
        let mut switcher = log_switcher();
        switcher.set_field("topic", "Pin positions");
        switcher.select_video(VideoSource::Aerial);
        switcher.select_overlay(OverlayVariant::Desk);
        switcher.surface_mut().log.clear();

        switcher.take_live();

        let log = &switcher.surface().log;
        let last_text = log
            .iter()
            .rposition(|u| matches!(u, SurfaceUpdate::Text(t) if t.scope == Scope::Live))
            .expect("live text updates");
        let video = position(log, |u| {
            matches!(u, SurfaceUpdate::Video { scope: Scope::Live, .. })
        });
        let cue = position(log, |u| matches!(u, SurfaceUpdate::CueStarted { .. }));
        assert!(last_text < video);
        assert!(video < cue);
        assert!(!log
            .iter()
            .any(|u| matches!(u, SurfaceUpdate::Overlay { scope: Scope::Live, .. })));

        switcher.advance(switcher.config().cue.swap_delay_ms);
        assert_eq!(
            switcher.surface().log.last(),
            Some(&SurfaceUpdate::Overlay {
                scope: Scope::Live,
                variant: OverlayVariant::Desk
            })
        );
    }

    #[test]
    fn operator_edits_never_reach_live() {
        let mut switcher = log_switcher();
        switcher.surface_mut().log.clear();
        switcher.set_field("player1", "Nick Brown");
        switcher.cycle_overlay();
        switcher.cycle_video();

        assert!(switcher.surface().log.iter().all(|update| match update {
            SurfaceUpdate::Text(text) => text.scope == Scope::Preview,
            SurfaceUpdate::Overlay { scope, .. } | SurfaceUpdate::Video { scope, .. } => {
                *scope == Scope::Preview
            }
            _ => true,
        }));
        assert_eq!(switcher.fields().live("player1"), None);
    }

    #[test]
    fn recall_never_touches_live() {
        let mut switcher = log_switcher();
        switcher.select_overlay(OverlayVariant::ComingUp);
        switcher.save_scene(3);
        switcher.select_overlay(OverlayVariant::LowerThird);
        switcher.take_live();
        let live = switcher.live_snapshot();

        assert!(switcher.recall_scene(3));
        assert_eq!(switcher.overlay().preview(), OverlayVariant::ComingUp);
        assert_eq!(switcher.live_snapshot(), live);
        assert!(!switcher.recall_scene(4));
    }

    #[test]
    fn camera_restart_releases_previous_stream() {
        let mut switcher = Switcher::new(
            quiet_config(),
            Box::new(MemoryStorage::new()),
            Box::new(FakeCamera::default()),
            RenderSurface::new(),
        );
        switcher.start_camera();
        switcher.start_camera();

        assert_eq!(switcher.camera_stream().map(|s| s.id.as_str()), Some("cam-2"));
        assert_eq!(switcher.surface().camera_stream(Scope::Preview), Some("cam-2"));
        assert_eq!(switcher.surface().camera_stream(Scope::Live), Some("cam-2"));

        switcher.shutdown();
        assert!(switcher.camera_stream().is_none());
        assert_eq!(switcher.surface().camera_stream(Scope::Live), None);
    }

    #[test]
    fn camera_failure_becomes_notice() {
        let mut switcher = Switcher::new(
            quiet_config(),
            Box::new(MemoryStorage::new()),
            Box::new(DeniedCamera),
            RenderSurface::new(),
        );
        let before = switcher.staged_snapshot();
        switcher.start_camera();

        assert_eq!(switcher.surface().notices().len(), 1);
        assert!(switcher.surface().notices()[0].contains("permissions"));
        assert_eq!(switcher.staged_snapshot(), before);
    }

    #[test]
    fn sample_data_fills_both_outputs() {
        let switcher: Switcher = Switcher::new(
            AppConfig::default(),
            Box::new(MemoryStorage::new()),
            Box::new(crate::NoCamera),
            RenderSurface::new(),
        );
        assert_eq!(switcher.fields().staged("player1"), Some("Nick Brown"));
        assert_eq!(switcher.fields().live("player1"), Some("Nick Brown"));
        assert_eq!(
            switcher.surface().text("live.score-bug.player1Score"),
            Some("-3 thru 8")
        );
    }

    #[test]
    fn dispatch_routes_save_and_theme() {
        let mut switcher = log_switcher();
        switcher.set_field("round", "Day 2");
        switcher.dispatch(Action::SaveScene(0));
        switcher.dispatch(Action::ToggleTheme);

        assert_eq!(switcher.scenes().slot(0).unwrap().fields["round"], "Day 2");
        assert_eq!(switcher.theme(), Theme::Light);
    }
}
