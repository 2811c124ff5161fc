use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    config::CueConfig, render::SurfaceUpdate, timeline::Scheduler, Scope, SwitcherError,
};

/// Broadcast graphic shown over the video feed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum OverlayVariant {
    #[default]
    LowerThird,
    ScoreBug,
    MatchupBar,
    Desk,
    ComingUp,
    /// Clean feed, no graphic.
    None,
}

impl OverlayVariant {
    /// Enumeration order, used for cycling.
    pub const ALL: [OverlayVariant; 6] = [
        OverlayVariant::LowerThird,
        OverlayVariant::ScoreBug,
        OverlayVariant::MatchupBar,
        OverlayVariant::Desk,
        OverlayVariant::ComingUp,
        OverlayVariant::None,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OverlayVariant::LowerThird => "lower-third",
            OverlayVariant::ScoreBug => "score-bug",
            OverlayVariant::MatchupBar => "matchup-bar",
            OverlayVariant::Desk => "desk",
            OverlayVariant::ComingUp => "coming-up",
            OverlayVariant::None => "none",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            OverlayVariant::LowerThird => {
                "Lower third: use for intros, interviews, and feature segments."
            }
            OverlayVariant::ScoreBug => {
                "Score bug: use in the corner during live play for match score & status."
            }
            OverlayVariant::MatchupBar => {
                "Matchup bar: use over tee shots or B-roll when introducing a head-to-head match."
            }
            OverlayVariant::Desk => {
                "Desk panel: use when hosts are on camera at the desk, introducing topics or breaking down the round."
            }
            OverlayVariant::ComingUp => {
                "Coming up slate: use over B-roll or wide shots when teasing the next few segments."
            }
            OverlayVariant::None => "No overlay: clean program feed.",
        }
    }

    pub fn is_none(self) -> bool {
        self == OverlayVariant::None
    }

    /// Next variant in enumeration order, wrapping around.
    pub fn next(self) -> Self {
        let index = Self::ALL
            .iter()
            .position(|variant| *variant == self)
            .unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for OverlayVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverlayVariant {
    type Err = SwitcherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|variant| variant.as_str() == wanted)
            .ok_or_else(|| SwitcherError::UnknownOverlay(wanted.to_string()))
    }
}

/// Phase of the program-output transition cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CuePhase {
    Idle,
    /// Cue is fading in; the overlay swap is still pending.
    Started { generation: u64 },
    /// Swap applied during the opaque window; cue is fading out.
    Swapped { generation: u64 },
}

/// One-shot timer events owned by the cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueEvent {
    Swap { generation: u64 },
    End { generation: u64 },
}

/// Overlay selection for both outputs plus the live transition cue.
#[derive(Debug)]
pub struct OverlayState {
    preview: OverlayVariant,
    /// Committed live target. May run ahead of `shown_live` while a cue is
    /// waiting for its opaque window.
    live: OverlayVariant,
    shown_live: OverlayVariant,
    phase: CuePhase,
    generation: u64,
    timing: CueConfig,
    timer: Scheduler<CueEvent>,
}

impl OverlayState {
    pub fn new(initial: OverlayVariant, timing: CueConfig) -> Self {
        Self {
            preview: initial,
            live: initial,
            shown_live: initial,
            phase: CuePhase::Idle,
            generation: 0,
            timing,
            timer: Scheduler::new(),
        }
    }

    pub fn preview(&self) -> OverlayVariant {
        self.preview
    }

    pub fn live(&self) -> OverlayVariant {
        self.live
    }

    /// Variant currently visible on the live output.
    pub fn shown_live(&self) -> OverlayVariant {
        self.shown_live
    }

    pub fn phase(&self) -> CuePhase {
        self.phase
    }

    pub fn timing(&self) -> CueConfig {
        self.timing
    }

    pub fn help_text(&self) -> &'static str {
        self.preview.help()
    }

    /// Immediate preview selection, no cue.
    pub fn select_preview(&mut self, variant: OverlayVariant) -> Vec<SurfaceUpdate> {
        self.preview = variant;
        tracing::debug!(overlay = %variant, "preview overlay selected");
        vec![
            SurfaceUpdate::Overlay {
                scope: Scope::Preview,
                variant,
            },
            SurfaceUpdate::HelpText(variant.help().to_string()),
        ]
    }

    pub fn cycle(&mut self) -> Vec<SurfaceUpdate> {
        self.select_preview(self.preview.next())
    }

    /// Commits `variant` to the live output.
    ///
    /// With `animate`, the cue restarts and the swap is deferred to
    /// `swap_delay_ms` after `now_ms`. A "none" commit has nothing to reveal
    /// and applies immediately, as does any commit when the surface has no
    /// cue layer.
    pub fn commit_live(
        &mut self,
        variant: OverlayVariant,
        animate: bool,
        now_ms: u64,
        cue_layer: bool,
    ) -> Vec<SurfaceUpdate> {
        self.live = variant;

        if !animate || !cue_layer || variant.is_none() {
            // A swap still queued from an earlier cue would overwrite this one.
            self.timer
                .cancel_where(|event| matches!(event, CueEvent::Swap { .. }));
            if let CuePhase::Started { generation } = self.phase {
                self.phase = CuePhase::Swapped { generation };
            }
            return vec![self.show_live()];
        }

        let mut updates = Vec::with_capacity(2);
        if self.phase != CuePhase::Idle {
            updates.push(SurfaceUpdate::CueCleared { scope: Scope::Live });
        }
        self.timer.cancel_where(|_| true);

        self.generation += 1;
        let generation = self.generation;
        self.phase = CuePhase::Started { generation };
        self.timer.schedule(
            now_ms.saturating_add(self.timing.swap_delay_ms),
            CueEvent::Swap { generation },
        );
        self.timer.schedule(
            now_ms.saturating_add(self.timing.total_ms()),
            CueEvent::End { generation },
        );
        updates.push(SurfaceUpdate::CueStarted { scope: Scope::Live });
        tracing::debug!(overlay = %variant, generation, "live cue started");
        updates
    }

    /// Fires cue events due at `now_ms`. Events from a superseded cue are
    /// dropped.
    pub fn advance(&mut self, now_ms: u64) -> Vec<SurfaceUpdate> {
        let mut updates = Vec::new();
        for event in self.timer.drain_due(now_ms) {
            match event {
                CueEvent::Swap { generation } if generation == self.generation => {
                    self.phase = CuePhase::Swapped { generation };
                    updates.push(self.show_live());
                }
                CueEvent::End { generation } if generation == self.generation => {
                    self.phase = CuePhase::Idle;
                    updates.push(SurfaceUpdate::CueCleared { scope: Scope::Live });
                }
                stale => tracing::debug!(?stale, "dropping superseded cue event"),
            }
        }
        updates
    }

    pub fn has_pending_cue(&self) -> bool {
        !self.timer.is_empty()
    }

    fn show_live(&mut self) -> SurfaceUpdate {
        self.shown_live = self.live;
        SurfaceUpdate::Overlay {
            scope: Scope::Live,
            variant: self.live,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> OverlayState {
        OverlayState::new(OverlayVariant::LowerThird, CueConfig::default())
    }

    #[test]
    fn parses_kebab_case_names() {
        assert_eq!(
            "matchup-bar".parse::<OverlayVariant>().unwrap(),
            OverlayVariant::MatchupBar
        );
        let err = "weather".parse::<OverlayVariant>().unwrap_err();
        assert!(format!("{err}").contains("weather"));
    }

    #[test]
    fn cycle_wraps_after_full_enumeration() {
        let mut overlay = state();
        let start = overlay.preview();
        for _ in 0..OverlayVariant::ALL.len() {
            overlay.cycle();
        }
        assert_eq!(overlay.preview(), start);
    }

    #[test]
    fn preview_selection_updates_help_text() {
        let mut overlay = state();
        let updates = overlay.select_preview(OverlayVariant::Desk);
        assert!(updates.contains(&SurfaceUpdate::HelpText(
            OverlayVariant::Desk.help().to_string()
        )));
        assert_eq!(overlay.live(), OverlayVariant::LowerThird);
    }

    #[test]
    fn animated_commit_defers_swap_into_opaque_window() {
        let mut overlay = state();
        let updates = overlay.commit_live(OverlayVariant::ScoreBug, true, 1_000, true);

        assert_eq!(updates, vec![SurfaceUpdate::CueStarted { scope: Scope::Live }]);
        assert_eq!(overlay.live(), OverlayVariant::ScoreBug);
        assert_eq!(overlay.shown_live(), OverlayVariant::LowerThird);

        assert!(overlay.advance(1_119).is_empty());
        let swap = overlay.advance(1_120);
        assert_eq!(
            swap,
            vec![SurfaceUpdate::Overlay {
                scope: Scope::Live,
                variant: OverlayVariant::ScoreBug
            }]
        );
        assert!(matches!(overlay.phase(), CuePhase::Swapped { .. }));

        let end = overlay.advance(1_360);
        assert_eq!(end, vec![SurfaceUpdate::CueCleared { scope: Scope::Live }]);
        assert_eq!(overlay.phase(), CuePhase::Idle);
    }

    #[test]
    fn restart_supersedes_queued_swap() {
        let mut overlay = state();
        overlay.commit_live(OverlayVariant::ScoreBug, true, 0, true);
        let restart = overlay.commit_live(OverlayVariant::Desk, true, 50, true);
        assert_eq!(
            restart,
            vec![
                SurfaceUpdate::CueCleared { scope: Scope::Live },
                SurfaceUpdate::CueStarted { scope: Scope::Live },
            ]
        );

        // The first cue's swap time passes without applying the stale variant.
        assert!(overlay.advance(120).is_empty());
        let swap = overlay.advance(170);
        assert_eq!(
            swap,
            vec![SurfaceUpdate::Overlay {
                scope: Scope::Live,
                variant: OverlayVariant::Desk
            }]
        );
        assert_eq!(overlay.shown_live(), OverlayVariant::Desk);
    }

    #[test]
    fn none_commit_applies_without_cue() {
        let mut overlay = state();
        let updates = overlay.commit_live(OverlayVariant::None, true, 0, true);
        assert_eq!(
            updates,
            vec![SurfaceUpdate::Overlay {
                scope: Scope::Live,
                variant: OverlayVariant::None
            }]
        );
        assert!(!overlay.has_pending_cue());
    }

    #[test]
    fn missing_cue_layer_swaps_immediately() {
        let mut overlay = state();
        let updates = overlay.commit_live(OverlayVariant::ComingUp, true, 0, false);
        assert_eq!(overlay.shown_live(), OverlayVariant::ComingUp);
        assert_eq!(updates.len(), 1);
    }
}
