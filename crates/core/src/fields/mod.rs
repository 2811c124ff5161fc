use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{OverlayVariant, Scope};

/// Field values keyed by field key.
pub type FieldMap = BTreeMap<String, String>;

/// A logical field and the operator input that stages it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldBinding {
    pub key: String,
    pub input: String,
}

/// One on-screen element showing a field in a given output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayTarget {
    pub id: String,
    pub key: String,
    pub scope: Scope,
    #[serde(default)]
    pub default_text: String,
}

impl DisplayTarget {
    /// Trimmed value, or the default text when nothing is left.
    pub fn render(&self, value: &str) -> String {
        let text = value.trim();
        if text.is_empty() {
            self.default_text.clone()
        } else {
            text.to_string()
        }
    }
}

/// Text to show on a single display target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUpdate {
    pub target: String,
    pub key: String,
    pub scope: Scope,
    pub text: String,
}

/// Closed set of fields with their staged and live values.
///
/// Values are stored raw; trimming and default text only apply when a value
/// is rendered onto a target. Unknown keys are ignored.
#[derive(Debug, Default, Clone)]
pub struct FieldRegistry {
    bindings: Vec<FieldBinding>,
    targets: Vec<DisplayTarget>,
    staged: FieldMap,
    live: FieldMap,
}

impl FieldRegistry {
    pub fn new(bindings: Vec<FieldBinding>, targets: Vec<DisplayTarget>) -> Self {
        Self {
            bindings,
            targets,
            staged: FieldMap::new(),
            live: FieldMap::new(),
        }
    }

    /// The golf broadcast layout: every field with a preview and a live
    /// target in each overlay that shows it.
    pub fn broadcast_layout() -> Self {
        let mut bindings = Vec::with_capacity(BROADCAST_FIELDS.len());
        let mut targets = Vec::new();
        for (key, default_text, overlays) in BROADCAST_FIELDS {
            bindings.push(FieldBinding {
                key: key.to_string(),
                input: input_id(key),
            });
            for scope in Scope::ALL {
                for overlay in *overlays {
                    targets.push(DisplayTarget {
                        id: format!("{scope}.{overlay}.{key}"),
                        key: key.to_string(),
                        scope,
                        default_text: default_text.to_string(),
                    });
                }
            }
        }
        Self::new(bindings, targets)
    }

    pub fn bindings(&self) -> &[FieldBinding] {
        &self.bindings
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|binding| binding.key.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.bindings.iter().any(|binding| binding.key == key)
    }

    pub fn targets_for<'a>(
        &'a self,
        key: &'a str,
        scope: Scope,
    ) -> impl Iterator<Item = &'a DisplayTarget> + 'a {
        self.targets
            .iter()
            .filter(move |target| target.key == key && target.scope == scope)
    }

    pub fn staged(&self, key: &str) -> Option<&str> {
        self.staged.get(key).map(String::as_str)
    }

    pub fn live(&self, key: &str) -> Option<&str> {
        self.live.get(key).map(String::as_str)
    }

    pub fn set_staged(&mut self, key: &str, value: &str) -> Vec<TextUpdate> {
        self.set(key, value, Scope::Preview)
    }

    /// Only the take-live commit and sample seeding write live values.
    pub fn set_live(&mut self, key: &str, value: &str) -> Vec<TextUpdate> {
        self.set(key, value, Scope::Live)
    }

    /// Every registered key with its staged value; unset fields read blank.
    pub fn capture_staged(&self) -> FieldMap {
        self.capture(&self.staged)
    }

    pub fn capture_live(&self) -> FieldMap {
        self.capture(&self.live)
    }

    /// Stages every key present in `values`. Keys absent from `values` keep
    /// their current staged value.
    pub fn apply_to_staged(&mut self, values: &FieldMap) -> Vec<TextUpdate> {
        values
            .iter()
            .flat_map(|(key, value)| self.set_staged(key, value))
            .collect()
    }

    /// Renders every target from the current values, e.g. for a fresh surface.
    pub fn render_all(&self) -> Vec<TextUpdate> {
        self.targets
            .iter()
            .map(|target| {
                let values = match target.scope {
                    Scope::Preview => &self.staged,
                    Scope::Live => &self.live,
                };
                let value = values.get(&target.key).map(String::as_str).unwrap_or("");
                text_update(target, value)
            })
            .collect()
    }

    fn set(&mut self, key: &str, value: &str, scope: Scope) -> Vec<TextUpdate> {
        if !self.contains(key) {
            tracing::debug!(key, %scope, "ignoring unknown field");
            return Vec::new();
        }
        let values = match scope {
            Scope::Preview => &mut self.staged,
            Scope::Live => &mut self.live,
        };
        values.insert(key.to_string(), value.to_string());
        self.targets_for(key, scope)
            .map(|target| text_update(target, value))
            .collect()
    }

    fn capture(&self, values: &FieldMap) -> FieldMap {
        self.keys()
            .map(|key| {
                let value = values.get(key).cloned().unwrap_or_default();
                (key.to_string(), value)
            })
            .collect()
    }
}

fn text_update(target: &DisplayTarget, value: &str) -> TextUpdate {
    TextUpdate {
        target: target.id.clone(),
        key: target.key.clone(),
        scope: target.scope,
        text: target.render(value),
    }
}

fn input_id(key: &str) -> String {
    let mut chars = key.chars();
    let capitalised: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    format!("field{capitalised}")
}

type FieldLayout = (&'static str, &'static str, &'static [OverlayVariant]);

const BROADCAST_FIELDS: &[FieldLayout] = {
    use OverlayVariant::*;
    &[
        ("tournament", "Tournament", &[LowerThird, ComingUp]),
        ("round", "Round", &[LowerThird]),
        ("segment", "Segment", &[LowerThird]),
        ("sponsor", "Presented by", &[LowerThird, Desk]),
        ("player1", "Player 1", &[ScoreBug, MatchupBar]),
        ("player1Team", "Team 1", &[MatchupBar]),
        ("player1Score", "E", &[ScoreBug, MatchupBar]),
        ("matchStatus", "All Square", &[ScoreBug, MatchupBar]),
        ("player2", "Player 2", &[ScoreBug, MatchupBar]),
        ("player2Team", "Team 2", &[MatchupBar]),
        ("player2Score", "E", &[ScoreBug, MatchupBar]),
        ("host1", "Host", &[Desk]),
        ("host2", "Analyst", &[Desk]),
        ("topic", "Topic", &[Desk]),
        ("coming1", "Up next", &[ComingUp]),
        ("coming2", "Up next", &[ComingUp]),
        ("coming3", "Up next", &[ComingUp]),
    ]
};

/// Sample golf broadcast data used to seed a fresh installation.
pub fn sample_values() -> FieldMap {
    [
        ("tournament", "Ozark Invitational"),
        ("round", "Day 1 — Best Ball"),
        ("segment", "Feature Group"),
        ("sponsor", "Presented by +3 Golf Co."),
        ("player1", "Nick Brown"),
        ("player1Team", "Team Ozark"),
        ("player1Score", "-3 thru 8"),
        ("matchStatus", "2 Up — Ozark"),
        ("player2", "Valley Player"),
        ("player2Team", "Team Valley"),
        ("player2Score", "+1 thru 8"),
        ("host1", "Nick Brown"),
        ("host2", "Guest Analyst"),
        ("topic", "Key matches that could swing the cup"),
        ("coming1", "Feature Group on 7 tee"),
        ("coming2", "Mic’d Up: Cart Cam Highlights"),
        ("coming3", "Scoreboard check & standings"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect()
}
