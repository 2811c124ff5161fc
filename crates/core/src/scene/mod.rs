use serde::{Deserialize, Serialize};

use crate::{
    fields::FieldMap,
    storage::{Storage, SCENES_KEY},
    OverlayVariant, VideoSource,
};

pub const SLOT_COUNT: usize = 4;

/// Overlay, video source and field values of one output. Scene slots capture
/// and restore the preview one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub overlay: OverlayVariant,
    pub video: VideoSource,
    pub fields: FieldMap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSlot {
    /// 1-based slot number.
    pub id: u8,
    #[serde(default)]
    pub name: Option<String>,
    pub overlay_variant: OverlayVariant,
    pub video_source: VideoSource,
    #[serde(default)]
    pub fields: FieldMap,
}

impl SceneSlot {
    fn blank(id: u8, overlay: OverlayVariant, video: VideoSource) -> Self {
        Self {
            id,
            name: None,
            overlay_variant: overlay,
            video_source: video,
            fields: FieldMap::new(),
        }
    }

    /// A slot that has never captured any fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Scene {}", self.id))
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            overlay: self.overlay_variant,
            video: self.video_source,
            fields: self.fields.clone(),
        }
    }
}

/// Loose mirror of [`SceneSlot`] so one bad entry cannot spoil the rest.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSlot {
    id: Option<u8>,
    name: Option<String>,
    overlay_variant: Option<String>,
    video_source: Option<String>,
    #[serde(default)]
    fields: FieldMap,
}

/// The four scene memories. Sole owner of the persisted slot record.
#[derive(Debug, Clone)]
pub struct SceneStore {
    slots: Vec<SceneSlot>,
}

impl SceneStore {
    pub fn new(default_overlay: OverlayVariant, default_video: VideoSource) -> Self {
        let slots = (1..=SLOT_COUNT as u8)
            .map(|id| SceneSlot::blank(id, default_overlay, default_video))
            .collect();
        Self { slots }
    }

    /// Loads persisted slots. Anything missing or unreadable is synthesized
    /// from the defaults.
    pub fn load(
        storage: &dyn Storage,
        default_overlay: OverlayVariant,
        default_video: VideoSource,
    ) -> Self {
        let mut store = Self::new(default_overlay, default_video);
        let raw = match storage.get(SCENES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return store,
            Err(err) => {
                tracing::warn!(error = %err, "scene storage unavailable, using defaults");
                return store;
            }
        };
        let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable scene record");
                return store;
            }
        };

        let mut restored = [false; SLOT_COUNT];
        for entry in entries {
            let Ok(stored) = serde_json::from_value::<StoredSlot>(entry) else {
                continue;
            };
            let Some(index) = stored.id.and_then(slot_index) else {
                continue;
            };
            if restored[index] {
                continue;
            }
            restored[index] = true;
            let slot = &mut store.slots[index];
            slot.name = stored.name.filter(|name| !name.trim().is_empty());
            // An empty slot only carries its name; selections stay on the defaults.
            if stored.fields.is_empty() {
                continue;
            }
            slot.overlay_variant = stored
                .overlay_variant
                .and_then(|name| name.parse().ok())
                .unwrap_or(default_overlay);
            slot.video_source = stored
                .video_source
                .and_then(|name| name.parse().ok())
                .unwrap_or(default_video);
            slot.fields = stored.fields;
        }
        store
    }

    pub fn slots(&self) -> &[SceneSlot] {
        &self.slots
    }

    /// Slot at 0-based `index`.
    pub fn slot(&self, index: usize) -> Option<&SceneSlot> {
        self.slots.get(index)
    }

    /// Overwrites the slot's captured content and persists. Returns `false`
    /// for an out-of-range index.
    pub fn save(
        &mut self,
        index: usize,
        snapshot: Snapshot,
        storage: &mut dyn Storage,
    ) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            tracing::debug!(index, "ignoring save to missing scene slot");
            return false;
        };
        slot.overlay_variant = snapshot.overlay;
        slot.video_source = snapshot.video;
        slot.fields = snapshot.fields;
        self.persist(storage);
        true
    }

    /// Renames a slot without touching its content. A blank name clears it.
    pub fn rename(&mut self, index: usize, name: &str, storage: &mut dyn Storage) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            tracing::debug!(index, "ignoring rename of missing scene slot");
            return false;
        };
        let name = name.trim();
        slot.name = (!name.is_empty()).then(|| name.to_string());
        self.persist(storage);
        true
    }

    /// Writes the slots to storage. Slots that never captured anything and
    /// carry no name are left out so they are rebuilt from the defaults on
    /// load. Failures leave the in-memory slots authoritative for the rest of
    /// the session.
    pub fn persist(&self, storage: &mut dyn Storage) {
        let kept: Vec<&SceneSlot> = self
            .slots
            .iter()
            .filter(|slot| !slot.is_empty() || slot.name.is_some())
            .collect();
        let result = serde_json::to_string(&kept)
            .map_err(crate::SwitcherError::from)
            .and_then(|json| storage.set(SCENES_KEY, &json));
        if let Err(err) = result {
            tracing::warn!(error = %err, "scene slots not persisted");
        }
    }
}

fn slot_index(id: u8) -> Option<usize> {
    let index = usize::from(id).checked_sub(1)?;
    (index < SLOT_COUNT).then_some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{storage::MemoryStorage, Result, SwitcherError};

    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(SwitcherError::msg("storage disabled"))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(SwitcherError::msg("quota exceeded"))
        }
    }

    fn snapshot(score: &str) -> Snapshot {
        let mut fields = FieldMap::new();
        fields.insert("player1Score".into(), score.into());
        Snapshot {
            overlay: OverlayVariant::ScoreBug,
            video: VideoSource::Replay,
            fields,
        }
    }

    #[test]
    fn fresh_store_has_four_empty_slots() {
        let store = SceneStore::new(OverlayVariant::LowerThird, VideoSource::Camera);
        assert_eq!(store.slots().len(), SLOT_COUNT);
        assert!(store.slots().iter().all(SceneSlot::is_empty));
        assert_eq!(store.slots()[3].id, 4);
        assert_eq!(store.slots()[3].display_name(), "Scene 4");
    }

    #[test]
    fn save_persists_and_reloads() {
        let mut storage = MemoryStorage::new();
        let mut store = SceneStore::new(OverlayVariant::LowerThird, VideoSource::Camera);
        assert!(store.save(2, snapshot("-3 thru 8"), &mut storage));
        assert!(store.rename(2, " Score check ", &mut storage));

        let reloaded = SceneStore::load(&storage, OverlayVariant::Desk, VideoSource::Slate);
        let slot = reloaded.slot(2).unwrap();
        assert_eq!(slot.name.as_deref(), Some("Score check"));
        assert_eq!(slot.overlay_variant, OverlayVariant::ScoreBug);
        assert_eq!(slot.video_source, VideoSource::Replay);
        assert_eq!(slot.fields["player1Score"], "-3 thru 8");
        assert_eq!(reloaded.slot(0).unwrap().overlay_variant, OverlayVariant::Desk);
    }

    #[test]
    fn never_saved_slots_follow_current_defaults() {
        let mut storage = MemoryStorage::new();
        let mut store = SceneStore::new(OverlayVariant::LowerThird, VideoSource::Camera);
        store.save(2, snapshot("E"), &mut storage);
        store.rename(1, "Desk open", &mut storage);

        let raw = storage.get(SCENES_KEY).unwrap().unwrap();
        let stored: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.len(), 2);

        let reloaded = SceneStore::load(&storage, OverlayVariant::Desk, VideoSource::Slate);
        let named = reloaded.slot(1).unwrap();
        assert_eq!(named.name.as_deref(), Some("Desk open"));
        assert!(named.is_empty());
        assert_eq!(named.overlay_variant, OverlayVariant::Desk);
        assert_eq!(named.video_source, VideoSource::Slate);
        assert_eq!(reloaded.slot(3).unwrap().overlay_variant, OverlayVariant::Desk);
        assert_eq!(reloaded.slot(2).unwrap().overlay_variant, OverlayVariant::ScoreBug);
    }

    #[test]
    fn out_of_range_is_ignored() {
        let mut storage = MemoryStorage::new();
        let mut store = SceneStore::new(OverlayVariant::LowerThird, VideoSource::Camera);
        assert!(!store.save(4, snapshot("E"), &mut storage));
        assert!(!store.rename(9, "nope", &mut storage));
        assert_eq!(storage.get(SCENES_KEY).unwrap(), None);
    }

    #[test]
    fn rename_keeps_captured_content() {
        let mut storage = MemoryStorage::new();
        let mut store = SceneStore::new(OverlayVariant::LowerThird, VideoSource::Camera);
        store.save(0, snapshot("E"), &mut storage);
        store.rename(0, "Opening", &mut storage);
        store.rename(0, "   ", &mut storage);

        let slot = store.slot(0).unwrap();
        assert_eq!(slot.name, None);
        assert_eq!(slot.fields["player1Score"], "E");
    }

    #[test]
    fn tolerant_load_repairs_bad_entries() {
        let mut storage = MemoryStorage::new();
        storage
            .set(
                SCENES_KEY,
                r#"[
                    {"id": 2, "overlayVariant": "weather", "videoSource": "replay",
                     "fields": {"topic": "Wind"}},
                    {"id": 9, "fields": {"topic": "ignored"}},
                    {"name": "no id"},
                    "garbage"
                ]"#,
            )
            .unwrap();

        let store = SceneStore::load(&storage, OverlayVariant::LowerThird, VideoSource::Camera);
        let slot = store.slot(1).unwrap();
        assert_eq!(slot.overlay_variant, OverlayVariant::LowerThird);
        assert_eq!(slot.video_source, VideoSource::Replay);
        assert_eq!(slot.fields["topic"], "Wind");
        assert!(store.slot(0).unwrap().is_empty());
    }

    #[test]
    fn unreadable_record_falls_back_to_defaults() {
        let mut storage = MemoryStorage::new();
        storage.set(SCENES_KEY, "{{{").unwrap();
        let store = SceneStore::load(&storage, OverlayVariant::LowerThird, VideoSource::Camera);
        assert!(store.slots().iter().all(SceneSlot::is_empty));
    }

    #[test]
    fn storage_failures_are_swallowed() {
        let mut storage = BrokenStorage;
        let mut store = SceneStore::load(&storage, OverlayVariant::LowerThird, VideoSource::Camera);
        assert!(store.save(0, snapshot("+1"), &mut storage));
        assert_eq!(store.slot(0).unwrap().fields["player1Score"], "+1");
    }
}
