use std::collections::HashMap;

use crate::scene::SLOT_COUNT;

/// Physical key, normalised so letters compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    Char(char),
    Named(String),
}

impl Key {
    pub fn parse(s: &str) -> Key {
        if s == " " {
            return Key::Space;
        }
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("space") {
            return Key::Space;
        }
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Key::Char(c),
            _ => Key::Named(trimmed.to_string()),
        }
        .normalised()
    }

    pub fn normalised(&self) -> Key {
        match self {
            Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
            Key::Named(name) => Key::Named(name.to_ascii_lowercase()),
            Key::Space => Key::Space,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Modifiers {
    /// Platform command key.
    pub meta: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    /// Modifiers that belong to OS or browser shortcuts.
    pub fn reserved(&self) -> bool {
        self.meta || self.ctrl || self.alt
    }
}

/// Where input focus was when the key went down.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Document,
    TextInput,
    TextArea,
    Select,
    ContentEditable,
}

impl Focus {
    pub fn is_editable(self) -> bool {
        !matches!(self, Focus::Document)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
    pub focus: Focus,
}

impl KeyPress {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
            focus: Focus::Document,
        }
    }

    pub fn with_focus(mut self, focus: Focus) -> Self {
        self.focus = focus;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Parses a chord such as `space`, `2` or `Ctrl+Shift+O`. Raw key values
    /// are accepted too, so `" "` is space and `"+"` or `"Ctrl++"` name the
    /// plus key.
    pub fn parse(chord: &str) -> Option<KeyPress> {
        if chord == " " || chord == "+" {
            return Some(KeyPress::new(Key::parse(chord)));
        }
        let (chord, plus_key) = match chord.strip_suffix("++") {
            Some(rest) => (rest, true),
            None => (chord, false),
        };

        let mut modifiers = Modifiers::default();
        let mut key = plus_key.then_some(Key::Char('+'));
        for part in chord.split('+') {
            if part == " " {
                key = Some(Key::Space);
                continue;
            }
            match part.trim().to_ascii_uppercase().as_str() {
                "CTRL" | "CONTROL" => modifiers.ctrl = true,
                "ALT" | "OPTION" => modifiers.alt = true,
                "SHIFT" => modifiers.shift = true,
                "CMD" | "META" | "SUPER" => modifiers.meta = true,
                "" => {}
                _ => key = Some(Key::parse(part)),
            }
        }
        key.map(|key| KeyPress::new(key).with_modifiers(modifiers))
    }
}

/// Discrete switcher command, independent of how it was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    TakeLive,
    /// 0-based slot.
    RecallScene(usize),
    SaveScene(usize),
    CycleOverlay,
    CycleVideo,
    ToggleTheme,
    LoadSampleData,
    StartCamera,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppression {
    EditableFocus,
    ReservedModifier,
}

/// Outcome of routing a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Ignored,
    Suppressed(Suppression),
    /// The press is consumed: default handling must be prevented.
    Handled(Action),
}

impl Dispatch {
    pub fn prevents_default(&self) -> bool {
        matches!(self, Dispatch::Handled(_))
    }

    pub fn action(&self) -> Option<Action> {
        match self {
            Dispatch::Handled(action) => Some(*action),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HotkeyMap {
    bindings: HashMap<Key, Action>,
}

impl HotkeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Space takes live, 1-4 recall scenes, letters drive the cycles and
    /// console toggles.
    pub fn broadcast_defaults() -> Self {
        let mut map = Self::new();
        map.bind(Key::Space, Action::TakeLive);
        for index in 0..SLOT_COUNT {
            if let Some(digit) = char::from_digit(index as u32 + 1, 10) {
                map.bind(Key::Char(digit), Action::RecallScene(index));
            }
        }
        map.bind(Key::Char('o'), Action::CycleOverlay);
        map.bind(Key::Char('v'), Action::CycleVideo);
        map.bind(Key::Char('t'), Action::ToggleTheme);
        map.bind(Key::Char('f'), Action::LoadSampleData);
        map.bind(Key::Char('c'), Action::StartCamera);
        map
    }

    pub fn bind(&mut self, key: Key, action: Action) {
        self.bindings.insert(key.normalised(), action);
    }

    pub fn action_for(&self, key: &Key) -> Option<Action> {
        self.bindings.get(&key.normalised()).copied()
    }

    pub fn resolve(&self, press: &KeyPress) -> Dispatch {
        if press.focus.is_editable() {
            return Dispatch::Suppressed(Suppression::EditableFocus);
        }
        if press.modifiers.reserved() {
            return Dispatch::Suppressed(Suppression::ReservedModifier);
        }
        match self.action_for(&press.key) {
            Some(action) => Dispatch::Handled(action),
            None => Dispatch::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_recall_zero_based_slots() {
        let map = HotkeyMap::broadcast_defaults();
        let dispatch = map.resolve(&KeyPress::new(Key::Char('2')));
        assert_eq!(dispatch, Dispatch::Handled(Action::RecallScene(1)));
        assert!(dispatch.prevents_default());
        assert_eq!(
            map.resolve(&KeyPress::new(Key::Char('5'))),
            Dispatch::Ignored
        );
    }

    #[test]
    fn editable_focus_suppresses_everything() {
        let map = HotkeyMap::broadcast_defaults();
        for focus in [
            Focus::TextInput,
            Focus::TextArea,
            Focus::Select,
            Focus::ContentEditable,
        ] {
            let press = KeyPress::new(Key::Space).with_focus(focus);
            assert_eq!(
                map.resolve(&press),
                Dispatch::Suppressed(Suppression::EditableFocus)
            );
        }
    }

    #[test]
    fn reserved_modifiers_suppress_but_shift_does_not() {
        let map = HotkeyMap::broadcast_defaults();
        let ctrl = KeyPress::parse("Ctrl+1").unwrap();
        assert_eq!(
            map.resolve(&ctrl),
            Dispatch::Suppressed(Suppression::ReservedModifier)
        );

        let shifted = KeyPress::parse("Shift+O").unwrap();
        assert_eq!(map.resolve(&shifted).action(), Some(Action::CycleOverlay));
    }

    #[test]
    fn parses_keys() {
        assert_eq!(Key::parse(" "), Key::Space);
        assert_eq!(Key::parse("SPACE"), Key::Space);
        assert_eq!(Key::parse("V"), Key::Char('v'));
        assert_eq!(Key::parse("Escape"), Key::Named("escape".into()));
        assert_eq!(KeyPress::parse("ctrl+"), None);
    }

    #[test]
    fn raw_key_values_parse_as_chords() {
        let space = KeyPress::parse(" ").unwrap();
        assert_eq!(space.key, Key::Space);
        assert_eq!(
            HotkeyMap::broadcast_defaults().resolve(&space),
            Dispatch::Handled(Action::TakeLive)
        );

        assert_eq!(KeyPress::parse("+").unwrap().key, Key::Char('+'));

        let ctrl_plus = KeyPress::parse("Ctrl++").unwrap();
        assert_eq!(ctrl_plus.key, Key::Char('+'));
        assert!(ctrl_plus.modifiers.ctrl);

        let shift_space = KeyPress::parse("Shift+ ").unwrap();
        assert_eq!(shift_space.key, Key::Space);
        assert!(shift_space.modifiers.shift);
    }
}
