use broadcast_switcher_core::{
    Focus, KeyPress, OverlayVariant, Result, SwitcherError, VideoSource,
};

/// One operator command from a session script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { key: String, value: String },
    Overlay(OverlayVariant),
    Video(VideoSource),
    Key(KeyPress),
    /// 0-based slot.
    Save(usize),
    Recall(usize),
    Rename { slot: usize, name: String },
    Take,
    Wait(u64),
    Theme,
    Sample,
    Camera,
    Show,
}

impl Command {
    /// Parses a script line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match verb {
            "set" => {
                let (key, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                if key.is_empty() {
                    return Err(SwitcherError::msg("usage: set <field> <value>"));
                }
                Command::Set {
                    key: key.to_string(),
                    value: value.trim_start().to_string(),
                }
            }
            "overlay" => Command::Overlay(rest.parse()?),
            "video" => Command::Video(rest.parse()?),
            "key" => Command::Key(parse_key(rest)?),
            "save" => Command::Save(parse_slot(rest)?),
            "recall" => Command::Recall(parse_slot(rest)?),
            "rename" => {
                let (slot, name) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                Command::Rename {
                    slot: parse_slot(slot)?,
                    name: name.trim().to_string(),
                }
            }
            "take" => Command::Take,
            "wait" => Command::Wait(
                rest.parse()
                    .map_err(|_| SwitcherError::msg(format!("invalid duration `{rest}`")))?,
            ),
            "theme" => Command::Theme,
            "sample" => Command::Sample,
            "camera" => Command::Camera,
            "show" => Command::Show,
            other => return Err(SwitcherError::msg(format!("unknown command `{other}`"))),
        };
        Ok(Some(command))
    }
}

/// `<chord> [@text|@textarea|@select|@editable]`
fn parse_key(rest: &str) -> Result<KeyPress> {
    let (chord, focus) = match rest.rsplit_once('@') {
        Some((chord, focus)) => (chord.trim(), Some(focus.trim())),
        None => (rest, None),
    };
    let press = KeyPress::parse(chord)
        .ok_or_else(|| SwitcherError::msg(format!("invalid key chord `{chord}`")))?;
    let focus = match focus {
        None => Focus::Document,
        Some("text") => Focus::TextInput,
        Some("textarea") => Focus::TextArea,
        Some("select") => Focus::Select,
        Some("editable") => Focus::ContentEditable,
        Some(other) => return Err(SwitcherError::msg(format!("unknown focus `{other}`"))),
    };
    Ok(press.with_focus(focus))
}

/// Slots are numbered 1-4 for operators.
fn parse_slot(value: &str) -> Result<usize> {
    value
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|slot| slot.checked_sub(1))
        .ok_or_else(|| SwitcherError::msg(format!("invalid scene slot `{value}`")))
}
