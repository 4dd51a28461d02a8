//! Key combination parsing

use std::collections::HashSet;
use std::str::FromStr;

use global_hotkey::hotkey::Code;

use super::HotkeyError;

/// Modifier keys after left/right variants are collapsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Ctrl,
    Alt,
    AltGr,
    Shift,
    Super,
}

/// One key as seen by the binding state machines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Modifier(Modifier),
    Code(Code),
}

pub type KeySet = HashSet<Key>;

impl Key {
    /// Collapse left/right modifier codes into their canonical modifier.
    ///
    /// `AltRight` collapses to `Alt`; input backends that can tell AltGr
    /// apart report `Key::Modifier(Modifier::AltGr)` directly.
    pub fn canonical(self) -> Key {
        match self {
            Key::Code(code) => match code {
                Code::ControlLeft | Code::ControlRight => Key::Modifier(Modifier::Ctrl),
                Code::ShiftLeft | Code::ShiftRight => Key::Modifier(Modifier::Shift),
                Code::AltLeft | Code::AltRight => Key::Modifier(Modifier::Alt),
                Code::MetaLeft | Code::MetaRight => Key::Modifier(Modifier::Super),
                _ => self,
            },
            Key::Modifier(_) => self,
        }
    }
}

impl From<Code> for Key {
    fn from(code: Code) -> Self {
        Key::Code(code).canonical()
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Modifier(Modifier::Ctrl) => write!(f, "ctrl"),
            Key::Modifier(Modifier::Alt) => write!(f, "alt"),
            Key::Modifier(Modifier::AltGr) => write!(f, "altgr"),
            Key::Modifier(Modifier::Shift) => write!(f, "shift"),
            Key::Modifier(Modifier::Super) => write!(f, "super"),
            Key::Code(code) => write!(f, "{:?}", code),
        }
    }
}

/// Parse a combination such as `ctrl+alt+down` into its canonical key set.
///
/// Only alphanumerics, `+` and `_` are accepted. Empty components
/// (`ctrl++x`) are skipped.
pub fn parse_combination(combination: &str) -> Result<KeySet, HotkeyError> {
    if combination.trim().is_empty() {
        return Err(HotkeyError::Empty);
    }
    if !combination
        .chars()
        .all(|c| c.is_alphanumeric() || c == '+' || c == '_')
    {
        return Err(HotkeyError::InvalidCharacters(combination.to_string()));
    }

    let lower = combination.to_lowercase();
    let mut keys = KeySet::new();
    for part in lower.split('+').filter(|p| !p.is_empty()) {
        keys.insert(parse_component(part)?);
    }

    if keys.is_empty() {
        return Err(HotkeyError::Empty);
    }
    Ok(keys)
}

fn parse_component(part: &str) -> Result<Key, HotkeyError> {
    let modifier = match part {
        "ctrl" | "control" => Some(Modifier::Ctrl),
        "alt" => Some(Modifier::Alt),
        "altgr" => Some(Modifier::AltGr),
        "shift" => Some(Modifier::Shift),
        "cmd" | "win" | "meta" | "super" => Some(Modifier::Super),
        _ => None,
    };
    if let Some(modifier) = modifier {
        return Ok(Key::Modifier(modifier));
    }

    if let Some(code) = special_key(part) {
        return Ok(Key::Code(code));
    }

    if let Some(number) = part.strip_prefix('f').filter(|n| !n.is_empty()) {
        if number.chars().all(|c| c.is_ascii_digit()) {
            return match number.parse::<u8>() {
                Ok(n @ 1..=24) => named_code(&format!("F{}", n), part),
                _ => Err(HotkeyError::InvalidFunctionKey(part.to_string())),
            };
        }
    }

    if let Some(digit) = part.strip_prefix("numpad") {
        if digit.len() == 1 && digit.chars().all(|c| c.is_ascii_digit()) {
            return named_code(&format!("Numpad{}", digit), part);
        }
        return Err(HotkeyError::UnknownKey(part.to_string()));
    }

    let mut chars = part.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_lowercase() => {
            named_code(&format!("Key{}", c.to_ascii_uppercase()), part)
        }
        (Some(c), None) if c.is_ascii_digit() => named_code(&format!("Digit{}", c), part),
        _ => Err(HotkeyError::UnknownKey(part.to_string())),
    }
}

fn special_key(part: &str) -> Option<Code> {
    let code = match part {
        "up" => Code::ArrowUp,
        "down" => Code::ArrowDown,
        "left" => Code::ArrowLeft,
        "right" => Code::ArrowRight,
        "pageup" => Code::PageUp,
        "pagedown" => Code::PageDown,
        "home" => Code::Home,
        "end" => Code::End,
        "insert" => Code::Insert,
        "delete" => Code::Delete,
        "backspace" => Code::Backspace,
        "enter" => Code::Enter,
        "tab" => Code::Tab,
        "space" => Code::Space,
        "esc" => Code::Escape,
        "caps_lock" => Code::CapsLock,
        "num_lock" => Code::NumLock,
        "print_screen" => Code::PrintScreen,
        "scroll_lock" => Code::ScrollLock,
        "pause" => Code::Pause,
        _ => return None,
    };
    Some(code)
}

fn named_code(name: &str, part: &str) -> Result<Key, HotkeyError> {
    Code::from_str(name)
        .map(Key::Code)
        .map_err(|_| HotkeyError::UnknownKey(part.to_string()))
}
