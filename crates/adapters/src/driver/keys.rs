// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Keyboard chords such as `Enter` or `Ctrl+Alt+J`

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    Control,
    Alt,
    Shift,
    Meta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
}

/// Modifiers held while one key is pressed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub modifiers: Vec<Modifier>,
    pub key: Key,
}

impl KeyChord {
    pub fn enter() -> Self {
        Self {
            modifiers: Vec::new(),
            key: Key::Enter,
        }
    }

    /// Key values in W3C WebDriver's private-use code points
    pub fn webdriver_values(&self) -> (Vec<char>, char) {
        let modifiers = self
            .modifiers
            .iter()
            .map(|m| match m {
                Modifier::Control => '\u{E009}',
                Modifier::Alt => '\u{E00A}',
                Modifier::Shift => '\u{E008}',
                Modifier::Meta => '\u{E03D}',
            })
            .collect();
        let key = match self.key {
            Key::Char(c) => c,
            Key::Enter => '\u{E007}',
            Key::Escape => '\u{E00C}',
            Key::Tab => '\u{E004}',
        };
        (modifiers, key)
    }
}

impl FromStr for KeyChord {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let last = parts.pop().filter(|p| !p.is_empty());
        let Some(last) = last else {
            return Err(format!("empty key chord: {s:?}"));
        };

        let mut modifiers = Vec::new();
        for part in parts {
            let modifier = match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => Modifier::Control,
                "alt" | "option" => Modifier::Alt,
                "shift" => Modifier::Shift,
                "meta" | "cmd" | "command" => Modifier::Meta,
                other => return Err(format!("unknown modifier {other:?} in {s:?}")),
            };
            if !modifiers.contains(&modifier) {
                modifiers.push(modifier);
            }
        }
        modifiers.sort();

        let key = match last.to_ascii_lowercase().as_str() {
            "enter" | "return" => Key::Enter,
            "esc" | "escape" => Key::Escape,
            "tab" => Key::Tab,
            k if k.chars().count() == 1 => Key::Char(k.chars().next().unwrap_or(' ')),
            other => return Err(format!("unknown key {other:?} in {s:?}")),
        };

        Ok(Self { modifiers, key })
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.modifiers {
            let name = match m {
                Modifier::Control => "Ctrl",
                Modifier::Alt => "Alt",
                Modifier::Shift => "Shift",
                Modifier::Meta => "Meta",
            };
            write!(f, "{name}+")?;
        }
        match self.key {
            Key::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            Key::Enter => write!(f, "Enter"),
            Key::Escape => write!(f, "Escape"),
            Key::Tab => write!(f, "Tab"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        enter = { "Enter", "Enter" },
        ctrl_e = { "ctrl+e", "Ctrl+E" },
        normalized_order = { "shift+Control+d", "Ctrl+Shift+D" },
        duplicate_modifier = { "ctrl+ctrl+j", "Ctrl+J" },
    )]
    fn parses_and_normalizes(input: &str, display: &str) {
        let chord: KeyChord = input.parse().unwrap();
        assert_eq!(chord.to_string(), display);
    }

    #[parameterized(
        empty = { "" },
        trailing_plus = { "ctrl+" },
        bad_modifier = { "hyper+j" },
        bad_key = { "ctrl+space bar" },
    )]
    fn rejects_malformed(input: &str) {
        assert!(input.parse::<KeyChord>().is_err());
    }

    #[test]
    fn webdriver_values_use_private_use_codes() {
        let chord: KeyChord = "ctrl+alt+j".parse().unwrap();
        let (mods, key) = chord.webdriver_values();
        assert_eq!(mods, vec!['\u{E009}', '\u{E00A}']);
        assert_eq!(key, 'j');
    }
}
