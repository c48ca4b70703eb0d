//! Packed key binding values
//!
//! A [`KeyBinding`] packs a key identifier and a modifier mask into a single
//! `u32`: the modifier mask occupies the high 8 bits and the key identifier the
//! low 24 bits. Equality and hashing only ever look at the packed integer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

const KEY_BITS: u32 = 24;
const KEY_MASK: u32 = (1 << KEY_BITS) - 1;

/// Identifier of a physical key or pointer button
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const NONE: KeyCode = KeyCode(0);
    pub const BACKSPACE: KeyCode = KeyCode(8);
    pub const TAB: KeyCode = KeyCode(9);
    pub const ENTER: KeyCode = KeyCode(13);
    pub const ESCAPE: KeyCode = KeyCode(27);
    pub const SPACE: KeyCode = KeyCode(32);
    pub const DELETE: KeyCode = KeyCode(127);
    pub const UP: KeyCode = KeyCode(273);
    pub const DOWN: KeyCode = KeyCode(274);
    pub const RIGHT: KeyCode = KeyCode(275);
    pub const LEFT: KeyCode = KeyCode(276);
    pub const INSERT: KeyCode = KeyCode(277);
    pub const HOME: KeyCode = KeyCode(278);
    pub const END: KeyCode = KeyCode(279);
    pub const PAGE_UP: KeyCode = KeyCode(280);
    pub const PAGE_DOWN: KeyCode = KeyCode(281);
    pub const RIGHT_SHIFT: KeyCode = KeyCode(303);
    pub const LEFT_SHIFT: KeyCode = KeyCode(304);
    pub const RIGHT_CONTROL: KeyCode = KeyCode(305);
    pub const LEFT_CONTROL: KeyCode = KeyCode(306);
    pub const RIGHT_ALT: KeyCode = KeyCode(307);
    pub const LEFT_ALT: KeyCode = KeyCode(308);
    pub const RIGHT_META: KeyCode = KeyCode(309);
    pub const LEFT_META: KeyCode = KeyCode(310);
    pub const MOUSE_LEFT: KeyCode = KeyCode(323);
    pub const MOUSE_RIGHT: KeyCode = KeyCode(324);
    pub const MOUSE_MIDDLE: KeyCode = KeyCode(325);

    const F1: u32 = 282;
    const MAX_FUNCTION_KEY: u8 = 15;

    /// Key code for a character key (letters are case-insensitive)
    pub fn from_char(c: char) -> Self {
        KeyCode(c.to_ascii_lowercase() as u32)
    }

    /// Key code for function key `F<n>` (1..=15)
    pub fn function(n: u8) -> Option<Self> {
        (1..=Self::MAX_FUNCTION_KEY)
            .contains(&n)
            .then(|| KeyCode(Self::F1 + u32::from(n) - 1))
    }

    /// Whether this key is one of the pointer buttons
    pub fn is_mouse(&self) -> bool {
        (Self::MOUSE_LEFT.0..=Self::MOUSE_MIDDLE.0).contains(&self.0)
    }

    /// Whether this key is the left or right variant of a modifier key
    pub fn is_modifier_key(&self) -> bool {
        Modifier::for_keycode(*self).is_some()
    }

    fn name(&self) -> Option<&'static str> {
        let name = match *self {
            KeyCode::NONE => "None",
            KeyCode::BACKSPACE => "Backspace",
            KeyCode::TAB => "Tab",
            KeyCode::ENTER => "Enter",
            KeyCode::ESCAPE => "Escape",
            KeyCode::SPACE => "Space",
            KeyCode::DELETE => "Delete",
            KeyCode::UP => "Up",
            KeyCode::DOWN => "Down",
            KeyCode::RIGHT => "Right",
            KeyCode::LEFT => "Left",
            KeyCode::INSERT => "Insert",
            KeyCode::HOME => "Home",
            KeyCode::END => "End",
            KeyCode::PAGE_UP => "PageUp",
            KeyCode::PAGE_DOWN => "PageDown",
            KeyCode::RIGHT_SHIFT => "RightShift",
            KeyCode::LEFT_SHIFT => "LeftShift",
            KeyCode::RIGHT_CONTROL => "RightCtrl",
            KeyCode::LEFT_CONTROL => "LeftCtrl",
            KeyCode::RIGHT_ALT => "RightAlt",
            KeyCode::LEFT_ALT => "LeftAlt",
            KeyCode::RIGHT_META => "RightMeta",
            KeyCode::LEFT_META => "LeftMeta",
            KeyCode::MOUSE_LEFT => "MouseLeft",
            KeyCode::MOUSE_RIGHT => "MouseRight",
            KeyCode::MOUSE_MIDDLE => "MouseMiddle",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.name() {
            return write!(f, "{}", name);
        }
        let fkey = Self::F1..Self::F1 + u32::from(Self::MAX_FUNCTION_KEY);
        if fkey.contains(&self.0) {
            return write!(f, "F{}", self.0 - Self::F1 + 1);
        }
        // Uppercase codes stay numeric; letters are named by their lowercase code
        match char::from_u32(self.0) {
            Some(c) if c.is_ascii_graphic() && !c.is_ascii_uppercase() => {
                write!(f, "{}", c.to_ascii_uppercase())
            }
            _ => write!(f, "Key{}", self.0),
        }
    }
}

impl FromStr for KeyCode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let code = match lower.as_str() {
            "none" => KeyCode::NONE,
            "backspace" | "bksp" => KeyCode::BACKSPACE,
            "tab" => KeyCode::TAB,
            "enter" | "return" => KeyCode::ENTER,
            "escape" | "esc" => KeyCode::ESCAPE,
            "space" => KeyCode::SPACE,
            "delete" | "del" => KeyCode::DELETE,
            "up" => KeyCode::UP,
            "down" => KeyCode::DOWN,
            "right" => KeyCode::RIGHT,
            "left" => KeyCode::LEFT,
            "insert" | "ins" => KeyCode::INSERT,
            "home" => KeyCode::HOME,
            "end" => KeyCode::END,
            "pageup" | "page_up" => KeyCode::PAGE_UP,
            "pagedown" | "page_down" => KeyCode::PAGE_DOWN,
            "shift" | "leftshift" => KeyCode::LEFT_SHIFT,
            "rightshift" => KeyCode::RIGHT_SHIFT,
            "ctrl" | "control" | "leftctrl" => KeyCode::LEFT_CONTROL,
            "rightctrl" => KeyCode::RIGHT_CONTROL,
            "alt" | "leftalt" => KeyCode::LEFT_ALT,
            "rightalt" => KeyCode::RIGHT_ALT,
            "meta" | "cmd" | "leftmeta" => KeyCode::LEFT_META,
            "rightmeta" => KeyCode::RIGHT_META,
            "mouseleft" | "mouse0" => KeyCode::MOUSE_LEFT,
            "mouseright" | "mouse1" => KeyCode::MOUSE_RIGHT,
            "mousemiddle" | "mouse2" => KeyCode::MOUSE_MIDDLE,
            s if s.starts_with("key") && s.len() > 3 => {
                let raw: u32 = s[3..].parse().map_err(|_| {
                    ParseError::InvalidKeySyntax(format!("Invalid key identifier: {}", s))
                })?;
                KeyCode(raw & KEY_MASK)
            }
            s if s.starts_with('f') && s.len() > 1 => {
                let num: u8 = s[1..].parse().map_err(|_| {
                    ParseError::InvalidKeySyntax(format!("Invalid function key: {}", s))
                })?;
                KeyCode::function(num).ok_or_else(|| {
                    ParseError::InvalidKeySyntax(format!(
                        "Function key must be F1-F15, got: {}",
                        s
                    ))
                })?
            }
            _ => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::from_char(c),
                    _ => return Err(ParseError::InvalidKeySyntax(format!("Unknown key: {}", s))),
                }
            }
        };
        Ok(code)
    }
}

/// A keyboard modifier flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Ctrl,
    Shift,
    Alt,
    Meta,
}

impl Modifier {
    /// All modifiers in display order
    pub const ALL: [Modifier; 4] = [Modifier::Ctrl, Modifier::Shift, Modifier::Alt, Modifier::Meta];

    /// Bit occupied by this modifier in the packed mask
    pub const fn bit(self) -> u8 {
        match self {
            Modifier::Ctrl => 0b0001,
            Modifier::Shift => 0b0010,
            Modifier::Alt => 0b0100,
            Modifier::Meta => 0b1000,
        }
    }

    /// Physical keys (left, right) that act as this modifier
    pub const fn keycodes(self) -> [KeyCode; 2] {
        match self {
            Modifier::Ctrl => [KeyCode::LEFT_CONTROL, KeyCode::RIGHT_CONTROL],
            Modifier::Shift => [KeyCode::LEFT_SHIFT, KeyCode::RIGHT_SHIFT],
            Modifier::Alt => [KeyCode::LEFT_ALT, KeyCode::RIGHT_ALT],
            Modifier::Meta => [KeyCode::LEFT_META, KeyCode::RIGHT_META],
        }
    }

    /// The modifier a physical key acts as, if any
    pub fn for_keycode(key: KeyCode) -> Option<Modifier> {
        Self::ALL.into_iter().find(|m| m.keycodes().contains(&key))
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Ctrl => write!(f, "Ctrl"),
            Modifier::Shift => write!(f, "Shift"),
            Modifier::Alt => write!(f, "Alt"),
            Modifier::Meta => write!(f, "Meta"),
        }
    }
}

impl FromStr for Modifier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ctrl" | "control" => Ok(Modifier::Ctrl),
            "shift" => Ok(Modifier::Shift),
            "alt" => Ok(Modifier::Alt),
            "meta" | "cmd" | "command" => Ok(Modifier::Meta),
            _ => Err(ParseError::InvalidModifier(s.to_string())),
        }
    }
}

/// Set of modifier flags, stored as the 8-bit mask used in packed bindings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(Modifier::Ctrl.bit());
    pub const SHIFT: Modifiers = Modifiers(Modifier::Shift.bit());
    pub const ALT: Modifiers = Modifiers(Modifier::Alt.bit());
    pub const META: Modifiers = Modifiers(Modifier::Meta.bit());

    pub const fn from_bits(bits: u8) -> Self {
        Modifiers(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, modifier: Modifier) -> bool {
        self.0 & modifier.bit() != 0
    }

    pub fn with(self, modifier: Modifier) -> Self {
        Modifiers(self.0 | modifier.bit())
    }

    /// Modifiers set in this mask, in display order
    pub fn iter(self) -> impl Iterator<Item = Modifier> {
        Modifier::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 | rhs.0)
    }
}

impl FromIterator<Modifier> for Modifiers {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        iter.into_iter().fold(Modifiers::NONE, Modifiers::with)
    }
}

/// A key identifier plus modifier flags, packed into one integer
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyBinding(u32);

impl KeyBinding {
    /// The unbound sentinel: key identifier 0, no modifiers
    pub const NONE: KeyBinding = KeyBinding(0);

    /// Pack a key identifier and modifier mask. Identifier bits above 24 are dropped.
    pub const fn encode(key: u32, modifiers: u8) -> u32 {
        ((modifiers as u32) << KEY_BITS) | (key & KEY_MASK)
    }

    /// Split a packed value back into `(key identifier, modifier mask)`
    pub const fn decode(packed: u32) -> (u32, u8) {
        (packed & KEY_MASK, (packed >> KEY_BITS) as u8)
    }

    pub const fn new(key: KeyCode, modifiers: Modifiers) -> Self {
        KeyBinding(Self::encode(key.0, modifiers.bits()))
    }

    /// A binding on a single key with no modifiers
    pub const fn key(key: KeyCode) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    pub const fn from_packed(packed: u32) -> Self {
        KeyBinding(packed)
    }

    pub const fn packed(&self) -> u32 {
        self.0
    }

    pub const fn keycode(&self) -> KeyCode {
        KeyCode(Self::decode(self.0).0)
    }

    pub const fn modifiers(&self) -> Modifiers {
        Modifiers::from_bits(Self::decode(self.0).1)
    }

    pub const fn is_none(&self) -> bool {
        self.0 == Self::NONE.0
    }

    /// Whether `candidate` is one of the physical keys acting as a modifier of this binding
    pub fn has_keycode_as_modifier(&self, candidate: KeyCode) -> bool {
        self.modifiers()
            .iter()
            .any(|m| m.keycodes().contains(&candidate))
    }
}

impl Default for KeyBinding {
    fn default() -> Self {
        KeyBinding::NONE
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return write!(f, "<Unbound>");
        }
        for modifier in self.modifiers().iter() {
            write!(f, "{}+", modifier)?;
        }
        write!(f, "{}", self.keycode())
    }
}

impl fmt::Debug for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyBinding({} = {:#010x})", self, self.0)
    }
}

impl FromStr for KeyBinding {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("<unbound>") {
            return Ok(KeyBinding::NONE);
        }

        let (modifier_text, key) = match trimmed.strip_suffix('+') {
            // "+" alone or a trailing "++" names the plus key itself
            Some(rest) if rest.is_empty() || rest.ends_with('+') => {
                (rest.strip_suffix('+').unwrap_or(rest), "+")
            }
            _ => trimmed.rsplit_once('+').unwrap_or(("", trimmed)),
        };
        if key.trim().is_empty() {
            return Err(ParseError::InvalidKeySyntax(format!(
                "Missing key in binding: {}",
                s
            )));
        }

        let modifiers = if modifier_text.is_empty() {
            Modifiers::NONE
        } else {
            modifier_text
                .split('+')
                .map(Modifier::from_str)
                .collect::<Result<Modifiers, _>>()?
        };

        Ok(KeyBinding::new(KeyCode::from_str(key)?, modifiers))
    }
}

impl From<KeyCode> for KeyBinding {
    fn from(key: KeyCode) -> Self {
        KeyBinding::key(key)
    }
}
