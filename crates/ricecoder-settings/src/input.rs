//! Raw input consumed by per-frame polling
//!
//! The registry never talks to an input device. Each frame the host hands it
//! something implementing [`InputSource`]; [`InputFrame`] is a plain-data
//! implementation hosts can fill from whatever backend they use.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::binding::{KeyBinding, KeyCode};

/// Pointer position in screen units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(self, other: Vec2) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }
}

/// Key and pointer state for the current frame
pub trait InputSource {
    /// The key is currently held down
    fn is_key_held(&self, key: KeyCode) -> bool;

    /// The key transitioned to down during this frame
    fn went_down(&self, key: KeyCode) -> bool;

    /// The key transitioned to up during this frame
    fn went_up(&self, key: KeyCode) -> bool;

    fn pointer_position(&self) -> Vec2;

    /// Every modifier declared by `binding` is held (either side counts)
    fn modifiers_held(&self, binding: KeyBinding) -> bool {
        binding
            .modifiers()
            .iter()
            .all(|m| m.keycodes().iter().any(|key| self.is_key_held(*key)))
    }
}

/// Frame-by-frame input state
///
/// Call [`InputFrame::next_frame`] between polls so that the down/up edges of
/// the previous frame are cleared while held keys stay held.
#[derive(Debug, Clone, Default)]
pub struct InputFrame {
    held: HashSet<KeyCode>,
    pressed: HashSet<KeyCode>,
    released: HashSet<KeyCode>,
    pointer: Vec2,
}

impl InputFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: KeyCode) -> &mut Self {
        if self.held.insert(key) {
            self.pressed.insert(key);
        }
        self
    }

    pub fn release(&mut self, key: KeyCode) -> &mut Self {
        if self.held.remove(&key) {
            self.released.insert(key);
        }
        self
    }

    pub fn move_pointer(&mut self, position: Vec2) -> &mut Self {
        self.pointer = position;
        self
    }

    /// Drop this frame's edges, keeping held keys and the pointer
    pub fn next_frame(&mut self) -> &mut Self {
        self.pressed.clear();
        self.released.clear();
        self
    }

    pub fn held_keys(&self) -> impl Iterator<Item = &KeyCode> {
        self.held.iter()
    }
}

impl InputSource for InputFrame {
    fn is_key_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    fn went_down(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    fn went_up(&self, key: KeyCode) -> bool {
        self.released.contains(&key)
    }

    fn pointer_position(&self) -> Vec2 {
        self.pointer
    }
}
