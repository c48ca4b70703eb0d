//! Change notifications and binding events
//!
//! Listeners are registered per key (a setting key, or a binding's default
//! identity) and receive every event raised for that key. Registering returns
//! a [`Subscription`] handle; listeners stay alive until unsubscribed or the
//! registry is dropped.

use std::collections::HashMap;
use std::hash::Hash;

use crate::binding::KeyBinding;
use crate::input::Vec2;
use crate::value::SettingValue;

/// Semantic event raised for a key binding during polling
#[derive(Debug, Clone, PartialEq)]
pub enum BindingEvent {
    Down,
    /// Raised every frame after `Down` while the combination stays held
    Held { held_for: f32 },
    Up,
    /// Released without the pointer ever crossing the drag threshold
    Click,
    DragBegin { start: Vec2, current: Vec2 },
    Drag { start: Vec2, current: Vec2 },
    DragEnd { start: Vec2, current: Vec2 },
}

/// An event together with the binding identity it was raised for
#[derive(Debug, Clone, PartialEq)]
pub struct FiredEvent {
    pub binding: KeyBinding,
    pub event: BindingEvent,
}

/// Notification that a setting's value is now `value`
#[derive(Debug, Clone, PartialEq)]
pub struct SettingChanged {
    pub key: String,
    pub value: SettingValue,
}

pub type Listener<E> = Box<dyn FnMut(&E) + Send>;

/// Handle returned by subscriptions, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subscription {
    Setting(u64),
    Binding(u64),
}

/// Observer lists keyed by `K`
pub struct ListenerSet<K, E> {
    next_id: u64,
    listeners: HashMap<K, Vec<(u64, Listener<E>)>>,
}

impl<K: Eq + Hash + Clone, E> ListenerSet<K, E> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            listeners: HashMap::new(),
        }
    }

    pub fn subscribe(&mut self, key: K, listener: Listener<E>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.entry(key).or_default().push((id, listener));
        id
    }

    /// Remove the listener registered under `id`. Returns false if unknown.
    pub fn unsubscribe(&mut self, id: u64) -> bool {
        let mut emptied = None;
        let mut found = false;
        for (key, entries) in self.listeners.iter_mut() {
            if let Some(pos) = entries.iter().position(|(entry_id, _)| *entry_id == id) {
                entries.remove(pos);
                found = true;
                if entries.is_empty() {
                    emptied = Some(key.clone());
                }
                break;
            }
        }
        if let Some(key) = emptied {
            self.listeners.remove(&key);
        }
        found
    }

    /// Call every listener registered for `key`, in subscription order
    pub fn emit(&mut self, key: &K, event: &E) {
        if let Some(entries) = self.listeners.get_mut(key) {
            for (_, listener) in entries.iter_mut() {
                listener(event);
            }
        }
    }

    pub fn listener_count(&self, key: &K) -> usize {
        self.listeners.get(key).map_or(0, Vec::len)
    }

    pub fn remove_key(&mut self, key: &K) {
        self.listeners.remove(key);
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl<K: Eq + Hash + Clone, E> Default for ListenerSet<K, E> {
    fn default() -> Self {
        Self::new()
    }
}
