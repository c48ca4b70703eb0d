//! Conflict detection and resolution for key bindings
//!
//! Two bindings conflict when they would resolve to the same physical input,
//! or when one of them uses a key as a modifier that the other binds on its
//! own. When a binding is reassigned the new assignment always wins and every
//! pre-existing conflicting binding is cleared.

use std::collections::HashMap;

use crate::binding::KeyBinding;
use crate::setting::Setting;
use crate::value::SettingValue;

/// The way two bindings collide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    /// Identical packed value
    Exact,
    /// The new binding uses the other binding's key as a modifier
    KeyUsedAsModifier,
    /// The other binding uses the new binding's key as a modifier
    ModifierUsedAsKey,
}

/// A binding cleared to make room for a new assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearedBinding {
    pub key: String,
    pub identity: KeyBinding,
    pub previous: KeyBinding,
    pub kind: ConflictKind,
}

/// Two current bindings that conflict with each other
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub first: String,
    pub first_binding: KeyBinding,
    pub second: String,
    pub second_binding: KeyBinding,
    pub kind: ConflictKind,
}

/// Detects conflicts between key bindings
pub struct ConflictDetector;

impl ConflictDetector {
    /// How `existing` collides with a freshly `assigned` binding, if at all
    pub fn between(assigned: KeyBinding, existing: KeyBinding) -> Option<ConflictKind> {
        if assigned.is_none() || existing.is_none() {
            return None;
        }
        if assigned == existing {
            return Some(ConflictKind::Exact);
        }
        if existing.modifiers().is_empty() && assigned.has_keycode_as_modifier(existing.keycode()) {
            return Some(ConflictKind::KeyUsedAsModifier);
        }
        if assigned.modifiers().is_empty() && existing.has_keycode_as_modifier(assigned.keycode()) {
            return Some(ConflictKind::ModifierUsedAsKey);
        }
        None
    }

    /// Detect all conflicts among the current bindings of `settings`
    pub fn detect<'a>(settings: impl IntoIterator<Item = &'a Setting>) -> Vec<Conflict> {
        let bound: Vec<(&str, KeyBinding)> = settings
            .into_iter()
            .filter_map(|s| s.current_binding().map(|b| (s.key(), b)))
            .filter(|(_, b)| !b.is_none())
            .collect();

        let mut conflicts = Vec::new();
        for (i, (first, first_binding)) in bound.iter().enumerate() {
            for (second, second_binding) in &bound[i + 1..] {
                let kind = Self::between(*second_binding, *first_binding)
                    .or_else(|| Self::between(*first_binding, *second_binding));
                if let Some(kind) = kind {
                    conflicts.push(Conflict {
                        first: first.to_string(),
                        first_binding: *first_binding,
                        second: second.to_string(),
                        second_binding: *second_binding,
                        kind,
                    });
                }
            }
        }

        conflicts
    }
}

/// Record `assigned` for `identity` in the binding table and clear every other
/// binding it conflicts with. `order` fixes the scan order.
pub(crate) fn resolve(
    settings: &mut HashMap<String, Setting>,
    order: &[String],
    table: &mut HashMap<KeyBinding, KeyBinding>,
    identity: KeyBinding,
    assigned: KeyBinding,
) -> Vec<ClearedBinding> {
    table.insert(identity, assigned);
    if assigned.is_none() {
        return Vec::new();
    }

    let mut cleared = Vec::new();
    for key in order {
        let Some(setting) = settings.get_mut(key) else {
            continue;
        };
        let (Some(other_identity), Some(existing)) =
            (setting.default_binding(), setting.current_binding())
        else {
            continue;
        };
        if other_identity == identity {
            continue;
        }
        let Some(kind) = ConflictDetector::between(assigned, existing) else {
            continue;
        };

        // Unbinding always passes the binding filter rules
        if setting
            .set_value_silent(SettingValue::KeyBinding(KeyBinding::NONE))
            .is_ok()
        {
            table.insert(other_identity, KeyBinding::NONE);
            cleared.push(ClearedBinding {
                key: key.clone(),
                identity: other_identity,
                previous: existing,
                kind,
            });
        }
    }

    cleared
}
