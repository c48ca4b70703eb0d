//! Declarative setting descriptors

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::binding::KeyBinding;
use crate::value::ValueType;

/// Filter rules applied when a key-binding setting is reassigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingRules {
    /// Accept bindings that carry modifier flags
    #[serde(default = "default_true")]
    pub allow_modifiers: bool,
    /// Accept pointer buttons as the bound key
    #[serde(default = "default_true")]
    pub allow_mouse: bool,
    /// Accept a bare modifier key (e.g. plain Shift) as the bound key
    #[serde(default = "default_true")]
    pub allow_modifier_keys: bool,
    /// Track pointer displacement while held and raise drag events
    #[serde(default)]
    pub drag: bool,
}

fn default_true() -> bool {
    true
}

impl Default for BindingRules {
    fn default() -> Self {
        Self {
            allow_modifiers: true,
            allow_mouse: true,
            allow_modifier_keys: true,
            drag: false,
        }
    }
}

impl BindingRules {
    /// Whether `binding` may be assigned. Unbinding is always allowed.
    pub fn accepts(&self, binding: KeyBinding) -> bool {
        if binding.is_none() {
            return true;
        }
        let key = binding.keycode();
        if !self.allow_modifiers && !binding.modifiers().is_empty() {
            return false;
        }
        if !self.allow_mouse && key.is_mouse() {
            return false;
        }
        if !self.allow_modifier_keys && key.is_modifier_key() {
            return false;
        }
        true
    }
}

/// What kind of control edits a setting, with kind-specific parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SettingKind {
    Toggle,
    Radio { options: Vec<String> },
    /// Empty `available` means any language code is accepted
    Language { available: Vec<String> },
    KeyBinding { rules: BindingRules },
    Slider { min: f32, max: f32, step: Option<f32> },
    IntSlider { min: i32, max: i32 },
    Button,
}

impl SettingKind {
    /// Whether a setting of this kind can hold values of `value_type`
    pub fn accepts_type(&self, value_type: ValueType) -> bool {
        matches!(
            (self, value_type),
            (SettingKind::Toggle, ValueType::Bool)
                | (SettingKind::Radio { .. }, ValueType::Enum)
                | (SettingKind::Language { .. }, ValueType::Text)
                | (SettingKind::KeyBinding { .. }, ValueType::KeyBinding)
                | (SettingKind::Slider { .. }, ValueType::Float)
                | (SettingKind::IntSlider { .. }, ValueType::Int)
                | (SettingKind::Button, ValueType::Bool)
        )
    }

    /// Reason the kind's own parameters are unusable, if they are
    pub fn invalid_bounds(&self) -> Option<String> {
        match self {
            SettingKind::Slider { min, max, .. } if min.is_nan() || max.is_nan() => {
                Some("slider bound is NaN".to_string())
            }
            SettingKind::Slider { min, max, .. } if min > max => {
                Some(format!("slider range {}..{} is inverted", min, max))
            }
            SettingKind::IntSlider { min, max } if min > max => {
                Some(format!("slider range {}..{} is inverted", min, max))
            }
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SettingKind::Toggle => "toggle",
            SettingKind::Radio { .. } => "radio",
            SettingKind::Language { .. } => "language",
            SettingKind::KeyBinding { .. } => "key_binding",
            SettingKind::Slider { .. } => "slider",
            SettingKind::IntSlider { .. } => "int_slider",
            SettingKind::Button => "button",
        }
    }
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Descriptor attached to every setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingOptions {
    pub kind: SettingKind,
    /// Persist this setting through the document store
    #[serde(default = "default_true")]
    pub saveable: bool,
}

impl SettingOptions {
    pub fn new(kind: SettingKind) -> Self {
        // Buttons carry no state worth persisting
        let saveable = !matches!(kind, SettingKind::Button);
        Self { kind, saveable }
    }

    pub fn is_button(&self) -> bool {
        matches!(self.kind, SettingKind::Button)
    }

    pub fn is_key_binding(&self) -> bool {
        matches!(self.kind, SettingKind::KeyBinding { .. })
    }

    /// Saveable and not a button: takes part in load and save
    pub fn is_persisted(&self) -> bool {
        self.saveable && !self.is_button()
    }

    pub fn binding_rules(&self) -> Option<&BindingRules> {
        match &self.kind {
            SettingKind::KeyBinding { rules } => Some(rules),
            _ => None,
        }
    }

    pub fn drag_enabled(&self) -> bool {
        self.binding_rules().is_some_and(|rules| rules.drag)
    }
}
