//! A single named, typed configuration entry

use heck::ToSnakeCase;

use crate::binding::KeyBinding;
use crate::error::SettingError;
use crate::options::{BindingRules, SettingKind, SettingOptions};
use crate::value::{SettingType, SettingValue, ValueType};

/// One configuration entry with default, current and temporarily saved values
///
/// A setting's declared type is the type of its default value and never
/// changes. Writes of any other type fail with [`SettingError::TypeMismatch`].
///
/// `Setting` only holds state. Change notifications, conflict resolution and
/// persistence are run by [`SettingsRegistry`](crate::SettingsRegistry), which
/// owns every registered setting.
#[derive(Debug, Clone)]
pub struct Setting {
    key: String,
    category: String,
    group: String,
    title: String,
    default: SettingValue,
    value: SettingValue,
    temp_saved: Option<SettingValue>,
    options: SettingOptions,
    allow_invoke_events: bool,
}

impl Setting {
    /// Create a setting, checking that `options.kind` can hold `default`
    pub fn new(
        category: impl Into<String>,
        group: impl Into<String>,
        title: impl Into<String>,
        default: SettingValue,
        options: SettingOptions,
    ) -> Result<Self, SettingError> {
        if !options.kind.accepts_type(default.value_type()) {
            return Err(SettingError::KindMismatch {
                kind: options.kind.to_string(),
                actual: default.value_type(),
            });
        }

        let title = title.into();
        let mut setting = Setting {
            key: title.to_snake_case(),
            category: category.into(),
            group: group.into(),
            title,
            value: default.clone(),
            default,
            temp_saved: None,
            options,
            allow_invoke_events: false,
        };
        setting.normalize_default()?;
        Ok(setting)
    }

    fn with_kind(
        category: impl Into<String>,
        group: impl Into<String>,
        title: impl Into<String>,
        default: SettingValue,
        kind: SettingKind,
    ) -> Self {
        let title = title.into();
        Setting {
            key: title.to_snake_case(),
            category: category.into(),
            group: group.into(),
            title,
            value: default.clone(),
            default,
            temp_saved: None,
            options: SettingOptions::new(kind),
            allow_invoke_events: false,
        }
    }

    pub fn toggle(
        category: impl Into<String>,
        group: impl Into<String>,
        title: impl Into<String>,
        default: bool,
    ) -> Self {
        Self::with_kind(category, group, title, SettingValue::Bool(default), SettingKind::Toggle)
    }

    /// Float slider. Swapped bounds are put back in order; `default` is
    /// clamped into `[min, max]` when the setting is registered.
    pub fn slider(
        category: impl Into<String>,
        group: impl Into<String>,
        title: impl Into<String>,
        default: f32,
        min: f32,
        max: f32,
    ) -> Self {
        let (min, max) = if min > max { (max, min) } else { (min, max) };
        Self::with_kind(
            category,
            group,
            title,
            SettingValue::Float(default),
            SettingKind::Slider { min, max, step: None },
        )
    }

    /// Integer slider, see [`Setting::slider`]
    pub fn int_slider(
        category: impl Into<String>,
        group: impl Into<String>,
        title: impl Into<String>,
        default: i32,
        min: i32,
        max: i32,
    ) -> Self {
        let (min, max) = (min.min(max), min.max(max));
        Self::with_kind(
            category,
            group,
            title,
            SettingValue::Int(default),
            SettingKind::IntSlider { min, max },
        )
    }

    pub fn radio<S: Into<String>>(
        category: impl Into<String>,
        group: impl Into<String>,
        title: impl Into<String>,
        default: i32,
        options: impl IntoIterator<Item = S>,
    ) -> Self {
        let options = options.into_iter().map(Into::into).collect();
        Self::with_kind(
            category,
            group,
            title,
            SettingValue::Enum(default),
            SettingKind::Radio { options },
        )
    }

    pub fn language<S: Into<String>>(
        category: impl Into<String>,
        group: impl Into<String>,
        title: impl Into<String>,
        default: impl Into<String>,
        available: impl IntoIterator<Item = S>,
    ) -> Self {
        let available = available.into_iter().map(Into::into).collect();
        Self::with_kind(
            category,
            group,
            title,
            SettingValue::Text(default.into()),
            SettingKind::Language { available },
        )
    }

    pub fn key_binding(
        category: impl Into<String>,
        group: impl Into<String>,
        title: impl Into<String>,
        default: KeyBinding,
    ) -> Self {
        Self::with_kind(
            category,
            group,
            title,
            SettingValue::KeyBinding(default),
            SettingKind::KeyBinding {
                rules: BindingRules::default(),
            },
        )
    }

    pub fn button(
        category: impl Into<String>,
        group: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self::with_kind(category, group, title, SettingValue::Bool(false), SettingKind::Button)
    }

    /// Override the key derived from the title
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_saveable(mut self, saveable: bool) -> Self {
        self.options.saveable = saveable;
        self
    }

    /// Replace the binding filter rules. No effect on non-binding settings.
    pub fn with_binding_rules(mut self, rules: BindingRules) -> Self {
        if let SettingKind::KeyBinding { rules: current } = &mut self.options.kind {
            *current = rules;
        }
        self
    }

    /// Enable drag tracking for a key-binding setting
    pub fn draggable(mut self) -> Self {
        if let SettingKind::KeyBinding { rules } = &mut self.options.kind {
            rules.drag = true;
        }
        self
    }

    /// Snap slider values to multiples of `step` above `min`
    pub fn with_step(mut self, step: f32) -> Self {
        if let SettingKind::Slider { step: current, .. } = &mut self.options.kind {
            *current = Some(step);
        }
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn options(&self) -> &SettingOptions {
        &self.options
    }

    pub fn value(&self) -> &SettingValue {
        &self.value
    }

    pub fn default_value(&self) -> &SettingValue {
        &self.default
    }

    pub fn value_type(&self) -> ValueType {
        self.default.value_type()
    }

    pub fn is_key_binding(&self) -> bool {
        self.value_type() == ValueType::KeyBinding
    }

    /// Stable identity of a key-binding setting
    pub fn default_binding(&self) -> Option<KeyBinding> {
        self.default.as_key_binding()
    }

    pub fn current_binding(&self) -> Option<KeyBinding> {
        self.value.as_key_binding()
    }

    /// Typed read of the current value
    pub fn get<T: SettingType>(&self) -> Result<T, SettingError> {
        T::from_value(&self.value).ok_or_else(|| self.mismatch(T::VALUE_TYPE))
    }

    pub fn allow_invoke_events(&self) -> bool {
        self.allow_invoke_events
    }

    pub fn set_allow_invoke_events(&mut self, allow: bool) {
        self.allow_invoke_events = allow;
    }

    /// Assign without notifications or persistence. Returns whether the value changed.
    pub fn set_value_silent(&mut self, value: SettingValue) -> Result<bool, SettingError> {
        if value.value_type() != self.value_type() {
            return Err(self.mismatch(value.value_type()));
        }
        let value = self.normalize(value)?;
        if value == self.value {
            return Ok(false);
        }
        self.value = value;
        Ok(true)
    }

    /// Remember the current value so an editor can cancel later
    pub fn temp_save_value(&mut self) {
        self.temp_saved = Some(self.value.clone());
    }

    pub fn temp_saved_value(&self) -> Option<&SettingValue> {
        self.temp_saved.as_ref()
    }

    pub(crate) fn take_temp_saved(&mut self) -> Option<SettingValue> {
        self.temp_saved.take()
    }

    /// Bring the default, and the current value with it, in line with the kind
    ///
    /// Builders leave this to registration, since modifiers such as
    /// [`with_step`](Setting::with_step) can still change the kind.
    pub(crate) fn normalize_default(&mut self) -> Result<(), SettingError> {
        let default = self.normalize(self.default.clone())?;
        self.value = self
            .normalize(self.value.clone())
            .unwrap_or_else(|_| default.clone());
        self.default = default;
        Ok(())
    }

    fn mismatch(&self, actual: ValueType) -> SettingError {
        SettingError::TypeMismatch {
            key: self.key.clone(),
            expected: self.value_type(),
            actual,
        }
    }

    fn normalize(&self, value: SettingValue) -> Result<SettingValue, SettingError> {
        if let Some(reason) = self.options.kind.invalid_bounds() {
            return Err(self.out_of_range(reason));
        }
        match (&self.options.kind, value) {
            (SettingKind::Slider { min, max, step }, SettingValue::Float(v)) => {
                if v.is_nan() {
                    return Err(self.out_of_range("NaN is not a slider value".to_string()));
                }
                let snapped = match step {
                    Some(step) if step.is_finite() && *step > 0.0 => {
                        min + ((v - min) / step).round() * step
                    }
                    _ => v,
                };
                Ok(SettingValue::Float(snapped.clamp(*min, *max)))
            }
            (SettingKind::IntSlider { min, max }, SettingValue::Int(v)) => {
                Ok(SettingValue::Int(v.clamp(*min, *max)))
            }
            (SettingKind::Radio { options }, SettingValue::Enum(v)) => {
                if v < 0 || v as usize >= options.len() {
                    return Err(self.out_of_range(format!(
                        "option {} not in 0..{}",
                        v,
                        options.len()
                    )));
                }
                Ok(SettingValue::Enum(v))
            }
            (SettingKind::Language { available }, SettingValue::Text(code)) => {
                if !available.is_empty() && !available.contains(&code) {
                    return Err(self.out_of_range(format!("unsupported language {}", code)));
                }
                Ok(SettingValue::Text(code))
            }
            (SettingKind::KeyBinding { rules }, SettingValue::KeyBinding(binding)) => {
                if !rules.accepts(binding) {
                    return Err(SettingError::BindingRejected {
                        key: self.key.clone(),
                        binding: binding.to_string(),
                    });
                }
                Ok(SettingValue::KeyBinding(binding))
            }
            (_, value) => Ok(value),
        }
    }

    fn out_of_range(&self, message: String) -> SettingError {
        SettingError::OutOfRange {
            key: self.key.clone(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{KeyCode, Modifiers};
    use crate::value::EnumValue;

    #[test]
    fn test_key_derived_from_title() {
        let setting = Setting::slider("Audio", "Volume", "Master Volume", 0.8, 0.0, 1.0);
        assert_eq!(setting.key(), "master_volume");

        let setting = setting.with_key("audio.master");
        assert_eq!(setting.key(), "audio.master");
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let mut setting = Setting::toggle("Video", "Display", "Fullscreen", false);
        let err = setting.set_value_silent(SettingValue::Int(1)).unwrap_err();
        assert!(matches!(
            err,
            SettingError::TypeMismatch {
                expected: ValueType::Bool,
                actual: ValueType::Int,
                ..
            }
        ));
        assert_eq!(setting.value(), &SettingValue::Bool(false));
        assert!(setting.get::<i32>().is_err());
    }

    #[test]
    fn test_new_checks_kind() {
        let result = Setting::new(
            "Video",
            "Display",
            "Fullscreen",
            SettingValue::Int(1),
            SettingOptions::new(SettingKind::Toggle),
        );
        assert!(matches!(result, Err(SettingError::KindMismatch { .. })));
    }

    #[test]
    fn test_slider_clamps_and_snaps() {
        let mut setting = Setting::slider("Audio", "Volume", "Music", 0.5, 0.0, 1.0).with_step(0.25);
        assert!(setting.set_value_silent(SettingValue::Float(3.0)).unwrap());
        assert_eq!(setting.get::<f32>().unwrap(), 1.0);

        setting.set_value_silent(SettingValue::Float(0.3)).unwrap();
        assert_eq!(setting.get::<f32>().unwrap(), 0.25);

        assert!(setting.set_value_silent(SettingValue::Float(f32::NAN)).is_err());
    }

    #[test]
    fn test_inverted_slider_range_is_an_error() {
        let result = Setting::new(
            "Audio",
            "Volume",
            "Master Volume",
            SettingValue::Float(0.5),
            SettingOptions::new(SettingKind::Slider {
                min: 1.0,
                max: 0.0,
                step: None,
            }),
        );
        assert!(matches!(result, Err(SettingError::OutOfRange { .. })));

        let result = Setting::new(
            "Audio",
            "Volume",
            "Balance",
            SettingValue::Float(0.5),
            SettingOptions::new(SettingKind::Slider {
                min: f32::NAN,
                max: 1.0,
                step: None,
            }),
        );
        assert!(matches!(result, Err(SettingError::OutOfRange { .. })));
    }

    #[test]
    fn test_slider_builders_order_bounds() {
        let mut fps = Setting::int_slider("Video", "Display", "FPS Cap", 60, 240, 30);
        assert_eq!(
            fps.options().kind,
            SettingKind::IntSlider { min: 30, max: 240 }
        );
        fps.set_value_silent(SettingValue::Int(10)).unwrap();
        assert_eq!(fps.get::<i32>().unwrap(), 30);

        let mut volume = Setting::slider("Audio", "Volume", "Music", 2.0, 1.0, 0.0);
        volume.normalize_default().unwrap();
        assert_eq!(volume.default_value(), &SettingValue::Float(1.0));
    }

    #[test]
    fn test_int_slider_keeps_wide_bounds() {
        let mut setting = Setting::int_slider("Limits", "Memory", "Budget", 0, 0, 16_777_217);
        setting
            .set_value_silent(SettingValue::Int(i32::MAX))
            .unwrap();
        assert_eq!(setting.get::<i32>().unwrap(), 16_777_217);
    }

    #[test]
    fn test_normalize_default_rejects_invalid_defaults() {
        let mut preset = Setting::radio("Video", "Quality", "Preset", 7, ["Low", "High"]);
        assert!(matches!(
            preset.normalize_default(),
            Err(SettingError::OutOfRange { .. })
        ));

        let mut volume = Setting::slider("Audio", "Volume", "Music", 0.62, 0.0, 1.0).with_step(0.25);
        volume.normalize_default().unwrap();
        assert_eq!(volume.default_value(), &SettingValue::Float(0.5));
        assert_eq!(volume.value(), &SettingValue::Float(0.5));
    }

    #[test]
    fn test_radio_range() {
        let mut setting = Setting::radio("Video", "Quality", "Preset", 1, ["Low", "Medium", "High"]);
        assert!(setting.set_value_silent(SettingValue::Enum(2)).is_ok());
        assert!(matches!(
            setting.set_value_silent(SettingValue::Enum(3)),
            Err(SettingError::OutOfRange { .. })
        ));
        assert_eq!(setting.get::<EnumValue>().unwrap(), EnumValue(2));
    }

    #[test]
    fn test_language_must_be_offered() {
        let mut setting = Setting::language("General", "Locale", "Language", "en", ["en", "de"]);
        assert!(setting.set_value_silent(SettingValue::Text("de".into())).is_ok());
        assert!(setting.set_value_silent(SettingValue::Text("fr".into())).is_err());
    }

    #[test]
    fn test_binding_rules_enforced() {
        let mut setting = Setting::key_binding(
            "Controls",
            "Movement",
            "Jump",
            KeyBinding::key(KeyCode::SPACE),
        )
        .with_binding_rules(BindingRules {
            allow_modifiers: false,
            ..BindingRules::default()
        });

        let rejected = KeyBinding::new(KeyCode::SPACE, Modifiers::CTRL);
        assert!(matches!(
            setting.set_value_silent(SettingValue::KeyBinding(rejected)),
            Err(SettingError::BindingRejected { .. })
        ));
        assert!(setting
            .set_value_silent(SettingValue::KeyBinding(KeyBinding::NONE))
            .unwrap());
    }

    #[test]
    fn test_silent_set_reports_change() {
        let mut setting = Setting::toggle("Video", "Display", "VSync", true);
        assert!(!setting.set_value_silent(SettingValue::Bool(true)).unwrap());
        assert!(setting.set_value_silent(SettingValue::Bool(false)).unwrap());
    }

    #[test]
    fn test_temp_save() {
        let mut setting = Setting::int_slider("Video", "Display", "FPS Cap", 60, 30, 240);
        setting.temp_save_value();
        setting.set_value_silent(SettingValue::Int(144)).unwrap();
        assert_eq!(setting.temp_saved_value(), Some(&SettingValue::Int(60)));
        assert_eq!(setting.take_temp_saved(), Some(SettingValue::Int(60)));
        assert_eq!(setting.temp_saved_value(), None);
    }

    #[test]
    fn test_binding_identity() {
        let jump = KeyBinding::key(KeyCode::SPACE);
        let mut setting = Setting::key_binding("Controls", "Movement", "Jump", jump).draggable();
        setting
            .set_value_silent(SettingValue::KeyBinding(KeyBinding::key(KeyCode::from_char('j'))))
            .unwrap();
        assert_eq!(setting.default_binding(), Some(jump));
        assert_ne!(setting.current_binding(), Some(jump));
        assert!(setting.options().drag_enabled());
        assert!(!setting.allow_invoke_events());
    }
}
