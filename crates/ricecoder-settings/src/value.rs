//! Setting values
//!
//! Every setting holds one [`SettingValue`]. The variant a setting is created
//! with is its declared [`ValueType`] and never changes; typed access goes
//! through the [`SettingType`] trait.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::binding::KeyBinding;
use crate::snapshot::ScalarValue;

/// Declared type of a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Int,
    Float,
    Bool,
    Text,
    KeyBinding,
    Enum,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Int => write!(f, "int"),
            ValueType::Float => write!(f, "float"),
            ValueType::Bool => write!(f, "bool"),
            ValueType::Text => write!(f, "text"),
            ValueType::KeyBinding => write!(f, "key_binding"),
            ValueType::Enum => write!(f, "enum"),
        }
    }
}

/// Current, default or saved value of a setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SettingValue {
    Int(i32),
    Float(f32),
    Bool(bool),
    Text(String),
    KeyBinding(KeyBinding),
    /// Index into a fixed list of options
    Enum(i32),
}

impl SettingValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            SettingValue::Int(_) => ValueType::Int,
            SettingValue::Float(_) => ValueType::Float,
            SettingValue::Bool(_) => ValueType::Bool,
            SettingValue::Text(_) => ValueType::Text,
            SettingValue::KeyBinding(_) => ValueType::KeyBinding,
            SettingValue::Enum(_) => ValueType::Enum,
        }
    }

    pub fn as_key_binding(&self) -> Option<KeyBinding> {
        match self {
            SettingValue::KeyBinding(binding) => Some(*binding),
            _ => None,
        }
    }

    /// Persisted scalar form. Key bindings store their packed value bit-cast to `i32`.
    pub fn to_scalar(&self) -> ScalarValue {
        match self {
            SettingValue::Int(v) | SettingValue::Enum(v) => ScalarValue::Int(*v),
            SettingValue::Float(v) => ScalarValue::Float(*v),
            SettingValue::Bool(v) => ScalarValue::Bool(*v),
            SettingValue::Text(v) => ScalarValue::Text(v.clone()),
            SettingValue::KeyBinding(b) => ScalarValue::Int(b.packed() as i32),
        }
    }

    /// Rebuild a value of `value_type` from its persisted scalar form
    pub fn from_scalar(value_type: ValueType, scalar: &ScalarValue) -> Option<Self> {
        let value = match (value_type, scalar) {
            (ValueType::Int, ScalarValue::Int(v)) => SettingValue::Int(*v),
            (ValueType::Enum, ScalarValue::Int(v)) => SettingValue::Enum(*v),
            (ValueType::KeyBinding, ScalarValue::Int(v)) => {
                SettingValue::KeyBinding(KeyBinding::from_packed(*v as u32))
            }
            (ValueType::Float, ScalarValue::Float(v)) => SettingValue::Float(*v),
            (ValueType::Bool, ScalarValue::Bool(v)) => SettingValue::Bool(*v),
            (ValueType::Text, ScalarValue::Text(v)) => SettingValue::Text(v.clone()),
            _ => return None,
        };
        Some(value)
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Int(v) | SettingValue::Enum(v) => write!(f, "{}", v),
            SettingValue::Float(v) => write!(f, "{}", v),
            SettingValue::Bool(v) => write!(f, "{}", v),
            SettingValue::Text(v) => write!(f, "{}", v),
            SettingValue::KeyBinding(b) => write!(f, "{}", b),
        }
    }
}

/// Index of the selected option of a radio setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnumValue(pub i32);

/// Rust types that map onto exactly one [`ValueType`]
pub trait SettingType: Sized {
    const VALUE_TYPE: ValueType;

    fn into_value(self) -> SettingValue;

    fn from_value(value: &SettingValue) -> Option<Self>;
}

macro_rules! impl_setting_type {
    ($ty:ty, $variant:ident) => {
        impl SettingType for $ty {
            const VALUE_TYPE: ValueType = ValueType::$variant;

            fn into_value(self) -> SettingValue {
                SettingValue::$variant(self)
            }

            fn from_value(value: &SettingValue) -> Option<Self> {
                match value {
                    SettingValue::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

impl_setting_type!(i32, Int);
impl_setting_type!(f32, Float);
impl_setting_type!(bool, Bool);
impl_setting_type!(String, Text);
impl_setting_type!(KeyBinding, KeyBinding);

impl SettingType for EnumValue {
    const VALUE_TYPE: ValueType = ValueType::Enum;

    fn into_value(self) -> SettingValue {
        SettingValue::Enum(self.0)
    }

    fn from_value(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Enum(v) => Some(EnumValue(*v)),
            _ => None,
        }
    }
}

impl<T: SettingType> From<T> for SettingValue {
    fn from(value: T) -> Self {
        value.into_value()
    }
}
