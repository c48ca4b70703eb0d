//! Flat persisted snapshot of setting values

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A persisted scalar, one per saveable setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Int(i32),
    Float(f32),
    Bool(bool),
    Text(String),
}

/// The plain-data record a document store loads and saves as a unit
///
/// ```json
/// {
///   "ints": { "jump": 32, "quality": 2 },
///   "floats": { "master_volume": 0.8 },
///   "bools": { "fullscreen": true },
///   "strings": { "language": "en" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    #[serde(default)]
    pub ints: BTreeMap<String, i32>,
    #[serde(default)]
    pub floats: BTreeMap<String, f32>,
    #[serde(default)]
    pub bools: BTreeMap<String, bool>,
    #[serde(default)]
    pub strings: BTreeMap<String, String>,
}

impl SettingsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key` in the map matching its kind
    pub fn insert(&mut self, key: impl Into<String>, value: ScalarValue) {
        let key = key.into();
        match value {
            ScalarValue::Int(v) => {
                self.ints.insert(key, v);
            }
            ScalarValue::Float(v) => {
                self.floats.insert(key, v);
            }
            ScalarValue::Bool(v) => {
                self.bools.insert(key, v);
            }
            ScalarValue::Text(v) => {
                self.strings.insert(key, v);
            }
        }
    }

    pub fn int(&self, key: &str) -> Option<ScalarValue> {
        self.ints.get(key).copied().map(ScalarValue::Int)
    }

    pub fn float(&self, key: &str) -> Option<ScalarValue> {
        self.floats.get(key).copied().map(ScalarValue::Float)
    }

    pub fn bool(&self, key: &str) -> Option<ScalarValue> {
        self.bools.get(key).copied().map(ScalarValue::Bool)
    }

    pub fn string(&self, key: &str) -> Option<ScalarValue> {
        self.strings.get(key).cloned().map(ScalarValue::Text)
    }

    pub fn len(&self) -> usize {
        self.ints.len() + self.floats.len() + self.bools.len() + self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
