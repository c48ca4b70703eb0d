//! Typed, persisted settings with rebindable key bindings
//!
//! This crate provides the settings engine for ricecoder with:
//! - Key bindings packed into a single integer (8 modifier bits, 24 key bits)
//! - Typed settings with per-kind validation and change notifications
//! - Conflict resolution when a key binding is reassigned
//! - A per-frame polling state machine raising down/held/up/click/drag events
//! - Asynchronous load/save through a pluggable document store
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ricecoder_settings::{
//!     InputFrame, KeyBinding, KeyCode, MemoryDocumentStore, RegistryConfig, Setting,
//!     SettingsRegistry,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let jump = KeyBinding::key(KeyCode::SPACE);
//! let mut registry =
//!     SettingsRegistry::new(RegistryConfig::default(), Arc::new(MemoryDocumentStore::new()));
//! registry.register_all([
//!     Setting::key_binding("Controls", "Movement", "Jump", jump),
//!     Setting::slider("Audio", "Volume", "Master Volume", 0.8, 0.0, 1.0),
//! ]);
//! registry.load().await?;
//!
//! let mut input = InputFrame::new();
//! input.press(KeyCode::SPACE);
//! for fired in registry.poll(0.016, &input) {
//!     println!("{} {:?}", fired.binding, fired.event);
//! }
//!
//! registry.set_value("master_volume", 0.5f32)?;
//! registry.save().await?;
//! # Ok(())
//! # }
//! ```

pub mod binding;
pub mod config;
pub mod conflict;
pub mod error;
pub mod events;
pub mod input;
pub mod options;
mod polling;
pub mod registry;
pub mod setting;
pub mod snapshot;
pub mod store;
pub mod value;

// Re-export public types
pub use binding::{KeyBinding, KeyCode, Modifier, Modifiers};
pub use config::RegistryConfig;
pub use conflict::{ClearedBinding, Conflict, ConflictDetector, ConflictKind};
pub use error::{ConfigError, ParseError, PersistenceError, RegistryError, SettingError};
pub use events::{BindingEvent, FiredEvent, SettingChanged, Subscription};
pub use input::{InputFrame, InputSource, Vec2};
pub use options::{BindingRules, SettingKind, SettingOptions};
pub use registry::{ActiveBinding, CategoryView, DragPhase, DragState, GroupView, SettingsRegistry};
pub use setting::Setting;
pub use snapshot::{ScalarValue, SettingsSnapshot};
pub use store::{DocumentStore, JsonFileStore, MemoryDocumentStore};
pub use value::{EnumValue, SettingType, SettingValue, ValueType};
