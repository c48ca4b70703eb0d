//! Settings registry
//!
//! Owns every registered [`Setting`], the binding table derived from the
//! key-binding settings, and the per-binding gesture state driven by
//! [`SettingsRegistry::poll`].
//!
//! Every successful write goes through the same pipeline: the value is
//! applied, binding conflicts are resolved (key bindings only), listeners are
//! notified, and the store is updated. Values applied from a loaded snapshot
//! take the silent path and never reach the store.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::binding::KeyBinding;
use crate::config::RegistryConfig;
use crate::conflict::{self, Conflict, ConflictDetector};
use crate::error::{PersistenceError, RegistryError, SettingError};
use crate::events::{BindingEvent, FiredEvent, ListenerSet, SettingChanged, Subscription};
use crate::input::Vec2;
use crate::setting::Setting;
use crate::snapshot::{ScalarValue, SettingsSnapshot};
use crate::store::DocumentStore;
use crate::value::{SettingType, SettingValue, ValueType};

static PROCESS_REGISTRY: AtomicBool = AtomicBool::new(false);

/// Held by the registry created through [`SettingsRegistry::for_process`]
#[derive(Debug)]
struct ProcessClaim;

impl Drop for ProcessClaim {
    fn drop(&mut self) {
        PROCESS_REGISTRY.store(false, Ordering::SeqCst);
    }
}

/// A binding whose key combination is currently held
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveBinding {
    /// The current binding at the time it went down
    pub current: KeyBinding,
    pub held_for: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// Waiting for the pointer to leave the threshold radius
    Measuring,
    Active,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub phase: DragPhase,
    pub start: Vec2,
    /// Pointer position as of the last poll
    pub current: Vec2,
    /// Key of the owning setting
    pub owner: String,
}

/// One category of settings with its groups, in registration order
#[derive(Debug)]
pub struct CategoryView<'a> {
    pub name: &'a str,
    pub groups: Vec<GroupView<'a>>,
}

#[derive(Debug)]
pub struct GroupView<'a> {
    pub name: &'a str,
    pub settings: Vec<&'a Setting>,
}

/// Registry of typed, persisted settings and their key bindings
pub struct SettingsRegistry {
    pub(crate) config: RegistryConfig,
    store: Arc<dyn DocumentStore>,
    pub(crate) settings: HashMap<String, Setting>,
    pub(crate) order: Vec<String>,
    /// Default binding (identity) to current binding
    binding_table: HashMap<KeyBinding, KeyBinding>,
    pub(crate) active_bindings: HashMap<KeyBinding, ActiveBinding>,
    pub(crate) drag_states: HashMap<KeyBinding, DragState>,
    setting_listeners: ListenerSet<String, SettingChanged>,
    pub(crate) binding_listeners: ListenerSet<KeyBinding, BindingEvent>,
    events_enabled: bool,
    _claim: Option<ProcessClaim>,
}

impl SettingsRegistry {
    /// Create a registry writing through `store`
    pub fn new(config: RegistryConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config,
            store,
            settings: HashMap::new(),
            order: Vec::new(),
            binding_table: HashMap::new(),
            active_bindings: HashMap::new(),
            drag_states: HashMap::new(),
            setting_listeners: ListenerSet::new(),
            binding_listeners: ListenerSet::new(),
            events_enabled: false,
            _claim: None,
        }
    }

    /// Create the process-wide registry
    ///
    /// Fails with [`RegistryError::AlreadyCreated`] while another registry
    /// created this way is alive.
    pub fn for_process(
        config: RegistryConfig,
        store: Arc<dyn DocumentStore>,
    ) -> Result<Self, RegistryError> {
        if PROCESS_REGISTRY
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(RegistryError::AlreadyCreated);
        }
        let mut registry = Self::new(config, store);
        registry._claim = Some(ProcessClaim);
        Ok(registry)
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Register a batch of settings
    ///
    /// Defaults are normalized under their setting's kind first. Settings
    /// whose default the kind rejects, or whose key or default binding is
    /// already registered, are skipped and reported. Returns the skipped
    /// registrations.
    pub fn register_all(
        &mut self,
        settings: impl IntoIterator<Item = Setting>,
    ) -> Vec<RegistryError> {
        let mut skipped = Vec::new();
        let mut added = 0;

        for mut setting in settings {
            let checked = setting
                .normalize_default()
                .map_err(|e| RegistryError::InvalidDefault {
                    key: setting.key().to_string(),
                    reason: e.to_string(),
                })
                .and_then(|()| self.check_registration(&setting));
            if let Err(e) = checked {
                warn!("Skipping setting {}: {}", setting.key(), e);
                skipped.push(e);
                continue;
            }
            setting.set_allow_invoke_events(self.events_enabled);
            debug!("Registered setting {}", setting.key());
            self.order.push(setting.key().to_string());
            self.settings.insert(setting.key().to_string(), setting);
            added += 1;
        }

        self.rebuild_binding_table();
        debug!("Registered {} settings ({} skipped)", added, skipped.len());
        skipped
    }

    fn check_registration(&self, setting: &Setting) -> Result<(), RegistryError> {
        if self.settings.contains_key(setting.key()) {
            return Err(RegistryError::DuplicateKey(setting.key().to_string()));
        }
        let Some(identity) = setting.default_binding() else {
            return Ok(());
        };
        if identity.is_none() {
            return Err(RegistryError::UnboundDefault(setting.key().to_string()));
        }
        if let Some(existing) = self.setting_for_binding(identity) {
            return Err(RegistryError::DuplicateBinding {
                binding: identity.to_string(),
                existing: existing.key().to_string(),
            });
        }
        Ok(())
    }

    /// Recompute the binding table from the current binding values
    pub(crate) fn rebuild_binding_table(&mut self) {
        self.binding_table = self
            .settings
            .values()
            .filter_map(|s| Some((s.default_binding()?, s.current_binding()?)))
            .collect();
    }

    /// Open the notification gate on every setting
    ///
    /// `load` does this once the snapshot is applied; hosts running without
    /// persistence call it after registration.
    pub fn enable_events(&mut self) {
        self.events_enabled = true;
        for setting in self.settings.values_mut() {
            setting.set_allow_invoke_events(true);
        }
    }

    pub fn events_enabled(&self) -> bool {
        self.events_enabled
    }

    pub fn get(&self, key: &str) -> Option<&Setting> {
        self.settings.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.settings.contains_key(key)
    }

    /// All settings in registration order
    pub fn settings(&self) -> impl Iterator<Item = &Setting> {
        self.order.iter().filter_map(|key| self.settings.get(key))
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Typed read of a setting's current value
    pub fn value<T: SettingType>(&self, key: &str) -> Result<T, SettingError> {
        self.settings
            .get(key)
            .ok_or_else(|| SettingError::NotFound(key.to_string()))?
            .get::<T>()
    }

    /// Category names in order of first registration
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for setting in self.settings() {
            if !categories.contains(&setting.category()) {
                categories.push(setting.category());
            }
        }
        categories
    }

    /// Settings grouped by category, then group, in registration order
    pub fn grouped(&self) -> Vec<CategoryView<'_>> {
        let mut categories: Vec<CategoryView<'_>> = Vec::new();
        for setting in self.settings() {
            let index = match categories.iter().position(|c| c.name == setting.category()) {
                Some(index) => index,
                None => {
                    categories.push(CategoryView {
                        name: setting.category(),
                        groups: Vec::new(),
                    });
                    categories.len() - 1
                }
            };
            let groups = &mut categories[index].groups;
            match groups.iter().position(|g| g.name == setting.group()) {
                Some(group) => groups[group].settings.push(setting),
                None => groups.push(GroupView {
                    name: setting.group(),
                    settings: vec![setting],
                }),
            }
        }
        categories
    }

    /// Current binding for the action identified by `default`
    pub fn binding_for(&self, default: KeyBinding) -> Option<KeyBinding> {
        self.binding_table.get(&default).copied()
    }

    /// The key-binding setting whose identity is `default`
    pub fn setting_for_binding(&self, default: KeyBinding) -> Option<&Setting> {
        self.settings()
            .find(|s| s.default_binding() == Some(default))
    }

    /// Pairs of current bindings that would conflict if assigned now
    pub fn binding_conflicts(&self) -> Vec<Conflict> {
        ConflictDetector::detect(self.settings())
    }

    pub fn is_binding_active(&self, default: KeyBinding) -> bool {
        self.active_bindings.contains_key(&default)
    }

    pub fn active_binding(&self, default: KeyBinding) -> Option<&ActiveBinding> {
        self.active_bindings.get(&default)
    }

    pub fn drag_state(&self, default: KeyBinding) -> Option<&DragState> {
        self.drag_states.get(&default)
    }

    /// Assign a value through the full pipeline. Returns whether it changed.
    pub fn set_value(
        &mut self,
        key: &str,
        value: impl Into<SettingValue>,
    ) -> Result<bool, SettingError> {
        let setting = self
            .settings
            .get_mut(key)
            .ok_or_else(|| SettingError::NotFound(key.to_string()))?;

        let changed = match setting.set_value_silent(value.into()) {
            Ok(changed) => changed,
            Err(e) => {
                error!("Rejected write to {}: {}", key, e);
                return Err(e);
            }
        };
        if !changed {
            return Ok(false);
        }

        let identity = setting.default_binding();
        let current = setting.current_binding();
        if let (Some(identity), Some(current)) = (identity, current) {
            self.cancel_gesture(identity);
            let cleared = conflict::resolve(
                &mut self.settings,
                &self.order,
                &mut self.binding_table,
                identity,
                current,
            );
            for cleared in cleared {
                info!(
                    "Cleared binding {} of {} ({:?} conflict with {})",
                    cleared.previous, cleared.key, cleared.kind, current
                );
                self.cancel_gesture(cleared.identity);
                self.notify(&cleared.key);
                self.persist(&cleared.key);
            }
        }

        self.notify(key);
        self.persist(key);
        Ok(true)
    }

    /// Remember the current value so it can be restored by [`temp_restore`]
    ///
    /// [`temp_restore`]: SettingsRegistry::temp_restore
    pub fn temp_save(&mut self, key: &str) -> Result<(), SettingError> {
        self.settings
            .get_mut(key)
            .ok_or_else(|| SettingError::NotFound(key.to_string()))?
            .temp_save_value();
        Ok(())
    }

    /// Restore the temp-saved value through the public setter path
    pub fn temp_restore(&mut self, key: &str) -> Result<bool, SettingError> {
        let saved = self
            .settings
            .get_mut(key)
            .ok_or_else(|| SettingError::NotFound(key.to_string()))?
            .take_temp_saved();
        match saved {
            Some(value) => self.set_value(key, value),
            None => Ok(false),
        }
    }

    pub fn reset(&mut self, key: &str) -> Result<bool, SettingError> {
        let default = self
            .settings
            .get(key)
            .ok_or_else(|| SettingError::NotFound(key.to_string()))?
            .default_value()
            .clone();
        self.set_value(key, default)
    }

    /// Reset every setting to its default. Returns how many changed.
    pub fn reset_to_defaults(&mut self) -> usize {
        let keys = self.order.clone();
        let mut changed = 0;
        for key in keys {
            match self.reset(&key) {
                Ok(true) => changed += 1,
                Ok(false) => {}
                Err(e) => warn!("Could not reset {}: {}", key, e),
            }
        }
        changed
    }

    /// Fire a button's change notification
    pub fn trigger_button(&mut self, key: &str) -> Result<(), SettingError> {
        let setting = self
            .settings
            .get(key)
            .ok_or_else(|| SettingError::NotFound(key.to_string()))?;
        if !setting.options().is_button() {
            return Err(SettingError::NotAButton(key.to_string()));
        }
        self.notify(key);
        Ok(())
    }

    /// Remove a setting, ending any gesture on its binding
    pub fn remove(&mut self, key: &str) -> Option<Setting> {
        let setting = self.settings.get(key)?;
        if let Some(identity) = setting.default_binding() {
            self.cancel_gesture(identity);
            self.binding_table.remove(&identity);
            self.binding_listeners.remove_key(&identity);
        }
        self.setting_listeners.remove_key(&key.to_string());
        self.order.retain(|k| k != key);
        self.settings.remove(key)
    }

    /// Remove every setting and listener
    pub fn clear(&mut self) {
        let held: Vec<KeyBinding> = self.active_bindings.keys().copied().collect();
        for identity in held {
            self.cancel_gesture(identity);
        }
        self.settings.clear();
        self.order.clear();
        self.binding_table.clear();
        self.setting_listeners.clear();
        self.binding_listeners.clear();
    }

    pub fn subscribe_setting(
        &mut self,
        key: impl Into<String>,
        listener: impl FnMut(&SettingChanged) + Send + 'static,
    ) -> Subscription {
        Subscription::Setting(self.setting_listeners.subscribe(key.into(), Box::new(listener)))
    }

    /// Listen for polling events of the action identified by `default`
    pub fn subscribe_binding(
        &mut self,
        default: KeyBinding,
        listener: impl FnMut(&BindingEvent) + Send + 'static,
    ) -> Subscription {
        Subscription::Binding(self.binding_listeners.subscribe(default, Box::new(listener)))
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        match subscription {
            Subscription::Setting(id) => self.setting_listeners.unsubscribe(id),
            Subscription::Binding(id) => self.binding_listeners.unsubscribe(id),
        }
    }

    fn notify(&mut self, key: &str) {
        let Some(setting) = self.settings.get(key) else {
            return;
        };
        if !setting.allow_invoke_events() {
            return;
        }
        let event = SettingChanged {
            key: key.to_string(),
            value: setting.value().clone(),
        };
        self.setting_listeners.emit(&event.key, &event);
    }

    fn persist(&self, key: &str) {
        let Some(setting) = self.settings.get(key) else {
            return;
        };
        if !setting.options().is_persisted() {
            return;
        }
        let scalar = setting.value().to_scalar();
        self.store
            .mutate(&mut |snapshot: &mut SettingsSnapshot| snapshot.insert(key, scalar.clone()));
    }

    /// End an in-flight gesture: `Up`, then `DragEnd` if the drag was active
    pub(crate) fn cancel_gesture(&mut self, identity: KeyBinding) {
        if self.active_bindings.remove(&identity).is_none() {
            self.drag_states.remove(&identity);
            return;
        }
        let mut fired = vec![FiredEvent {
            binding: identity,
            event: BindingEvent::Up,
        }];
        if let Some(drag) = self.drag_states.remove(&identity) {
            if drag.phase == DragPhase::Active {
                fired.push(FiredEvent {
                    binding: identity,
                    event: BindingEvent::DragEnd {
                        start: drag.start,
                        current: drag.current,
                    },
                });
            }
        }
        debug!("Cancelled gesture on {}", identity);
        self.dispatch(&fired);
    }

    pub(crate) fn dispatch(&mut self, fired: &[FiredEvent]) {
        for event in fired {
            self.binding_listeners.emit(&event.binding, &event.event);
        }
    }

    /// Fetch the persisted snapshot and apply it
    ///
    /// Values are applied silently, the binding table is rebuilt once, then
    /// every setting's notification gate opens and each non-button setting
    /// notifies once. Loaded values are not written back. A setting the
    /// snapshot does not cover keeps its value, and if that value was edited
    /// away from the default before the load it is pushed into the fresh
    /// working copy so the next save keeps it. On failure the settings keep
    /// their values and the gates open anyway.
    ///
    /// Returns the number of settings whose value changed.
    pub async fn load(&mut self) -> Result<usize, PersistenceError> {
        let snapshot = match self.store.load().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Failed to load settings: {}", e);
                self.enable_events();
                return Err(e);
            }
        };

        let staged = self.stage(&snapshot);

        let mut applied = 0;
        let mut covered = HashSet::new();
        let mut rebound = Vec::new();
        for (key, value) in staged {
            let Some(setting) = self.settings.get_mut(&key) else {
                continue;
            };
            match setting.set_value_silent(value) {
                Ok(changed) => {
                    if changed {
                        applied += 1;
                        if let Some(identity) = setting.default_binding() {
                            rebound.push(identity);
                        }
                    }
                    covered.insert(key);
                }
                Err(e) => warn!("Ignoring persisted value for {}: {}", key, e),
            }
        }

        self.rebuild_binding_table();
        for identity in rebound {
            self.cancel_gesture(identity);
        }

        self.enable_events();
        for key in self.order.clone() {
            let is_button = self
                .settings
                .get(&key)
                .is_some_and(|s| s.options().is_button());
            if !is_button {
                self.notify(&key);
            }
        }

        let uncovered: Vec<String> = self
            .settings()
            .filter(|s| s.options().is_persisted() && !covered.contains(s.key()))
            .filter(|s| s.value() != s.default_value())
            .map(|s| s.key().to_string())
            .collect();
        for key in uncovered {
            debug!("Keeping unsaved value of {} across load", key);
            self.persist(&key);
        }

        info!("Loaded settings ({} changed from defaults)", applied);
        Ok(applied)
    }

    /// Values in `snapshot` for persisted settings, keyed by the declared type
    fn stage(&self, snapshot: &SettingsSnapshot) -> Vec<(String, SettingValue)> {
        let mut staged = Vec::new();
        for setting in self.settings() {
            if !setting.options().is_persisted() {
                continue;
            }
            let key = setting.key();
            let scalar = match setting.value_type() {
                ValueType::Int | ValueType::Enum | ValueType::KeyBinding => snapshot.int(key),
                ValueType::Float => snapshot.float(key),
                ValueType::Bool => snapshot.bool(key),
                ValueType::Text => snapshot.string(key),
            };
            let Some(scalar) = scalar else {
                continue;
            };
            match SettingValue::from_scalar(setting.value_type(), &scalar) {
                Some(value) => staged.push((key.to_string(), value)),
                None => warn!("Persisted value for {} has the wrong type", key),
            }
        }
        staged
    }

    /// Push every persisted setting into the store and save it
    ///
    /// Resolves to `Ok(false)` without touching the store when nothing changed
    /// since the last load or save. The returned future does not borrow the
    /// registry, so it can be spawned.
    pub fn save(&self) -> impl Future<Output = Result<bool, PersistenceError>> + Send + 'static {
        let store = Arc::clone(&self.store);
        let entries: Vec<(String, ScalarValue)> = self
            .settings()
            .filter(|s| s.options().is_persisted())
            .map(|s| (s.key().to_string(), s.value().to_scalar()))
            .collect();

        async move {
            if !store.is_dirty() {
                debug!("Settings unchanged, skipping save");
                return Ok(false);
            }
            if !store.is_loaded() {
                return Err(PersistenceError::NotLoaded);
            }

            store.mutate(&mut |snapshot: &mut SettingsSnapshot| {
                for (key, value) in &entries {
                    snapshot.insert(key.clone(), value.clone());
                }
            });
            match store.save().await {
                Ok(()) => {
                    info!("Saved {} settings", entries.len());
                    Ok(true)
                }
                Err(e) => {
                    error!("Failed to save settings: {}", e);
                    Err(e)
                }
            }
        }
    }
}

impl std::fmt::Debug for SettingsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsRegistry")
            .field("config", &self.config)
            .field("settings", &self.order)
            .field("active_bindings", &self.active_bindings)
            .field("events_enabled", &self.events_enabled)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{KeyCode, Modifiers};
    use crate::options::BindingRules;
    use crate::store::MemoryDocumentStore;
    use std::sync::Mutex;

    fn registry() -> (SettingsRegistry, Arc<MemoryDocumentStore>) {
        let store = Arc::new(MemoryDocumentStore::new());
        let registry = SettingsRegistry::new(RegistryConfig::default(), store.clone());
        (registry, store)
    }

    #[test]
    fn test_register_and_lookup() {
        let (mut registry, _) = registry();
        let skipped = registry.register_all([
            Setting::toggle("Video", "Display", "Fullscreen", true),
            Setting::slider("Audio", "Volume", "Master Volume", 0.8, 0.0, 1.0),
        ]);
        assert!(skipped.is_empty());
        assert_eq!(registry.len(), 2);
        assert!(registry.value::<bool>("fullscreen").unwrap());
        assert_eq!(registry.value::<f32>("master_volume").unwrap(), 0.8);
        assert!(matches!(
            registry.value::<bool>("missing"),
            Err(SettingError::NotFound(_))
        ));
    }

    #[test]
    fn test_unbound_default_rejected() {
        let (mut registry, _) = registry();
        let skipped = registry.register_all([Setting::key_binding(
            "Controls",
            "Misc",
            "Screenshot",
            KeyBinding::NONE,
        )]);
        assert_eq!(
            skipped,
            vec![RegistryError::UnboundDefault("screenshot".to_string())]
        );
    }

    #[test]
    fn test_invalid_defaults_rejected() {
        let (mut registry, _) = registry();
        let skipped = registry.register_all([
            Setting::radio("Video", "Quality", "Preset", 7, ["Low", "High"]),
            Setting::key_binding("Controls", "Editing", "Select", KeyBinding::key(KeyCode::MOUSE_LEFT))
                .with_binding_rules(BindingRules {
                    allow_mouse: false,
                    ..Default::default()
                }),
            Setting::slider("Audio", "Volume", "Balance", 0.5, f32::NAN, 1.0),
            Setting::language("General", "Locale", "Language", "fr", ["en", "de"]),
        ]);

        assert_eq!(skipped.len(), 4);
        assert!(matches!(
            &skipped[0],
            RegistryError::InvalidDefault { key, .. } if key == "preset"
        ));
        assert!(skipped
            .iter()
            .all(|e| matches!(e, RegistryError::InvalidDefault { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_defaults_normalized_on_registration() {
        let (mut registry, _) = registry();
        registry.register_all([
            Setting::slider("Audio", "Volume", "Music", 1.7, 0.0, 1.0),
            Setting::int_slider("Video", "Display", "FPS Cap", 500, 240, 30),
        ]);
        assert_eq!(registry.value::<f32>("music").unwrap(), 1.0);
        assert_eq!(registry.value::<i32>("fps_cap").unwrap(), 240);
        assert!(!registry.reset("music").unwrap());
        assert_eq!(registry.reset_to_defaults(), 0);
    }

    #[test]
    fn test_notifications_gated_until_enabled() {
        let (mut registry, _) = registry();
        registry.register_all([Setting::toggle("Video", "Display", "VSync", true)]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        registry.subscribe_setting("v_sync", move |e: &SettingChanged| {
            sink.lock().unwrap().push(e.value.clone())
        });

        registry.set_value("v_sync", false).unwrap();
        assert!(seen.lock().unwrap().is_empty());

        registry.enable_events();
        registry.set_value("v_sync", true).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![SettingValue::Bool(true)]);
    }

    #[test]
    fn test_set_value_marks_store_dirty() {
        let (mut registry, store) = registry();
        registry.register_all([Setting::int_slider("Video", "Display", "FPS Cap", 60, 30, 240)]);
        assert!(!registry.set_value("fps_cap", 60).unwrap());
        assert!(!store.is_dirty());

        assert!(registry.set_value("fps_cap", 144).unwrap());
        assert!(store.is_dirty());
        assert_eq!(store.snapshot().int("fps_cap"), Some(ScalarValue::Int(144)));
    }

    #[test]
    fn test_unsaveable_setting_not_persisted() {
        let (mut registry, store) = registry();
        registry.register_all([
            Setting::toggle("Debug", "Overlay", "Show FPS", false).with_saveable(false)
        ]);
        registry.set_value("show_fps", true).unwrap();
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_binding_table_follows_rebinds() {
        let (mut registry, _) = registry();
        let jump = KeyBinding::key(KeyCode::SPACE);
        registry.register_all([Setting::key_binding("Controls", "Movement", "Jump", jump)]);
        assert_eq!(registry.binding_for(jump), Some(jump));

        let rebound = KeyBinding::new(KeyCode::from_char('j'), Modifiers::ALT);
        registry.set_value("jump", rebound).unwrap();
        assert_eq!(registry.binding_for(jump), Some(rebound));
        assert_eq!(registry.setting_for_binding(jump).unwrap().key(), "jump");
    }

    #[test]
    fn test_trigger_button() {
        let (mut registry, _) = registry();
        registry.register_all([
            Setting::button("General", "Data", "Reset Progress"),
            Setting::toggle("General", "Data", "Cloud Sync", false),
        ]);
        registry.enable_events();
        let count = Arc::new(Mutex::new(0));
        let sink = count.clone();
        registry.subscribe_setting("reset_progress", move |_: &SettingChanged| {
            *sink.lock().unwrap() += 1
        });

        registry.trigger_button("reset_progress").unwrap();
        assert_eq!(*count.lock().unwrap(), 1);
        assert!(matches!(
            registry.trigger_button("cloud_sync"),
            Err(SettingError::NotAButton(_))
        ));
    }
}
