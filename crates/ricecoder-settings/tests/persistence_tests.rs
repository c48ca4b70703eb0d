//! Load/save orchestration against the in-memory and JSON file stores

use std::sync::{Arc, Mutex};

use ricecoder_settings::*;

fn settings() -> Vec<Setting> {
    vec![
        Setting::slider("Audio", "Volume", "Master Volume", 0.8, 0.0, 1.0),
        Setting::toggle("Video", "Display", "Fullscreen", false),
        Setting::radio("Video", "Quality", "Preset", 1, ["Low", "Medium", "High"]),
        Setting::language("General", "Locale", "Language", "en", ["en", "de", "fr"]),
        Setting::key_binding("Controls", "Movement", "Jump", KeyBinding::key(KeyCode::SPACE)),
        Setting::button("General", "Data", "Reset Progress"),
    ]
}

fn persisted() -> SettingsSnapshot {
    let mut snapshot = SettingsSnapshot::new();
    snapshot.insert("master_volume", ScalarValue::Float(0.25));
    snapshot.insert("fullscreen", ScalarValue::Bool(true));
    snapshot.insert("preset", ScalarValue::Int(2));
    snapshot.insert("language", ScalarValue::Text("de".to_string()));
    let jump = KeyBinding::new(KeyCode::from_char('j'), Modifiers::ALT);
    snapshot.insert("jump", ScalarValue::Int(jump.packed() as i32));
    snapshot
}

#[tokio::test]
async fn test_load_applies_snapshot_without_writing() {
    let store = Arc::new(MemoryDocumentStore::with_snapshot(persisted()));
    let mut registry = SettingsRegistry::new(RegistryConfig::default(), store.clone());
    registry.register_all(settings());

    let changed = registry.load().await.unwrap();

    assert_eq!(changed, 5);
    assert_eq!(registry.value::<f32>("master_volume").unwrap(), 0.25);
    assert!(registry.value::<bool>("fullscreen").unwrap());
    assert_eq!(registry.value::<EnumValue>("preset").unwrap(), EnumValue(2));
    assert_eq!(registry.value::<String>("language").unwrap(), "de");
    let jump = KeyBinding::new(KeyCode::from_char('j'), Modifiers::ALT);
    assert_eq!(registry.value::<KeyBinding>("jump").unwrap(), jump);
    assert_eq!(registry.binding_for(KeyBinding::key(KeyCode::SPACE)), Some(jump));

    assert!(!store.is_dirty());
    assert!(!registry.save().await.unwrap());
    assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn test_load_notifies_every_non_button_once() {
    let store = Arc::new(MemoryDocumentStore::with_snapshot(persisted()));
    let mut registry = SettingsRegistry::new(RegistryConfig::default(), store);
    registry.register_all(settings());

    let seen = Arc::new(Mutex::new(Vec::new()));
    for key in ["master_volume", "fullscreen", "preset", "language", "jump", "reset_progress"] {
        let sink = seen.clone();
        registry.subscribe_setting(key, move |e: &SettingChanged| {
            sink.lock().unwrap().push(e.key.clone())
        });
    }

    // Gated until the load completes
    registry.set_value("fullscreen", true).unwrap();
    assert!(seen.lock().unwrap().is_empty());

    registry.load().await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec!["master_volume", "fullscreen", "preset", "language", "jump"]
    );
    assert!(registry.events_enabled());
}

#[tokio::test]
async fn test_failed_load_keeps_defaults_and_opens_gate() {
    let store = Arc::new(MemoryDocumentStore::with_snapshot(persisted()));
    store.fail_loads(true);
    let mut registry = SettingsRegistry::new(RegistryConfig::default(), store.clone());
    registry.register_all(settings());

    assert!(matches!(registry.load().await, Err(PersistenceError::Store(_))));
    assert_eq!(registry.value::<f32>("master_volume").unwrap(), 0.8);
    assert!(registry.get("fullscreen").unwrap().allow_invoke_events());

    // Saving before any successful load is refused
    registry.set_value("fullscreen", true).unwrap();
    assert!(matches!(
        registry.save().await,
        Err(PersistenceError::NotLoaded)
    ));
}

#[tokio::test]
async fn test_edit_before_load_survives_to_save() {
    let mut snapshot = SettingsSnapshot::new();
    snapshot.insert("preset", ScalarValue::Int(2));
    let store = Arc::new(MemoryDocumentStore::with_snapshot(snapshot));
    let mut registry = SettingsRegistry::new(RegistryConfig::default(), store.clone());
    registry.register_all(settings());

    registry.set_value("fullscreen", true).unwrap();
    registry.set_value("preset", EnumValue(0)).unwrap();
    registry.load().await.unwrap();

    // The snapshot wins where it has a value, the edit is kept elsewhere
    assert_eq!(registry.value::<EnumValue>("preset").unwrap(), EnumValue(2));
    assert!(registry.value::<bool>("fullscreen").unwrap());
    assert!(store.is_dirty());

    assert!(registry.save().await.unwrap());
    let saved = store.persisted();
    assert_eq!(saved.bool("fullscreen"), Some(ScalarValue::Bool(true)));
    assert_eq!(saved.int("preset"), Some(ScalarValue::Int(2)));
}

#[tokio::test]
async fn test_save_is_idempotent() {
    let store = Arc::new(MemoryDocumentStore::new());
    let mut registry = SettingsRegistry::new(RegistryConfig::default(), store.clone());
    registry.register_all(settings());
    registry.load().await.unwrap();

    registry.set_value("master_volume", 0.5f32).unwrap();
    assert!(store.is_dirty());

    assert!(registry.save().await.unwrap());
    assert!(!registry.save().await.unwrap());
    assert_eq!(store.save_count(), 1);

    let saved = store.persisted();
    assert_eq!(saved.float("master_volume"), Some(ScalarValue::Float(0.5)));
    // Every persisted setting is pushed, buttons never are
    assert_eq!(saved.len(), 5);
    assert_eq!(saved.bool("reset_progress"), None);
}

#[tokio::test]
async fn test_unusable_snapshot_entries_are_ignored() {
    let mut snapshot = SettingsSnapshot::new();
    snapshot.insert("preset", ScalarValue::Int(9));
    snapshot.insert("language", ScalarValue::Text("xx".to_string()));
    snapshot.insert("fullscreen", ScalarValue::Int(1));
    snapshot.insert("unknown_setting", ScalarValue::Bool(true));

    let store = Arc::new(MemoryDocumentStore::with_snapshot(snapshot));
    let mut registry = SettingsRegistry::new(RegistryConfig::default(), store);
    registry.register_all(settings());

    assert_eq!(registry.load().await.unwrap(), 0);
    assert_eq!(registry.value::<EnumValue>("preset").unwrap(), EnumValue(1));
    assert_eq!(registry.value::<String>("language").unwrap(), "en");
    assert!(!registry.value::<bool>("fullscreen").unwrap());
}

#[tokio::test]
async fn test_failed_save_stays_dirty() {
    let store = Arc::new(MemoryDocumentStore::new());
    let mut registry = SettingsRegistry::new(RegistryConfig::default(), store.clone());
    registry.register_all(settings());
    registry.load().await.unwrap();

    registry.set_value("fullscreen", true).unwrap();
    store.fail_saves(true);
    assert!(registry.save().await.is_err());
    assert!(store.is_dirty());

    store.fail_saves(false);
    assert!(registry.save().await.unwrap());
}

#[tokio::test]
async fn test_json_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.json");

    {
        let store = Arc::new(JsonFileStore::new(&path));
        let mut registry = SettingsRegistry::new(RegistryConfig::default(), store);
        registry.register_all(settings());
        registry.load().await.unwrap();

        registry.set_value("language", "fr".to_string()).unwrap();
        registry
            .set_value("jump", KeyBinding::new(KeyCode::ENTER, Modifiers::CTRL | Modifiers::SHIFT))
            .unwrap();
        assert!(registry.save().await.unwrap());
    }

    let content = std::fs::read_to_string(&path).unwrap();
    let on_disk: SettingsSnapshot = serde_json::from_str(&content).unwrap();
    assert_eq!(on_disk.string("language"), Some(ScalarValue::Text("fr".to_string())));

    let store = Arc::new(JsonFileStore::new(&path));
    let mut registry = SettingsRegistry::new(RegistryConfig::default(), store);
    registry.register_all(settings());
    registry.load().await.unwrap();

    assert_eq!(registry.value::<String>("language").unwrap(), "fr");
    assert_eq!(
        registry.value::<KeyBinding>("jump").unwrap().to_string(),
        "Ctrl+Shift+Enter"
    );
}

#[tokio::test]
async fn test_save_future_can_be_spawned() {
    let store = Arc::new(MemoryDocumentStore::new());
    let mut registry = SettingsRegistry::new(RegistryConfig::default(), store.clone());
    registry.register_all(settings());
    registry.load().await.unwrap();
    registry.set_value("fullscreen", true).unwrap();

    let saved = tokio::spawn(registry.save()).await.unwrap().unwrap();
    assert!(saved);
    assert_eq!(store.persisted().bool("fullscreen"), Some(ScalarValue::Bool(true)));
}
