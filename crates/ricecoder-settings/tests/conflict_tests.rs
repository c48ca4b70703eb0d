//! Rebinding conflict resolution through the registry

use std::sync::{Arc, Mutex};

use ricecoder_settings::*;

fn x() -> KeyCode {
    KeyCode::from_char('x')
}

fn controls() -> (SettingsRegistry, Arc<MemoryDocumentStore>) {
    let store = Arc::new(MemoryDocumentStore::new());
    let mut registry = SettingsRegistry::new(RegistryConfig::default(), store.clone());
    let skipped = registry.register_all([
        Setting::key_binding("Controls", "Combat", "Aim", KeyBinding::new(x(), Modifiers::SHIFT)),
        Setting::key_binding("Controls", "Combat", "Fire", KeyBinding::key(x())),
        Setting::key_binding(
            "Controls",
            "Movement",
            "Sprint",
            KeyBinding::key(KeyCode::from_char('c')),
        ),
        Setting::key_binding("Controls", "Movement", "Jump", KeyBinding::key(KeyCode::SPACE)),
    ]);
    assert!(skipped.is_empty());
    registry.enable_events();
    (registry, store)
}

#[test]
fn test_plain_shift_clears_shift_modified_binding() {
    let (mut registry, _) = controls();

    registry
        .set_value("sprint", KeyBinding::key(KeyCode::LEFT_SHIFT))
        .unwrap();

    assert_eq!(registry.value::<KeyBinding>("aim").unwrap(), KeyBinding::NONE);
    assert_eq!(registry.value::<KeyBinding>("fire").unwrap(), KeyBinding::key(x()));
    assert_eq!(
        registry.value::<KeyBinding>("sprint").unwrap(),
        KeyBinding::key(KeyCode::LEFT_SHIFT)
    );
    assert!(registry.binding_conflicts().is_empty());
}

#[test]
fn test_shift_modified_binding_clears_plain_shift() {
    let (mut registry, _) = controls();
    registry
        .set_value("sprint", KeyBinding::key(KeyCode::RIGHT_SHIFT))
        .unwrap();

    let aim = KeyBinding::new(KeyCode::from_char('a'), Modifiers::SHIFT);
    registry.set_value("aim", aim).unwrap();

    assert_eq!(registry.value::<KeyBinding>("sprint").unwrap(), KeyBinding::NONE);
    assert_eq!(registry.value::<KeyBinding>("aim").unwrap(), aim);
}

#[test]
fn test_exact_duplicate_keeps_most_recent() {
    let (mut registry, store) = controls();
    let space = KeyBinding::key(KeyCode::SPACE);

    registry.set_value("fire", space).unwrap();

    assert_eq!(registry.value::<KeyBinding>("fire").unwrap(), space);
    assert_eq!(registry.value::<KeyBinding>("jump").unwrap(), KeyBinding::NONE);
    assert_eq!(registry.binding_for(space), Some(KeyBinding::NONE));
    assert_eq!(registry.binding_for(KeyBinding::key(x())), Some(space));

    // Both the rebound and the cleared setting were written through
    let snapshot = store.snapshot();
    assert_eq!(snapshot.int("fire"), Some(ScalarValue::Int(space.packed() as i32)));
    assert_eq!(snapshot.int("jump"), Some(ScalarValue::Int(0)));
}

#[test]
fn test_cleared_settings_are_notified() {
    let (mut registry, _) = controls();
    let seen = Arc::new(Mutex::new(Vec::new()));
    for key in ["fire", "jump"] {
        let sink = seen.clone();
        registry.subscribe_setting(key, move |e: &SettingChanged| {
            sink.lock().unwrap().push((e.key.clone(), e.value.clone()))
        });
    }

    registry
        .set_value("fire", KeyBinding::key(KeyCode::SPACE))
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen.contains(&(
        "jump".to_string(),
        SettingValue::KeyBinding(KeyBinding::NONE)
    )));
    assert!(seen.contains(&(
        "fire".to_string(),
        SettingValue::KeyBinding(KeyBinding::key(KeyCode::SPACE))
    )));
}

#[test]
fn test_unbinding_clears_nothing_else() {
    let (mut registry, _) = controls();
    registry.set_value("fire", KeyBinding::NONE).unwrap();
    registry.set_value("jump", KeyBinding::NONE).unwrap();

    assert_eq!(
        registry.value::<KeyBinding>("aim").unwrap(),
        KeyBinding::new(x(), Modifiers::SHIFT)
    );
    assert_eq!(registry.binding_for(KeyBinding::key(x())), Some(KeyBinding::NONE));
}

#[test]
fn test_same_key_with_other_modifiers_coexists() {
    let (mut registry, _) = controls();
    registry
        .set_value("jump", KeyBinding::new(x(), Modifiers::CTRL))
        .unwrap();

    assert_eq!(registry.value::<KeyBinding>("fire").unwrap(), KeyBinding::key(x()));
    assert_eq!(
        registry.value::<KeyBinding>("aim").unwrap(),
        KeyBinding::new(x(), Modifiers::SHIFT)
    );
}

#[tokio::test]
async fn test_conflict_report_after_load() {
    let mut snapshot = SettingsSnapshot::new();
    snapshot.insert("jump", ScalarValue::Int(KeyBinding::key(x()).packed() as i32));
    let store = Arc::new(MemoryDocumentStore::with_snapshot(snapshot));
    let mut registry = SettingsRegistry::new(RegistryConfig::default(), store);
    registry.register_all([
        Setting::key_binding("Controls", "Combat", "Fire", KeyBinding::key(x())),
        Setting::key_binding("Controls", "Movement", "Jump", KeyBinding::key(KeyCode::SPACE)),
    ]);

    registry.load().await.unwrap();

    let conflicts = registry.binding_conflicts();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].kind, ConflictKind::Exact);
    assert_eq!(conflicts[0].first, "fire");
    assert_eq!(conflicts[0].second, "jump");
}
