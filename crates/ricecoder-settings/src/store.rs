//! Document stores backing settings persistence
//!
//! A store holds one [`SettingsSnapshot`] in memory. `mutate` edits it and
//! marks the store dirty; `save` writes it out and clears the flag; `load`
//! replaces it with the persisted copy.
//!
//! # Storage Location
//!
//! [`JsonFileStore::with_default_location`] keeps the snapshot at
//! `<config dir>/ricecoder/settings.json`.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::debug;

use crate::config::RegistryConfig;
use crate::error::PersistenceError;
use crate::snapshot::SettingsSnapshot;

/// Persistence backend consumed by the registry
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the latest persisted snapshot and make it the working copy
    async fn load(&self) -> Result<SettingsSnapshot, PersistenceError>;

    /// Persist the working copy and clear the dirty flag
    async fn save(&self) -> Result<(), PersistenceError>;

    /// Edit the working copy in place and mark the store dirty
    fn mutate(&self, edit: &mut dyn FnMut(&mut SettingsSnapshot));

    /// Clone of the working copy
    fn snapshot(&self) -> SettingsSnapshot;

    fn is_loaded(&self) -> bool;

    fn is_dirty(&self) -> bool;
}

#[derive(Debug, Default)]
struct WorkingCopy {
    snapshot: SettingsSnapshot,
    loaded: bool,
    dirty: bool,
}

impl WorkingCopy {
    fn mutate(&mut self, edit: &mut dyn FnMut(&mut SettingsSnapshot)) {
        edit(&mut self.snapshot);
        self.dirty = true;
    }
}

/// In-memory store, mostly for tests and headless hosts
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    working: RwLock<WorkingCopy>,
    persisted: RwLock<SettingsSnapshot>,
    saves: AtomicUsize,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose persisted copy is `snapshot`
    pub fn with_snapshot(snapshot: SettingsSnapshot) -> Self {
        Self {
            persisted: RwLock::new(snapshot),
            ..Self::default()
        }
    }

    /// The last snapshot written by `save`
    pub fn persisted(&self) -> SettingsSnapshot {
        self.persisted.read().clone()
    }

    /// Number of successful saves (for testing)
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Make subsequent loads fail (for testing)
    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent saves fail (for testing)
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn load(&self) -> Result<SettingsSnapshot, PersistenceError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(PersistenceError::Store("load failed".to_string()));
        }
        let snapshot = self.persisted.read().clone();
        let mut working = self.working.write();
        working.snapshot = snapshot.clone();
        working.loaded = true;
        working.dirty = false;
        Ok(snapshot)
    }

    async fn save(&self) -> Result<(), PersistenceError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(PersistenceError::Store("save failed".to_string()));
        }
        let mut working = self.working.write();
        *self.persisted.write() = working.snapshot.clone();
        working.dirty = false;
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn mutate(&self, edit: &mut dyn FnMut(&mut SettingsSnapshot)) {
        self.working.write().mutate(edit);
    }

    fn snapshot(&self) -> SettingsSnapshot {
        self.working.read().snapshot.clone()
    }

    fn is_loaded(&self) -> bool {
        self.working.read().loaded
    }

    fn is_dirty(&self) -> bool {
        self.working.read().dirty
    }
}

/// Store keeping the snapshot in a JSON file
///
/// A missing file loads as an empty snapshot. Saves write a sibling temporary
/// file and rename it over the target.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    pretty: bool,
    working: RwLock<WorkingCopy>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: true,
            working: RwLock::new(WorkingCopy::default()),
        }
    }

    /// Use `<config dir>/ricecoder/settings.json`
    pub fn with_default_location() -> Result<Self, PersistenceError> {
        Ok(Self::new(Self::default_path()?))
    }

    /// Build a store from the file and formatting options in `config`
    pub fn from_config(config: &RegistryConfig) -> Result<Self, PersistenceError> {
        let path = match &config.settings_file {
            Some(path) => path.clone(),
            None => Self::default_path()?,
        };
        Ok(Self::new(path).with_pretty(config.pretty_json))
    }

    pub fn default_path() -> Result<PathBuf, PersistenceError> {
        dirs::config_dir()
            .map(|dir| dir.join("ricecoder").join("settings.json"))
            .ok_or(PersistenceError::NoDefaultLocation)
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn encode(&self, snapshot: &SettingsSnapshot) -> Result<String, PersistenceError> {
        let encoded = if self.pretty {
            serde_json::to_string_pretty(snapshot)
        } else {
            serde_json::to_string(snapshot)
        };
        encoded.map_err(|e| PersistenceError::SerializationError(e.to_string()))
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn load(&self) -> Result<SettingsSnapshot, PersistenceError> {
        let snapshot = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                PersistenceError::CorruptedSnapshot(format!("{}: {}", self.path.display(), e))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No settings file at {}, starting empty", self.path.display());
                SettingsSnapshot::default()
            }
            Err(e) => return Err(e.into()),
        };

        let mut working = self.working.write();
        working.snapshot = snapshot.clone();
        working.loaded = true;
        working.dirty = false;
        Ok(snapshot)
    }

    async fn save(&self) -> Result<(), PersistenceError> {
        let snapshot = self.working.read().snapshot.clone();
        let content = self.encode(&snapshot)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        let mut working = self.working.write();
        // Edits made while the write was in flight stay dirty
        if working.snapshot == snapshot {
            working.dirty = false;
        }
        debug!("Wrote settings to {}", self.path.display());
        Ok(())
    }

    fn mutate(&self, edit: &mut dyn FnMut(&mut SettingsSnapshot)) {
        self.working.write().mutate(edit);
    }

    fn snapshot(&self) -> SettingsSnapshot {
        self.working.read().snapshot.clone()
    }

    fn is_loaded(&self) -> bool {
        self.working.read().loaded
    }

    fn is_dirty(&self) -> bool {
        self.working.read().dirty
    }
}
