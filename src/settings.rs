//! Durable key-value settings.
//!
//! A flat, versionless JSON document seeds the controller at startup and
//! records the handful of choices that must survive restarts. Unknown or
//! missing keys default silently. A `set` is always paired with an
//! explicit `flush` by the caller, so an acknowledged write is durable
//! before anything else happens.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

pub const KEY_GAME_INSTALL: &str = "game-install";
pub const KEY_RELEASE_CHANNEL: &str = "northstar-release-canal";
pub const KEY_DEV_MODE: &str = "dev_mode";
pub const KEY_MODS_PER_PAGE: &str = "thunderstore-mods-per-page";
pub const KEY_RELEASE_SWITCHING: &str = "northstar-releases-switching";

/// Storage seam for the settings blob.
pub trait SettingsStore: Send {
    /// Missing keys are not an error.
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);
    /// Durability barrier: returns only once the blob is persisted.
    fn flush(&mut self) -> Result<()>;
}

/// File-backed store, one pretty-printed JSON object per file.
pub struct JsonSettingsFile {
    path: PathBuf,
    values: HashMap<String, Value>,
}

impl JsonSettingsFile {
    /// Opens the store. A missing or corrupt file starts from an empty
    /// document rather than failing.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<HashMap<String, Value>>(&content) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!(
                        "[Settings] Corrupt settings file {:?}, starting empty: {}",
                        path,
                        e
                    );
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        tracing::debug!("[Settings] Loaded {} keys from {:?}", values.len(), path);
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonSettingsFile {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating settings dir {:?}", parent))?;
            }
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("writing settings file {:?}", self.path))?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral hosts.
#[derive(Default)]
pub struct MemorySettings {
    values: HashMap<String, Value>,
    flushes: usize,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}
