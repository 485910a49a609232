//! Persisted key/value settings with typed defaults.

use crate::mute::VolumePreservation;
use emu_core::logging::{log, LogCategory, LogLevel};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const VOLUME_KEY: &str = "emulatorVolume";
pub const FAST_FORWARD_KEY: &str = "emulatorFFMultiplier";
pub const EMULATOR_SETTINGS_KEY: &str = "emulatorSettings";
pub const VOLUME_BEFORE_AUTO_MUTE_KEY: &str = "emulatorVolumeBeforeAutoMute";
pub const LAYOUTS_KEY: &str = "layouts";

pub const DEFAULT_VOLUME: f64 = 1.0;
pub const DEFAULT_FAST_FORWARD: u8 = 1;

/// User preferences read by the control panel. Other emulator options may
/// live in the same blob; they are ignored here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmulatorSettings {
    pub mute_on_rewind: bool,
    pub mute_on_fast_forward: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("settings file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Raw JSON key/value storage, the equivalent of browser local storage.
pub trait SettingsStore {
    fn get_value(&self, key: &str) -> Option<Value>;
    fn set_value(&mut self, key: &str, value: Value);
    fn remove(&mut self, key: &str);
}

impl<S: SettingsStore + ?Sized> SettingsStore for Box<S> {
    fn get_value(&self, key: &str) -> Option<Value> {
        (**self).get_value(key)
    }

    fn set_value(&mut self, key: &str, value: Value) {
        (**self).set_value(key, value)
    }

    fn remove(&mut self, key: &str) {
        (**self).remove(key)
    }
}

/// Typed access on top of any [`SettingsStore`].
pub trait SettingsStoreExt: SettingsStore {
    /// Read `key`, falling back to `default` when absent or not decodable.
    fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.get_value(key) {
            Some(value) => match serde_json::from_value(value) {
                Ok(v) => v,
                Err(e) => {
                    log(LogCategory::Settings, LogLevel::Warn, || {
                        format!("ignoring malformed value for {}: {}", key, e)
                    });
                    default
                }
            },
            None => default,
        }
    }

    fn set<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(v) => self.set_value(key, v),
            Err(e) => log(LogCategory::Settings, LogLevel::Error, || {
                format!("failed to encode {}: {}", key, e)
            }),
        }
    }
}

impl<S: SettingsStore + ?Sized> SettingsStoreExt for S {}

pub fn volume(store: &dyn SettingsStore) -> f64 {
    store.get(VOLUME_KEY, DEFAULT_VOLUME)
}

pub fn set_volume(store: &mut dyn SettingsStore, volume: f64) {
    store.set(VOLUME_KEY, &volume);
}

pub fn fast_forward_multiplier(store: &dyn SettingsStore) -> u8 {
    store.get(FAST_FORWARD_KEY, DEFAULT_FAST_FORWARD)
}

pub fn set_fast_forward_multiplier(store: &mut dyn SettingsStore, multiplier: u8) {
    store.set(FAST_FORWARD_KEY, &multiplier);
}

pub fn emulator_settings(store: &dyn SettingsStore) -> EmulatorSettings {
    store.get(EMULATOR_SETTINGS_KEY, EmulatorSettings::default())
}

pub fn volume_preservation(store: &dyn SettingsStore) -> Option<VolumePreservation> {
    store.get(VOLUME_BEFORE_AUTO_MUTE_KEY, None)
}

pub fn set_volume_preservation(
    store: &mut dyn SettingsStore,
    preservation: Option<VolumePreservation>,
) {
    match preservation {
        Some(p) => store.set(VOLUME_BEFORE_AUTO_MUTE_KEY, &p),
        None => store.remove(VOLUME_BEFORE_AUTO_MUTE_KEY),
    }
}

/// In-memory store, used by tests and hosts without persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get_value(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// A single JSON object on disk, written through on every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonFileStore {
    /// Default location: `controls.json` next to the executable
    pub fn default_path() -> PathBuf {
        let mut path = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        path.push("controls.json");
        path
    }

    /// Load the store at `path`, starting empty when the file is missing or
    /// unreadable.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Map<String, Value>>(&contents) {
                Ok(values) => values,
                Err(e) => {
                    log(LogCategory::Settings, LogLevel::Warn, || {
                        format!(
                            "failed to parse {}: {}. Using defaults.",
                            path.display(),
                            e
                        )
                    });
                    Map::new()
                }
            },
            // File doesn't exist yet
            Err(_) => Map::new(),
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current contents to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    fn write_through(&self) {
        if let Err(e) = self.flush() {
            log(LogCategory::Settings, LogLevel::Warn, || {
                format!("failed to save {}: {}", self.path.display(), e)
            });
        }
    }
}

impl SettingsStore for JsonFileStore {
    fn get_value(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
        self.write_through();
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.write_through();
        }
    }
}
