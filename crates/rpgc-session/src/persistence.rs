//! Mirroring session state to the host's storage.
//!
//! The host exposes three JSON documents: the extension settings, the
//! per-chat metadata, and the chat itself. [`HostStorage`] abstracts over
//! where they live. Loading settings merges them over defaults and repairs
//! corrupted inventory structures, re-saving immediately when anything was
//! fixed.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use rpgc_core::inventory::{migrate_inventory, validate_inventory_structure};
use rpgc_core::security::is_reserved_key;
use rpgc_core::{ExtensionSettings, TrackerSnapshot};

use crate::error::SessionResult;

/// Key of the companion's entry inside the host's chat metadata.
pub const CHAT_METADATA_KEY: &str = "rpg_companion";

/// One of the host's persisted documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StorageSlot {
    /// Extension settings.
    Settings,
    /// Per-chat metadata.
    ChatMetadata,
    /// The chat message list.
    Chat,
}

impl StorageSlot {
    /// File name used by [`FileStorage`].
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Settings => "settings.json",
            Self::ChatMetadata => "chat_metadata.json",
            Self::Chat => "chat.json",
        }
    }
}

/// The host's persistence API.
pub trait HostStorage {
    /// Read a document. `Ok(None)` means it was never written.
    fn read(&self, slot: StorageSlot) -> SessionResult<Option<Value>>;

    /// Write a document.
    fn write(&mut self, slot: StorageSlot, value: &Value) -> SessionResult<()>;
}

/// Storage held in memory, for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    docs: BTreeMap<StorageSlot, Value>,
}

impl MemoryStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage with one document already present.
    pub fn with(mut self, slot: StorageSlot, value: Value) -> Self {
        self.docs.insert(slot, value);
        self
    }

    /// Peek at a stored document.
    pub fn get(&self, slot: StorageSlot) -> Option<&Value> {
        self.docs.get(&slot)
    }
}

impl HostStorage for MemoryStorage {
    fn read(&self, slot: StorageSlot) -> SessionResult<Option<Value>> {
        Ok(self.docs.get(&slot).cloned())
    }

    fn write(&mut self, slot: StorageSlot, value: &Value) -> SessionResult<()> {
        self.docs.insert(slot, value.clone());
        Ok(())
    }
}

/// Storage backed by JSON files in one directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir` for all documents. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, slot: StorageSlot) -> PathBuf {
        self.dir.join(slot.file_name())
    }
}

impl HostStorage for FileStorage {
    fn read(&self, slot: StorageSlot) -> SessionResult<Option<Value>> {
        let path = self.path(slot);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn write(&mut self, slot: StorageSlot, value: &Value) -> SessionResult<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(slot), serde_json::to_string_pretty(value)?)?;
        Ok(())
    }
}

/// Settings as loaded, with whether anything had to be repaired.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSettings {
    /// The usable settings.
    pub settings: ExtensionSettings,
    /// Whether the saved document was changed to produce them.
    pub repaired: bool,
}

/// Recursively merge `saved` over `base`. Objects merge key by key, anything
/// else replaces. Reserved keys are dropped; returns whether any were.
fn merge_over(base: &mut Value, saved: &Value) -> bool {
    match (base, saved) {
        (Value::Object(base_map), Value::Object(saved_map)) => {
            let mut dropped = false;
            for (key, value) in saved_map {
                if is_reserved_key(key) {
                    warn!(key = %key, "dropping reserved key from saved settings");
                    dropped = true;
                    continue;
                }
                match base_map.get_mut(key) {
                    Some(slot) => dropped |= merge_over(slot, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
            dropped
        }
        (slot, value) => {
            *slot = value.clone();
            false
        }
    }
}

/// Walk `path` of object keys down from `value`.
fn at_path<'a>(value: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    path.iter()
        .try_fold(value, |current, key| current.get_mut(key.as_str()))
}

fn deserializes(value: &Value) -> bool {
    ExtensionSettings::deserialize(value).is_ok()
}

/// Copy the fields of `saved` into `accepted` one at a time, keeping each
/// only if `accepted` still deserializes. An object rejected as a whole is
/// retried field by field. Returns whether any field was left at its
/// default.
fn adopt_fields(accepted: &mut Value, saved: &Map<String, Value>, path: &mut Vec<String>) -> bool {
    let mut dropped = false;
    for (key, value) in saved {
        let Some(Value::Object(parent)) = at_path(accepted, path) else {
            return true;
        };
        let previous = parent.insert(key.clone(), value.clone());
        if deserializes(accepted) {
            continue;
        }

        if let Some(Value::Object(parent)) = at_path(accepted, path) {
            match &previous {
                Some(default) => parent.insert(key.clone(), default.clone()),
                None => parent.remove(key),
            };
        }
        match (value, previous) {
            (Value::Object(fields), Some(Value::Object(_))) => {
                path.push(key.clone());
                dropped |= adopt_fields(accepted, fields, path);
                path.pop();
            }
            _ => {
                let field = path
                    .iter()
                    .chain(std::iter::once(key))
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(".");
                warn!(field = %field, "saved setting has the wrong type, using its default");
                dropped = true;
            }
        }
    }
    dropped
}

/// Merge, migrate and validate a saved settings document.
///
/// Never fails: a field with the wrong type falls back to its default while
/// every other saved field is kept, and the result is reported as repaired.
pub fn restore_settings(saved: Option<&Value>) -> LoadedSettings {
    let defaults = ExtensionSettings::default();
    let Ok(default_value) = serde_json::to_value(&defaults) else {
        return LoadedSettings {
            settings: defaults,
            repaired: true,
        };
    };
    let mut value = default_value.clone();

    let mut repaired = false;
    match saved {
        Some(saved @ Value::Object(_)) => repaired |= merge_over(&mut value, saved),
        Some(_) => {
            warn!("saved settings are not an object, using defaults");
            repaired = true;
        }
        None => {}
    }

    if let Some(Value::Object(user_stats)) = value.get_mut("userStats") {
        let inventory = user_stats.entry("inventory").or_insert(Value::Null);
        if migrate_inventory(inventory) {
            debug!("migrated legacy inventory to v2");
            repaired = true;
        }
        let (clean, fixed) = validate_inventory_structure(inventory);
        if fixed {
            repaired = true;
        }
        if let Ok(clean) = serde_json::to_value(&clean) {
            *inventory = clean;
        }
    }

    if let Ok(settings) = ExtensionSettings::deserialize(&value) {
        return LoadedSettings { settings, repaired };
    }

    let mut accepted = default_value;
    if let Value::Object(fields) = &value {
        adopt_fields(&mut accepted, fields, &mut Vec::new());
    }
    match ExtensionSettings::deserialize(&accepted) {
        Ok(settings) => LoadedSettings {
            settings,
            repaired: true,
        },
        Err(e) => {
            warn!(error = %e, "saved settings are unusable, using defaults");
            LoadedSettings {
                settings: defaults,
                repaired: true,
            }
        }
    }
}

/// Load settings from storage, repairing and re-saving when needed.
///
/// An unreadable document is logged and replaced by defaults.
pub fn load_settings(storage: &mut dyn HostStorage) -> LoadedSettings {
    let (saved, unreadable) = match storage.read(StorageSlot::Settings) {
        Ok(saved) => (saved, false),
        Err(e) => {
            warn!(error = %e, "could not read saved settings");
            (None, true)
        }
    };
    let mut loaded = restore_settings(saved.as_ref());
    loaded.repaired |= unreadable;
    if loaded.repaired {
        warn!("saved settings were repaired, saving the repaired copy");
        if let Err(e) = save_settings(storage, &loaded.settings) {
            warn!(error = %e, "could not save repaired settings");
        }
    }
    loaded
}

/// Save settings to storage.
pub fn save_settings(storage: &mut dyn HostStorage, settings: &ExtensionSettings) -> SessionResult<()> {
    storage.write(StorageSlot::Settings, &serde_json::to_value(settings)?)
}

/// Tracker snapshots kept in the chat metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatData {
    /// The displayed snapshot.
    pub last_generated_data: TrackerSnapshot,
    /// The committed snapshot.
    pub committed_tracker_data: TrackerSnapshot,
}

/// Load the companion's chat data. Missing or corrupt data yields defaults.
pub fn load_chat_data(storage: &dyn HostStorage) -> ChatData {
    let metadata = match storage.read(StorageSlot::ChatMetadata) {
        Ok(Some(metadata)) => metadata,
        Ok(None) => return ChatData::default(),
        Err(e) => {
            warn!(error = %e, "could not read chat metadata");
            return ChatData::default();
        }
    };
    let Some(entry) = metadata.get(CHAT_METADATA_KEY) else {
        return ChatData::default();
    };
    serde_json::from_value(entry.clone()).unwrap_or_else(|e| {
        warn!(error = %e, "chat metadata is corrupt, starting fresh");
        ChatData::default()
    })
}

/// Save the companion's chat data, keeping other metadata keys intact.
pub fn save_chat_data(storage: &mut dyn HostStorage, data: &ChatData) -> SessionResult<()> {
    let mut metadata = match storage.read(StorageSlot::ChatMetadata) {
        Ok(Some(Value::Object(map))) => map,
        _ => Map::new(),
    };
    metadata.insert(CHAT_METADATA_KEY.to_string(), serde_json::to_value(data)?);
    storage.write(StorageSlot::ChatMetadata, &Value::Object(metadata))
}
