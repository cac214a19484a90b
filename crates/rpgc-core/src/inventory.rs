//! Three-bucket inventory: carried items, items stored at named locations,
//! and assets.
//!
//! Version 1 inventories were a single freeform string. They are migrated to
//! version 2 by moving the whole string into `on_person`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{CompanionError, CompanionResult};
use crate::items::{NONE, parse_items, serialize_items};
use crate::security::{sanitize_item_name, sanitize_location_name, validate_stored_inventory};

/// Current inventory schema version.
pub const INVENTORY_VERSION: u32 = 2;

/// A structured inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryV2 {
    /// Schema version, always [`INVENTORY_VERSION`].
    pub version: u32,
    /// Items carried or worn, comma-joined.
    pub on_person: String,
    /// Items kept at named locations, keyed by location.
    pub stored: BTreeMap<String, String>,
    /// Vehicles, property, and other major possessions, comma-joined.
    pub assets: String,
}

impl Default for InventoryV2 {
    fn default() -> Self {
        Self {
            version: INVENTORY_VERSION,
            on_person: NONE.to_string(),
            stored: BTreeMap::new(),
            assets: NONE.to_string(),
        }
    }
}

/// One of the three inventory buckets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryBucket {
    /// Items carried on the person.
    OnPerson,
    /// Items stored at the named location.
    Stored(String),
    /// Assets.
    Assets,
}

impl InventoryV2 {
    /// Build a version 2 inventory from a legacy single-string inventory.
    pub fn from_legacy(text: &str) -> Self {
        let trimmed = text.trim();
        Self {
            on_person: if trimmed.is_empty() {
                NONE.to_string()
            } else {
                trimmed.to_string()
            },
            ..Self::default()
        }
    }

    /// Whether every bucket is empty.
    pub fn is_empty(&self) -> bool {
        parse_items(&self.on_person).is_empty()
            && parse_items(&self.assets).is_empty()
            && self.stored.values().all(|v| parse_items(v).is_empty())
    }

    fn bucket_text(&self, bucket: &InventoryBucket) -> CompanionResult<&str> {
        match bucket {
            InventoryBucket::OnPerson => Ok(&self.on_person),
            InventoryBucket::Assets => Ok(&self.assets),
            InventoryBucket::Stored(loc) => self
                .stored
                .get(loc)
                .map(String::as_str)
                .ok_or_else(|| CompanionError::LocationNotFound(loc.clone())),
        }
    }

    fn bucket_text_mut(&mut self, bucket: &InventoryBucket) -> CompanionResult<&mut String> {
        match bucket {
            InventoryBucket::OnPerson => Ok(&mut self.on_person),
            InventoryBucket::Assets => Ok(&mut self.assets),
            InventoryBucket::Stored(loc) => self
                .stored
                .get_mut(loc)
                .ok_or_else(|| CompanionError::LocationNotFound(loc.clone())),
        }
    }

    /// The parsed items in a bucket.
    pub fn items(&self, bucket: &InventoryBucket) -> CompanionResult<Vec<String>> {
        self.bucket_text(bucket).map(parse_items)
    }

    /// Append an item to a bucket.
    pub fn add_item(&mut self, bucket: &InventoryBucket, item: &str) -> CompanionResult<()> {
        let item = sanitize_item_name(item)?;
        let text = self.bucket_text_mut(bucket)?;
        let mut items = parse_items(text);
        items.push(item);
        *text = serialize_items(&items);
        Ok(())
    }

    /// Remove the item at `index` from a bucket and return it.
    pub fn remove_item(&mut self, bucket: &InventoryBucket, index: usize) -> CompanionResult<String> {
        let text = self.bucket_text_mut(bucket)?;
        let mut items = parse_items(text);
        if index >= items.len() {
            return Err(CompanionError::IndexOutOfRange {
                index,
                len: items.len(),
            });
        }
        let removed = items.remove(index);
        *text = serialize_items(&items);
        Ok(removed)
    }

    /// Add an empty stored location. Returns the sanitized name.
    pub fn add_location(&mut self, name: &str) -> CompanionResult<String> {
        let name = sanitize_location_name(name)?;
        self.stored
            .entry(name.clone())
            .or_insert_with(|| NONE.to_string());
        Ok(name)
    }

    /// Remove a stored location and everything in it.
    pub fn remove_location(&mut self, name: &str) -> CompanionResult<String> {
        self.stored
            .remove(name.trim())
            .ok_or_else(|| CompanionError::LocationNotFound(name.trim().to_string()))
    }
}

/// Convert a version 1 inventory (plain string) to version 2 in place.
///
/// Objects are left untouched, so running this twice is harmless. Returns
/// true if anything changed.
pub fn migrate_inventory(inventory: &mut Value) -> bool {
    match inventory {
        Value::String(text) => {
            let migrated = InventoryV2::from_legacy(text);
            *inventory = to_value(&migrated);
            true
        }
        Value::Null => {
            *inventory = to_value(&InventoryV2::default());
            true
        }
        _ => false,
    }
}

/// Check a persisted inventory and repair anything malformed.
///
/// Requires `version == 2`, string `onPerson` and `assets`, and a plain
/// object `stored` whose keys pass location validation and whose values are
/// strings. Returns the repaired inventory and whether a repair was needed.
pub fn validate_inventory_structure(inventory: &Value) -> (InventoryV2, bool) {
    let Value::Object(map) = inventory else {
        warn!("inventory is not an object, resetting to default");
        return (InventoryV2::default(), true);
    };

    let mut repaired = false;
    let mut result = InventoryV2::default();

    if map.get("version").and_then(Value::as_u64) != Some(u64::from(INVENTORY_VERSION)) {
        warn!("inventory version missing or wrong, setting to {INVENTORY_VERSION}");
        repaired = true;
    }

    result.on_person = string_field(map, "onPerson", &mut repaired);
    result.assets = string_field(map, "assets", &mut repaired);

    match map.get("stored") {
        Some(stored @ Value::Object(raw)) => {
            result.stored = validate_stored_inventory(stored);
            if result.stored.len() != raw.len() {
                warn!(
                    before = raw.len(),
                    after = result.stored.len(),
                    "removed invalid stored-inventory entries"
                );
                repaired = true;
            }
        }
        _ => {
            warn!("inventory.stored is not a plain object, resetting");
            repaired = true;
        }
    }

    (result, repaired)
}

fn string_field(map: &Map<String, Value>, key: &str, repaired: &mut bool) -> String {
    match map.get(key) {
        Some(Value::String(s)) => s.clone(),
        _ => {
            warn!(field = key, "inventory field is not a string, resetting");
            *repaired = true;
            NONE.to_string()
        }
    }
}

fn to_value(inventory: &InventoryV2) -> Value {
    let mut stored = Map::new();
    for (k, v) in &inventory.stored {
        stored.insert(k.clone(), Value::String(v.clone()));
    }
    let mut map = Map::new();
    map.insert("version".into(), Value::from(inventory.version));
    map.insert("onPerson".into(), Value::String(inventory.on_person.clone()));
    map.insert("stored".into(), Value::Object(stored));
    map.insert("assets".into(), Value::String(inventory.assets.clone()));
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_string_migrates_to_on_person() {
        let mut inv = json!("Sword, Shield");
        assert!(migrate_inventory(&mut inv));
        assert_eq!(inv["version"], 2);
        assert_eq!(inv["onPerson"], "Sword, Shield");
        assert_eq!(inv["assets"], "None");
        assert!(inv["stored"].as_object().unwrap().is_empty());
    }

    #[test]
    fn migration_is_idempotent() {
        let mut inv = json!("Rope");
        migrate_inventory(&mut inv);
        let once = inv.clone();
        assert!(!migrate_inventory(&mut inv));
        assert_eq!(inv, once);
    }

    #[test]
    fn valid_structure_needs_no_repair() {
        let inv = json!({
            "version": 2,
            "onPerson": "Sword",
            "stored": {"Home": "Books"},
            "assets": "Horse"
        });
        let (clean, repaired) = validate_inventory_structure(&inv);
        assert!(!repaired);
        assert_eq!(clean.on_person, "Sword");
        assert_eq!(clean.stored["Home"], "Books");
    }

    #[test]
    fn stored_array_is_repaired() {
        let inv = json!({
            "version": 2,
            "onPerson": "Sword",
            "stored": ["Home"],
            "assets": "None"
        });
        let (clean, repaired) = validate_inventory_structure(&inv);
        assert!(repaired);
        assert!(clean.stored.is_empty());
        assert_eq!(clean.on_person, "Sword");
    }

    #[test]
    fn dangerous_location_is_repaired() {
        let inv = json!({
            "version": 2,
            "onPerson": "None",
            "stored": {"constructor": "x", "Cellar": "Wine"},
            "assets": "None"
        });
        let (clean, repaired) = validate_inventory_structure(&inv);
        assert!(repaired);
        assert_eq!(clean.stored.len(), 1);
        assert!(clean.stored.contains_key("Cellar"));
    }

    #[test]
    fn wrong_version_and_types_repaired() {
        let inv = json!({"version": 1, "onPerson": 5, "stored": {}, "assets": null});
        let (clean, repaired) = validate_inventory_structure(&inv);
        assert!(repaired);
        assert_eq!(clean.version, 2);
        assert_eq!(clean.on_person, "None");
        assert_eq!(clean.assets, "None");
    }

    #[test]
    fn non_object_resets() {
        let (clean, repaired) = validate_inventory_structure(&json!(42));
        assert!(repaired);
        assert_eq!(clean, InventoryV2::default());
    }

    #[test]
    fn add_and_remove_items() {
        let mut inv = InventoryV2::default();
        inv.add_item(&InventoryBucket::OnPerson, "Sword").unwrap();
        inv.add_item(&InventoryBucket::OnPerson, "Rope (10 ft, frayed)")
            .unwrap();
        assert_eq!(inv.on_person, "Sword, Rope (10 ft, frayed)");

        let removed = inv.remove_item(&InventoryBucket::OnPerson, 0).unwrap();
        assert_eq!(removed, "Sword");
        assert_eq!(inv.on_person, "Rope (10 ft, frayed)");

        inv.remove_item(&InventoryBucket::OnPerson, 0).unwrap();
        assert_eq!(inv.on_person, "None");
    }

    #[test]
    fn remove_out_of_range() {
        let mut inv = InventoryV2::default();
        assert!(matches!(
            inv.remove_item(&InventoryBucket::Assets, 0),
            Err(CompanionError::IndexOutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn locations_lifecycle() {
        let mut inv = InventoryV2::default();
        let name = inv.add_location("  Home ").unwrap();
        assert_eq!(name, "Home");
        let home = InventoryBucket::Stored("Home".into());
        inv.add_item(&home, "Books").unwrap();
        assert_eq!(inv.items(&home).unwrap(), vec!["Books"]);
        assert!(inv.add_location("__proto__").is_err());
        assert_eq!(inv.remove_location("Home").unwrap(), "Books");
        assert!(inv.items(&home).is_err());
    }

    #[test]
    fn emptiness() {
        let mut inv = InventoryV2::default();
        assert!(inv.is_empty());
        inv.add_location("Home").unwrap();
        assert!(inv.is_empty());
        inv.assets = "Horse".into();
        assert!(!inv.is_empty());
    }
}
