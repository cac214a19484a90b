//! Sanitizing untrusted names before they become persisted keys or values.
//!
//! Stored-inventory location names come straight from model output and end
//! up as object keys in the host's settings JSON. Any key that the host's
//! object model treats specially is rejected, and every name is capped in
//! length.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use crate::error::{CompanionError, CompanionResult};

/// Maximum length (in characters) of a stored-inventory location name.
pub const MAX_LOCATION_NAME_CHARS: usize = 100;

/// Maximum length (in characters) of a single item name.
pub const MAX_ITEM_NAME_CHARS: usize = 500;

/// Maximum number of stored-inventory locations kept on load.
pub const MAX_STORED_LOCATIONS: usize = 100;

/// Property names that must never be used as keys in persisted objects.
const RESERVED_KEYS: &[&str] = &[
    "__proto__",
    "constructor",
    "prototype",
    "__definegetter__",
    "__definesetter__",
    "__lookupgetter__",
    "__lookupsetter__",
    "hasownproperty",
    "isprototypeof",
    "propertyisenumerable",
    "tostring",
    "tolocalestring",
    "valueof",
];

/// Whether `key` names a reserved object property (case-insensitive).
pub fn is_reserved_key(key: &str) -> bool {
    let lower = key.trim().to_lowercase();
    RESERVED_KEYS.contains(&lower.as_str())
}

/// Validate a location name for use as a stored-inventory key.
///
/// Trims whitespace, rejects empty and reserved names, and truncates to
/// [`MAX_LOCATION_NAME_CHARS`].
pub fn sanitize_location_name(name: &str) -> CompanionResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CompanionError::Empty("location name"));
    }
    if is_reserved_key(trimmed) {
        return Err(CompanionError::ReservedKey(trimmed.to_string()));
    }
    Ok(truncate_chars(trimmed, MAX_LOCATION_NAME_CHARS))
}

/// Validate an item name. Trims and truncates to [`MAX_ITEM_NAME_CHARS`].
pub fn sanitize_item_name(name: &str) -> CompanionResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CompanionError::Empty("item name"));
    }
    Ok(truncate_chars(trimmed, MAX_ITEM_NAME_CHARS))
}

/// Filter an untrusted stored-inventory object down to safe entries.
///
/// Non-object input yields an empty map. Entries with reserved or empty keys,
/// or with non-string values, are dropped.
pub fn validate_stored_inventory(stored: &Value) -> BTreeMap<String, String> {
    let mut clean = BTreeMap::new();
    let Value::Object(map) = stored else {
        return clean;
    };

    for (key, value) in map {
        if clean.len() >= MAX_STORED_LOCATIONS {
            warn!(limit = MAX_STORED_LOCATIONS, "stored inventory truncated");
            break;
        }
        let Ok(location) = sanitize_location_name(key) else {
            warn!(key = %key, "dropping unsafe stored-inventory location");
            continue;
        };
        let Value::String(items) = value else {
            warn!(location = %location, "dropping non-string stored-inventory value");
            continue;
        };
        clean.insert(location, items.clone());
    }
    clean
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reserved_keys_detected() {
        assert!(is_reserved_key("__proto__"));
        assert!(is_reserved_key("Constructor"));
        assert!(is_reserved_key("  prototype "));
        assert!(!is_reserved_key("Home"));
    }

    #[test]
    fn location_name_trimmed() {
        assert_eq!(sanitize_location_name("  Home  ").unwrap(), "Home");
    }

    #[test]
    fn location_name_rejects_reserved_and_empty() {
        assert!(matches!(
            sanitize_location_name("__proto__"),
            Err(CompanionError::ReservedKey(_))
        ));
        assert!(matches!(
            sanitize_location_name("   "),
            Err(CompanionError::Empty(_))
        ));
    }

    #[test]
    fn location_name_truncated() {
        let long = "x".repeat(MAX_LOCATION_NAME_CHARS + 20);
        let clean = sanitize_location_name(&long).unwrap();
        assert_eq!(clean.chars().count(), MAX_LOCATION_NAME_CHARS);
    }

    #[test]
    fn item_name_truncated_on_char_boundary() {
        let long = "é".repeat(MAX_ITEM_NAME_CHARS + 1);
        let clean = sanitize_item_name(&long).unwrap();
        assert_eq!(clean.chars().count(), MAX_ITEM_NAME_CHARS);
    }

    #[test]
    fn stored_inventory_drops_proto_key() {
        let stored = json!({"__proto__": "x", "Home": "Sword"});
        let clean = validate_stored_inventory(&stored);
        assert_eq!(clean.len(), 1);
        assert_eq!(clean.get("Home").map(String::as_str), Some("Sword"));
    }

    #[test]
    fn stored_inventory_drops_non_string_values() {
        let stored = json!({"Home": "Sword", "Barn": 3, "Attic": ["a"]});
        let clean = validate_stored_inventory(&stored);
        assert_eq!(clean.keys().collect::<Vec<_>>(), vec!["Home"]);
    }

    #[test]
    fn stored_inventory_rejects_arrays() {
        assert!(validate_stored_inventory(&json!(["Home", "Sword"])).is_empty());
        assert!(validate_stored_inventory(&Value::Null).is_empty());
    }
}
