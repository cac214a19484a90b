//! Inventory extraction from Stats section text.
//!
//! Two formats are understood. The structured one uses one labelled line per
//! bucket:
//!
//! ```text
//! On Person: Sword, Rope (10 ft, frayed)
//! Stored - Home: Books (magical, ancient tomes)
//! Assets: Horse
//! ```
//!
//! The legacy one is a single `Inventory: ...` line, which becomes the
//! on-person bucket.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use rpgc_core::InventoryV2;
use rpgc_core::items::{NONE, parse_items, serialize_items};
use rpgc_core::security::{MAX_STORED_LOCATIONS, sanitize_location_name};

use crate::error::ParseError;

static ON_PERSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[\s\-*]*On\s+Person:[ \t]*(.*)$").expect("invalid on-person regex")
});

static STORED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[\s\-*]*Stored\s*-\s*([^:\n]+):[ \t]*(.*)$").expect("invalid stored regex")
});

static ASSETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^[\s\-*]*Assets:[ \t]*(.*)$").expect("invalid assets regex"));

static LEGACY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[\s\-*]*Inventory:[ \t]*(\S.*)$").expect("invalid inventory regex")
});

/// Normalize an item list: split, drop `none`, re-join.
fn normalize(text: &str) -> String {
    serialize_items(&parse_items(text))
}

/// Extract a structured inventory from Stats text.
///
/// Returns `None` when the text has no inventory lines at all, so that a
/// turn which does not mention the inventory leaves the previous one intact.
pub fn extract_inventory(text: &str) -> Option<InventoryV2> {
    let mut inventory = InventoryV2::default();
    let mut found = false;

    if let Some(caps) = ON_PERSON.captures(text) {
        inventory.on_person = normalize(caps.get(1).map_or("", |m| m.as_str()));
        found = true;
    }

    if let Some(caps) = ASSETS.captures(text) {
        inventory.assets = normalize(caps.get(1).map_or("", |m| m.as_str()));
        found = true;
    }

    for caps in STORED.captures_iter(text) {
        found = true;
        let (Some(location), Some(items)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        if inventory.stored.len() >= MAX_STORED_LOCATIONS {
            warn!(limit = MAX_STORED_LOCATIONS, "too many stored locations, ignoring the rest");
            break;
        }
        match sanitize_location_name(location.as_str()) {
            Ok(name) => {
                inventory.stored.insert(name, normalize(items.as_str()));
            }
            Err(e) => warn!(error = %ParseError::from(e), "skipping stored location"),
        }
    }

    if found {
        return Some(inventory);
    }

    let legacy = LEGACY.captures(text)?.get(1)?.as_str().trim();
    debug!("using legacy single-line inventory");
    if legacy.eq_ignore_ascii_case(NONE) {
        return Some(InventoryV2::default());
    }
    Some(InventoryV2::from_legacy(legacy))
}
