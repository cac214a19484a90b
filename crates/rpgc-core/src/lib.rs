//! Core types for the RPG companion: tracker snapshots, stats, inventory,
//! quests, dice, settings, and input validation.
//!
//! Nothing in this crate parses model output; that lives in `rpgc-parser`.
//! The types here are what the parser fills and what the session persists.

/// Dice formulas and roll results.
pub mod dice;
/// Error types used throughout the crate.
pub mod error;
/// Three-bucket inventory, migration, and structural validation.
pub mod inventory;
/// Comma-separated item lists and bracket wrappers.
pub mod items;
/// Main and optional quests.
pub mod quests;
/// Sanitizing untrusted keys and values.
pub mod security;
/// Persisted extension settings.
pub mod settings;
/// Raw tracker sections.
pub mod snapshot;
/// Needs meters, mood, and classic attributes.
pub mod stats;

/// Re-export dice types.
pub use dice::{DiceFormula, DiceRoll};
/// Re-export error types.
pub use error::{CompanionError, CompanionResult};
/// Re-export inventory types.
pub use inventory::{InventoryBucket, InventoryV2};
/// Re-export quest types.
pub use quests::Quests;
/// Re-export settings types.
pub use settings::{ExtensionSettings, GenerationMode};
/// Re-export snapshot types.
pub use snapshot::{TrackerSection, TrackerSnapshot};
/// Re-export stats types.
pub use stats::{Attribute, ClassicStats, Meter, UserStats};
