//! Tolerant parser for the tracker micro-format.
//!
//! The model is asked to emit up to three fenced blocks (Stats, Info Box and
//! Present Characters), each a header line, a `---` divider and
//! `Label: value` lines. Models drift from that format, so every step here is
//! best-effort: unrecognized input is skipped and never reported as an error
//! to the caller.

/// Parser thresholds.
pub mod config;
/// Emoji prefix detection.
pub mod emoji;
/// Field-level parse failures.
pub mod error;
/// Fenced blocks, reasoning spans, and display cleanup.
pub mod fence;
/// Inventory extraction.
pub mod inventory;
/// Info Box fields.
pub mod info_box;
/// Present Characters records.
pub mod characters;
/// Section matchers.
pub mod matcher;
/// Whole-response section extraction.
pub mod response;
/// Stats section fields.
pub mod user_stats;

/// Re-export character types.
pub use characters::{PresentCharacter, parse_present_characters};
/// Re-export configuration.
pub use config::ParserConfig;
/// Re-export error type.
pub use error::ParseError;
/// Re-export display cleanup.
pub use fence::strip_tracker_blocks;
/// Re-export info box types.
pub use info_box::{InfoBox, parse_info_box};
/// Re-export inventory extraction.
pub use inventory::extract_inventory;
/// Re-export response parsing.
pub use response::parse_response;
/// Re-export stats parsing.
pub use user_stats::{StatsUpdate, extract_stats, parse_user_stats};
