//! Field-level parse failures.
//!
//! These never escape the public parsing functions. They exist so a failing
//! field can be logged with a reason and skipped while the rest of the
//! section still applies.

use thiserror::Error;

/// A single field that could not be parsed.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A numeric field held something that does not fit a meter value.
    #[error("invalid number for {label}: \"{value}\"")]
    InvalidNumber {
        /// The field label, e.g. `Health`.
        label: &'static str,
        /// The raw captured text.
        value: String,
    },

    /// A stored-inventory location name was rejected.
    #[error("rejected stored location: {0}")]
    Location(#[from] rpgc_core::CompanionError),
}
