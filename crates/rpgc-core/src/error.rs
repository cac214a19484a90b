/// Alias for `Result<T, CompanionError>`.
pub type CompanionResult<T> = Result<T, CompanionError>;

/// Errors that can occur when validating or manipulating tracker data.
#[derive(Debug, thiserror::Error)]
pub enum CompanionError {
    /// A key would collide with a reserved object property name.
    #[error("reserved key rejected: \"{0}\"")]
    ReservedKey(String),

    /// A name or item was empty after trimming.
    #[error("empty {0}")]
    Empty(&'static str),

    /// A stored location with this name does not exist.
    #[error("location not found: \"{0}\"")]
    LocationNotFound(String),

    /// A list index was outside the list.
    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Length of the list.
        len: usize,
    },

    /// A dice formula could not be parsed.
    #[error("invalid dice formula: \"{0}\"")]
    InvalidFormula(String),

    /// Settings or tracker data failed to (de)serialize.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A generic validation error with a descriptive message.
    #[error("validation error: {0}")]
    Validation(String),
}
