//! Error types for the companion session.

use thiserror::Error;

use rpgc_core::{CompanionError, GenerationMode};

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can occur while driving a companion session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Validation or manipulation of tracker data failed.
    #[error("{0}")]
    Companion(#[from] CompanionError),

    /// Persisted JSON could not be read or written.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A storage file could not be read or written.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The dedicated tracker call failed.
    #[error("tracker generation failed: {0}")]
    Generation(String),

    /// The operation needs a different generation mode.
    #[error("not available in {0} mode")]
    WrongMode(GenerationMode),

    /// No chat message at this index.
    #[error("no message at index {0}")]
    MessageNotFound(usize),

    /// The chat has no assistant message yet.
    #[error("no assistant message in chat")]
    NoAssistantMessage,

    /// The message has no swipe at this index.
    #[error("no swipe {0} on the last assistant message")]
    SwipeNotFound(usize),

    /// There is no pending dice roll to commit.
    #[error("no pending dice roll")]
    NoPendingRoll,

    /// Invalid user input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Unknown command.
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}
