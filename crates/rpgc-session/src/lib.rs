//! Session layer for the RPG companion.
//!
//! This crate owns everything that changes over the life of a chat: the
//! state store, persistence to the host, the commit/swipe reconciler that
//! decides which tracker snapshot the model sees, prompt assembly and
//! injection, manual stat edits, and the dedicated tracker call used in
//! separate mode. [`CompanionSession`] ties them together.

/// Host chat messages and history access.
pub mod chat;
/// Session configuration.
pub mod config;
/// Manual stats edits and Stats text regeneration.
pub mod edit;
/// Error types.
pub mod error;
/// Separate-mode tracker generation.
pub mod generation;
/// Prompt injection.
pub mod injector;
/// Host storage and settings repair.
pub mod persistence;
/// Prompt builders.
pub mod prompt;
/// Commit/swipe reconciliation.
pub mod reconciler;
/// The session facade.
pub mod session;
/// The in-memory state store.
pub mod state;
/// Per-swipe tracker storage.
pub mod swipes;

/// Re-export chat types.
pub use chat::{ChatHistory, ChatLog, ChatMessage};
/// Re-export configuration.
pub use config::SessionConfig;
/// Re-export edit types.
pub use edit::{StatsEdit, build_user_stats_text};
/// Re-export error types.
pub use error::{SessionError, SessionResult};
/// Re-export generation types.
pub use generation::{TextGenerator, begin_tracker_update, finish_tracker_update, update_trackers};
/// Re-export injection types.
pub use injector::{InjectedPrompts, PromptInjector, inject_prompts};
/// Re-export storage types.
pub use persistence::{FileStorage, HostStorage, MemoryStorage, StorageSlot};
/// Re-export prompt types.
pub use prompt::{PromptMessage, PromptRole};
/// Re-export reconciler types.
pub use reconciler::{CommitDecision, ReceivedMessage, SwipeKind};
/// Re-export the session facade.
pub use session::{CompanionSession, render_prompt};
/// Re-export the state store.
pub use state::SessionState;
/// Re-export swipe storage.
pub use swipes::SwipeRepository;
