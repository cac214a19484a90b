//! Commit/swipe reconciliation.
//!
//! The committed snapshot is what the model sees as the previous turn's
//! trackers. It advances only when the user moves the conversation forward:
//! a generation that follows a new user message commits whatever is on
//! display, while a generation that re-rolls an existing turn (a swipe)
//! reuses the committed snapshot untouched. That keeps every swipe of one
//! turn on the same prior context.
//!
//! The first tracker data ever parsed in a chat is committed immediately,
//! since there is no earlier baseline to protect.

use tracing::{debug, info, warn};

use rpgc_core::{GenerationMode, TrackerSection, TrackerSnapshot};
use rpgc_parser::{ParserConfig, parse_response, parse_user_stats, strip_tracker_blocks};

use crate::state::SessionState;
use crate::swipes::SwipeRepository;

/// What the commit rule did at generation start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitDecision {
    /// The displayed snapshot became the committed one.
    Committed,
    /// The committed snapshot was kept for a re-roll.
    Preserved,
    /// The rule did not apply (separate mode, disabled, or a dedicated
    /// tracker call in flight).
    Skipped,
}

/// What a swipe event means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeKind {
    /// The slot is empty; a generation will follow.
    Generate,
    /// The slot already has a reply; only the display changes.
    Navigate,
}

/// The result of handling a received assistant message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceivedMessage {
    /// Sections parsed from the message.
    pub snapshot: TrackerSnapshot,
    /// Message text with tracker blocks removed, when it should replace the
    /// displayed text.
    pub display_text: Option<String>,
    /// Whether the parse was auto-committed.
    pub auto_committed: bool,
}

/// The user sent a message.
pub fn on_message_sent(state: &mut SessionState) {
    state.set_last_action_was_swipe(false);
}

/// The user swiped message `message` to `swipe_id`.
///
/// An empty slot marks the next generation as a re-roll. A filled slot
/// restores the trackers stored with it.
pub fn on_message_swiped(
    state: &mut SessionState,
    repo: &dyn SwipeRepository,
    message: usize,
    swipe_id: usize,
    parser: &ParserConfig,
) -> SwipeKind {
    if !repo.has_swipe_content(message, swipe_id) {
        debug!(message, swipe_id, "swipe to empty slot, next generation re-rolls");
        state.set_last_action_was_swipe(true);
        return SwipeKind::Generate;
    }

    match repo.swipe_data(message, swipe_id) {
        Some(data) => {
            debug!(message, swipe_id, "restoring trackers for swipe");
            apply_stats_text(state, &data, parser);
            state.set_last_generated(data);
        }
        None => debug!(message, swipe_id, "swipe has no stored trackers"),
    }
    SwipeKind::Navigate
}

/// A main generation is about to start.
pub fn on_generation_started(state: &mut SessionState) -> CommitDecision {
    let settings = state.settings();
    if !settings.enabled
        || settings.generation_mode != GenerationMode::Together
        || state.is_generating()
    {
        return CommitDecision::Skipped;
    }
    apply_commit_rule(state)
}

/// Commit unless the pending generation re-rolls an existing turn.
pub(crate) fn apply_commit_rule(state: &mut SessionState) -> CommitDecision {
    if state.last_action_was_swipe() {
        debug!("re-roll, keeping committed trackers");
        CommitDecision::Preserved
    } else {
        state.commit();
        CommitDecision::Committed
    }
}

/// An assistant message arrived.
///
/// In together mode the trackers are parsed from the message, stored with
/// its current swipe, and stripped from the displayed text. Separate mode
/// leaves trackers to the dedicated call.
pub fn on_message_received(
    state: &mut SessionState,
    repo: &mut dyn SwipeRepository,
    message: usize,
    text: &str,
    parser: &ParserConfig,
) -> ReceivedMessage {
    let settings = state.settings();
    if !settings.enabled || settings.generation_mode != GenerationMode::Together {
        return ReceivedMessage::default();
    }

    let snapshot = parse_response(text);
    let auto_committed = record_snapshot(state, repo, Some(message), &snapshot, parser);
    ReceivedMessage {
        snapshot,
        display_text: Some(strip_tracker_blocks(text)),
        auto_committed,
    }
}

/// Generation finished, successfully or not.
///
/// Returns true when the settings changed and should be saved.
pub fn on_generation_ended(state: &mut SessionState) -> bool {
    state.set_last_action_was_swipe(false);
    if state.settings_mut().last_dice_roll.take().is_some() {
        debug!("cleared consumed dice roll");
        return true;
    }
    false
}

/// Fold a freshly parsed snapshot into the state.
///
/// Present sections replace the displayed ones, the Stats section is parsed
/// into settings, the result is stored with the message's current swipe, and
/// an empty or placeholder committed snapshot is replaced. Returns whether
/// that auto-commit happened.
pub(crate) fn record_snapshot(
    state: &mut SessionState,
    repo: &mut dyn SwipeRepository,
    message: Option<usize>,
    snapshot: &TrackerSnapshot,
    parser: &ParserConfig,
) -> bool {
    if snapshot.is_empty() {
        debug!("no tracker sections in response");
        return false;
    }

    state.update_last_generated(snapshot);
    apply_stats_text(state, snapshot, parser);

    if let Some(message) = message {
        let swipe_id = repo.current_swipe_id(message).unwrap_or(0);
        if let Err(e) = repo.set_swipe_data(message, swipe_id, state.last_generated()) {
            warn!(message, swipe_id, error = %e, "could not store swipe trackers");
        }
    }

    if state.committed().is_placeholder() {
        state.commit();
        info!("auto-committed first tracker data for this chat");
        return true;
    }
    false
}

fn apply_stats_text(state: &mut SessionState, snapshot: &TrackerSnapshot, parser: &ParserConfig) {
    if let Some(text) = snapshot.get(TrackerSection::Stats) {
        let settings = state.settings_mut();
        parse_user_stats(text, &mut settings.user_stats, &mut settings.quests, parser);
    }
}
