//! The dedicated tracker call used in separate mode.
//!
//! A call has three steps: [`begin_tracker_update`] checks the reentrancy
//! guard, applies the commit rule and builds the prompt; the host's
//! [`TextGenerator`] runs it; [`finish_tracker_update`] parses the result and
//! releases the guard. [`update_trackers`] does all three.

use tracing::{debug, warn};

use rpgc_core::{GenerationMode, TrackerSnapshot};
use rpgc_parser::{ParserConfig, parse_response};

use crate::chat::ChatHistory;
use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::prompt::{PromptMessage, generate_separate_update_prompt};
use crate::reconciler::{apply_commit_rule, record_snapshot};
use crate::state::SessionState;
use crate::swipes::SwipeRepository;

/// The host's text-generation API.
pub trait TextGenerator {
    /// Run a chat completion and return the reply text.
    fn generate(&mut self, messages: &[PromptMessage]) -> impl Future<Output = SessionResult<String>>;
}

/// Start a dedicated tracker call.
///
/// Returns `Ok(None)` when the extension is disabled or another call is
/// already running; a second call is ignored rather than queued.
pub fn begin_tracker_update(
    state: &mut SessionState,
    history: &dyn ChatHistory,
    config: &SessionConfig,
) -> SessionResult<Option<Vec<PromptMessage>>> {
    let settings = state.settings();
    if !settings.enabled {
        return Ok(None);
    }
    if settings.generation_mode != GenerationMode::Separate {
        return Err(SessionError::WrongMode(settings.generation_mode));
    }
    if state.is_generating() {
        debug!("tracker update already running, ignoring request");
        return Ok(None);
    }

    apply_commit_rule(state);
    state.set_generating(true);
    Ok(Some(generate_separate_update_prompt(state, history, config)))
}

/// Finish a dedicated tracker call with the generator's result.
///
/// The guard is always released. A failed call is logged and returned; it is
/// not retried.
pub fn finish_tracker_update(
    state: &mut SessionState,
    repo: &mut dyn SwipeRepository,
    message: Option<usize>,
    result: SessionResult<String>,
    parser: &ParserConfig,
) -> SessionResult<TrackerSnapshot> {
    state.set_generating(false);
    let text = result.inspect_err(|e| warn!(error = %e, "tracker generation failed"))?;
    let snapshot = parse_response(&text);
    record_snapshot(state, repo, message, &snapshot, parser);
    Ok(snapshot)
}

/// Run a full dedicated tracker call against the last assistant message.
pub async fn update_trackers<G, H>(
    state: &mut SessionState,
    host: &mut H,
    generator: &mut G,
    config: &SessionConfig,
) -> SessionResult<Option<TrackerSnapshot>>
where
    G: TextGenerator,
    H: ChatHistory + SwipeRepository,
{
    let Some(prompt) = begin_tracker_update(state, &*host, config)? else {
        return Ok(None);
    };
    let message = host.last_assistant_before(host.len());
    let result = generator.generate(&prompt).await;
    finish_tracker_update(state, host, message, result, &config.parser).map(Some)
}
