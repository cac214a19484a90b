//! Placing tracker prompts into the next completion request.

use std::collections::BTreeMap;

use tracing::debug;

use rpgc_core::GenerationMode;

use crate::chat::ChatHistory;
use crate::config::SessionConfig;
use crate::prompt::{
    HTML_PROMPT, PromptRole, generate_contextual_summary, generate_tracker_example,
    generate_tracker_instructions,
};
use crate::state::SessionState;

/// Key for the tracker format instructions.
pub const INSTRUCTIONS_KEY: &str = "rpg-companion-instructions";
/// Key for the previous-turn tracker example.
pub const EXAMPLE_KEY: &str = "rpg-companion-example";
/// Key for the separate-mode context digest.
pub const CONTEXT_KEY: &str = "rpg-companion-context";
/// Key for the rich-media addendum.
pub const HTML_KEY: &str = "rpg-companion-html";

const ALL_KEYS: [&str; 4] = [INSTRUCTIONS_KEY, EXAMPLE_KEY, CONTEXT_KEY, HTML_KEY];

/// The host's prompt-injection API. Empty text clears a key.
pub trait PromptInjector {
    /// Place `text` `depth` messages from the end of the prompt.
    fn set_extension_prompt(&mut self, key: &str, text: &str, depth: usize, role: PromptRole);
}

/// One injected prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectedPrompt {
    /// Prompt text.
    pub text: String,
    /// Messages from the end of the prompt.
    pub depth: usize,
    /// Message role.
    pub role: PromptRole,
}

/// An in-memory [`PromptInjector`] that records what was injected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectedPrompts {
    prompts: BTreeMap<String, InjectedPrompt>,
}

impl InjectedPrompts {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The prompt stored under `key`.
    pub fn get(&self, key: &str) -> Option<&InjectedPrompt> {
        self.prompts.get(key)
    }

    /// All prompts, by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &InjectedPrompt)> {
        self.prompts.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether nothing is injected.
    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}

impl PromptInjector for InjectedPrompts {
    fn set_extension_prompt(&mut self, key: &str, text: &str, depth: usize, role: PromptRole) {
        if text.is_empty() {
            self.prompts.remove(key);
            return;
        }
        self.prompts.insert(
            key.to_string(),
            InjectedPrompt {
                text: text.to_string(),
                depth,
                role,
            },
        );
    }
}

fn clear(injector: &mut dyn PromptInjector, key: &str) {
    injector.set_extension_prompt(key, "", 0, PromptRole::System);
}

/// Depth at which the tracker example sits directly after the last
/// assistant turn the model will see.
///
/// When the pending generation re-rolls the trailing assistant message, that
/// message is not part of the prompt, so the one before it is used.
pub fn example_depth(history: &dyn ChatHistory, re_rolling: bool) -> usize {
    let mut visible = history.len();
    if re_rolling
        && visible > 0
        && history.entry(visible - 1).is_some_and(|e| !e.is_user)
    {
        visible -= 1;
    }
    match history.last_assistant_before(visible) {
        Some(index) => visible - 1 - index,
        None => visible,
    }
}

/// Inject the prompts for the upcoming generation.
///
/// Together mode gets the format instructions and the committed example;
/// separate mode gets the context digest and, when enabled, the rich-media
/// addendum. A disabled extension or a plot-progression nudge clears every
/// key.
pub fn inject_prompts(
    state: &SessionState,
    history: &dyn ChatHistory,
    config: &SessionConfig,
    injector: &mut dyn PromptInjector,
) {
    let settings = state.settings();
    if !settings.enabled || state.is_plot_progression() {
        debug!("clearing tracker prompts");
        for key in ALL_KEYS {
            clear(injector, key);
        }
        return;
    }

    match settings.generation_mode {
        GenerationMode::Together => {
            let instructions = generate_tracker_instructions(
                state,
                &config.user_name,
                settings.enable_html_prompt,
                true,
            );
            injector.set_extension_prompt(INSTRUCTIONS_KEY, &instructions, 0, PromptRole::System);
            match generate_tracker_example(state) {
                Some(example) => {
                    let depth = example_depth(history, state.last_action_was_swipe());
                    injector.set_extension_prompt(EXAMPLE_KEY, &example, depth, PromptRole::Assistant);
                }
                None => clear(injector, EXAMPLE_KEY),
            }
            clear(injector, CONTEXT_KEY);
            clear(injector, HTML_KEY);
        }
        GenerationMode::Separate => {
            let summary = generate_contextual_summary(state, config);
            injector.set_extension_prompt(CONTEXT_KEY, &summary, 1, PromptRole::System);
            let html = if settings.enable_html_prompt {
                HTML_PROMPT
            } else {
                ""
            };
            injector.set_extension_prompt(HTML_KEY, html, 0, PromptRole::System);
            clear(injector, INSTRUCTIONS_KEY);
            clear(injector, EXAMPLE_KEY);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatLog, ChatMessage};
    use rpgc_core::TrackerSnapshot;

    fn chat() -> ChatLog {
        let mut log = ChatLog::new();
        log.push(ChatMessage::assistant("N", "a"));
        log.push(ChatMessage::user("U", "b"));
        log.push(ChatMessage::assistant("N", "c"));
        log.push(ChatMessage::user("U", "d"));
        log
    }

    fn state_with_commit() -> SessionState {
        let mut state = SessionState::default();
        state.set_last_generated(TrackerSnapshot {
            user_stats: Some("Stats\n---\nHealth: 70%\nEnergy: 20%".into()),
            ..Default::default()
        });
        state.commit();
        state
    }

    #[test]
    fn depth_after_new_user_message() {
        assert_eq!(example_depth(&chat(), false), 1);
    }

    #[test]
    fn depth_when_re_rolling() {
        let mut log = chat();
        log.push(ChatMessage::assistant("N", "e"));
        assert_eq!(example_depth(&log, false), 0);
        assert_eq!(example_depth(&log, true), 1);
        assert_eq!(example_depth(&ChatLog::new(), true), 0);
    }

    #[test]
    fn together_mode_injection() {
        let state = state_with_commit();
        let mut injected = InjectedPrompts::new();
        inject_prompts(&state, &chat(), &SessionConfig::default(), &mut injected);

        let instructions = injected.get(INSTRUCTIONS_KEY).unwrap();
        assert_eq!((instructions.depth, instructions.role), (0, PromptRole::System));
        let example = injected.get(EXAMPLE_KEY).unwrap();
        assert_eq!((example.depth, example.role), (1, PromptRole::Assistant));
        assert!(example.text.contains("Health: 70%"));
        assert!(injected.get(CONTEXT_KEY).is_none());
    }

    #[test]
    fn separate_mode_injection() {
        let mut state = state_with_commit();
        state.settings_mut().generation_mode = GenerationMode::Separate;
        state.settings_mut().enable_html_prompt = true;
        let mut injected = InjectedPrompts::new();
        inject_prompts(&state, &chat(), &SessionConfig::default(), &mut injected);

        let context = injected.get(CONTEXT_KEY).unwrap();
        assert_eq!(context.depth, 1);
        assert!(context.text.contains("Health 70%"));
        assert_eq!(injected.get(HTML_KEY).unwrap().text, HTML_PROMPT);
        assert!(injected.get(INSTRUCTIONS_KEY).is_none());
        assert!(injected.get(EXAMPLE_KEY).is_none());
    }

    #[test]
    fn plot_progression_clears_everything() {
        let mut state = state_with_commit();
        let mut injected = InjectedPrompts::new();
        inject_prompts(&state, &chat(), &SessionConfig::default(), &mut injected);
        assert!(!injected.is_empty());

        state.set_plot_progression(true);
        inject_prompts(&state, &chat(), &SessionConfig::default(), &mut injected);
        assert!(injected.is_empty());
    }

    #[test]
    fn disabled_extension_injects_nothing() {
        let mut state = state_with_commit();
        state.settings_mut().enabled = false;
        let mut injected = InjectedPrompts::new();
        inject_prompts(&state, &chat(), &SessionConfig::default(), &mut injected);
        assert!(injected.is_empty());
    }
}
