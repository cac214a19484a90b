//! The companion session: state, chat and storage wired to host events.
//!
//! `CompanionSession` plays the host's part for a single chat. Each public
//! method corresponds to one host event or one panel action, and `process`
//! exposes the same operations as line commands.

use std::fmt::Write as _;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;
use tracing::{debug, warn};

use rpgc_core::{
    Attribute, DiceRoll, GenerationMode, Meter, TrackerSection, TrackerSnapshot,
};

use crate::chat::{ChatHistory, ChatLog, ChatMessage};
use crate::config::SessionConfig;
use crate::edit::StatsEdit;
use crate::error::{SessionError, SessionResult};
use crate::generation::{
    TextGenerator, begin_tracker_update, finish_tracker_update, update_trackers,
};
use crate::injector::{InjectedPrompts, inject_prompts};
use crate::persistence::{
    ChatData, HostStorage, StorageSlot, load_chat_data, load_settings, save_chat_data,
    save_settings,
};
use crate::prompt::{PromptMessage, generate_contextual_summary, generate_separate_update_prompt};
use crate::reconciler::{
    CommitDecision, ReceivedMessage, SwipeKind, on_generation_ended, on_generation_started,
    on_message_received, on_message_sent, on_message_swiped,
};
use crate::state::SessionState;
use crate::swipes::SwipeRepository;

const HELP: &str = "\
Commands:
  send <text>              Send a player message
  reply <text>             Add an assistant reply (\\n for newlines)
  swipe <text>             Re-roll the last reply into a new swipe
  nav <index>              Show an existing swipe of the last reply
  trackers <text>          Queue the reply of the next dedicated tracker call
  edit <field> <value>     Edit stats (see `help edit`)
  roll <formula>           Roll dice, e.g. roll 1d20+2
  commit-roll              Save the pending roll for the next prompt
  attr <STR..CHA> <delta>  Adjust a classic attribute
  mode <together|separate> Switch generation mode
  plot <on|off>            Toggle plot-progression generation
  prompt                   Show the prompt for the next generation
  summary                  Show the separate-mode context digest
  status                   Show stats, trackers and flags
  quit                     Exit";

/// Where a generation writes its reply.
enum Target {
    NewMessage,
    NewSwipe(usize),
}

/// An interactive companion session for one chat.
pub struct CompanionSession {
    state: SessionState,
    config: SessionConfig,
    chat: ChatLog,
    storage: Box<dyn HostStorage>,
    injected: InjectedPrompts,
    queued_tracker_reply: Option<String>,
    rng: StdRng,
}

impl CompanionSession {
    /// Open a session, loading settings, chat data and the chat from
    /// `storage`. Unreadable documents fall back to defaults.
    pub fn new(config: SessionConfig, mut storage: Box<dyn HostStorage>) -> Self {
        let loaded = load_settings(storage.as_mut());
        let data = load_chat_data(storage.as_ref());
        let chat = load_chat(storage.as_ref());

        let mut state = SessionState::new(loaded.settings);
        state.set_last_generated(data.last_generated_data);
        state.set_committed(data.committed_tracker_data);

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        debug!(messages = chat.len(), "session opened");
        Self {
            state,
            config,
            chat,
            storage,
            injected: InjectedPrompts::new(),
            queued_tracker_reply: None,
            rng,
        }
    }

    /// The session state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The chat.
    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    /// Prompts injected for the most recent generation.
    pub fn injected(&self) -> &InjectedPrompts {
        &self.injected
    }

    /// Append a player message. Returns its index.
    pub fn send_user_message(&mut self, text: &str) -> usize {
        let index = self
            .chat
            .push(ChatMessage::user(&self.config.user_name, text));
        on_message_sent(&mut self.state);
        self.persist();
        index
    }

    /// Run a generation that produces a new assistant message.
    ///
    /// In separate mode with auto-update on, a queued tracker reply (see
    /// [`queue_tracker_reply`](Self::queue_tracker_reply)) is used as the
    /// dedicated call's result.
    pub fn reply(&mut self, text: &str) -> SessionResult<ReceivedMessage> {
        let mut received = self.open_generation(Target::NewMessage, text)?;
        if let Some(snapshot) = self.run_queued_tracker_reply() {
            received.snapshot = snapshot;
        }
        self.close_generation();
        Ok(received)
    }

    /// Re-roll the last assistant message into a new swipe.
    pub fn swipe(&mut self, text: &str) -> SessionResult<ReceivedMessage> {
        let message = self.begin_swipe()?;
        let mut received = self.open_generation(Target::NewSwipe(message), text)?;
        if let Some(snapshot) = self.run_queued_tracker_reply() {
            received.snapshot = snapshot;
        }
        self.close_generation();
        Ok(received)
    }

    /// Like [`reply`](Self::reply), but runs the dedicated tracker call
    /// through `generator` when separate mode and auto-update are on.
    pub async fn reply_with_trackers<G: TextGenerator>(
        &mut self,
        text: &str,
        generator: &mut G,
    ) -> SessionResult<ReceivedMessage> {
        let mut received = self.open_generation(Target::NewMessage, text)?;
        if self.wants_tracker_call() {
            received.snapshot = self.tracker_call(generator).await;
        }
        self.close_generation();
        Ok(received)
    }

    /// Like [`swipe`](Self::swipe), with the dedicated call run through
    /// `generator`.
    pub async fn swipe_with_trackers<G: TextGenerator>(
        &mut self,
        text: &str,
        generator: &mut G,
    ) -> SessionResult<ReceivedMessage> {
        let message = self.begin_swipe()?;
        let mut received = self.open_generation(Target::NewSwipe(message), text)?;
        if self.wants_tracker_call() {
            received.snapshot = self.tracker_call(generator).await;
        }
        self.close_generation();
        Ok(received)
    }

    /// Run a dedicated tracker call on demand (separate mode).
    pub async fn update_trackers<G: TextGenerator>(
        &mut self,
        generator: &mut G,
    ) -> SessionResult<Option<TrackerSnapshot>> {
        let result = update_trackers(&mut self.state, &mut self.chat, generator, &self.config).await;
        self.persist();
        result
    }

    /// Hold `text` as the reply of the next dedicated tracker call made by
    /// [`reply`](Self::reply) or [`swipe`](Self::swipe).
    pub fn queue_tracker_reply(&mut self, text: &str) {
        self.queued_tracker_reply = Some(text.to_string());
    }

    /// Show an existing swipe of the last assistant message.
    pub fn navigate(&mut self, swipe_id: usize) -> SessionResult<SwipeKind> {
        let message = self
            .chat
            .last_assistant()
            .ok_or(SessionError::NoAssistantMessage)?;
        self.chat.get_mut(message)?.select_swipe(swipe_id)?;
        let kind = on_message_swiped(
            &mut self.state,
            &self.chat,
            message,
            swipe_id,
            &self.config.parser,
        );
        self.persist();
        Ok(kind)
    }

    /// Apply a manual stats edit. Returns the regenerated Stats text.
    ///
    /// The current swipe of the last assistant message is updated too, so
    /// swiping away and back keeps the edit.
    pub fn edit(&mut self, edit: &StatsEdit) -> SessionResult<String> {
        let text = self.state.apply_stats_edit(edit, &self.config.user_name)?;
        if let Some(message) = self.chat.last_assistant() {
            let swipe_id = self.chat.current_swipe_id(message).unwrap_or(0);
            self.chat
                .set_swipe_data(message, swipe_id, self.state.last_generated())?;
        }
        self.persist();
        Ok(text)
    }

    /// Roll dice. The result stays pending until committed.
    pub fn roll(&mut self, formula: &str) -> SessionResult<DiceRoll> {
        self.state.roll_dice(formula, &mut self.rng).cloned()
    }

    /// Save the pending roll so the next prompt recaps it.
    pub fn commit_roll(&mut self) -> SessionResult<DiceRoll> {
        let roll = self.state.commit_dice_roll()?;
        self.persist();
        Ok(roll)
    }

    /// Adjust a classic attribute. Returns the new value.
    pub fn adjust_attribute(&mut self, attribute: Attribute, delta: i32) -> i32 {
        let value = self
            .state
            .settings_mut()
            .classic_stats
            .adjust(attribute, delta);
        self.persist();
        value
    }

    /// Switch the generation mode.
    pub fn set_mode(&mut self, mode: GenerationMode) -> SessionResult<()> {
        self.update_settings(&json!({ "generationMode": mode }))
    }

    /// Shallow-merge a settings fragment and save.
    pub fn update_settings(&mut self, fragment: &serde_json::Value) -> SessionResult<()> {
        self.state.update_settings(fragment)?;
        self.persist();
        Ok(())
    }

    /// Mark the next generation as an out-of-band plot nudge.
    pub fn set_plot_progression(&mut self, on: bool) {
        self.state.set_plot_progression(on);
    }

    /// The prompt messages the next generation would add.
    ///
    /// Together mode yields the injected instructions and example; separate
    /// mode yields the dedicated tracker call's message array.
    pub fn next_prompt(&self) -> Vec<PromptMessage> {
        match self.state.settings().generation_mode {
            GenerationMode::Together => {
                let mut injected = InjectedPrompts::new();
                inject_prompts(&self.state, &self.chat, &self.config, &mut injected);
                injected
                    .iter()
                    .map(|(_, p)| PromptMessage::new(p.role, p.text.clone()))
                    .collect()
            }
            GenerationMode::Separate => {
                generate_separate_update_prompt(&self.state, &self.chat, &self.config)
            }
        }
    }

    /// The separate-mode context digest.
    pub fn summary(&self) -> String {
        generate_contextual_summary(&self.state, &self.config)
    }

    /// A readable overview of stats, trackers and flags.
    pub fn status(&self) -> String {
        let settings = self.state.settings();
        let stats = &settings.user_stats;
        let mut out = String::new();

        let _ = writeln!(
            out,
            "Mode: {}{}",
            settings.generation_mode,
            if settings.enabled { "" } else { " (disabled)" }
        );
        let _ = writeln!(
            out,
            "Level {} | {}",
            settings.level,
            settings.classic_stats.summary()
        );
        let meters: Vec<String> = Meter::ALL
            .iter()
            .map(|m| format!("{m} {}%", stats.meter(*m)))
            .collect();
        let _ = writeln!(out, "{}", meters.join(" | "));
        let _ = writeln!(out, "Mood: {} ({})", stats.mood, stats.conditions);
        let _ = writeln!(out, "On Person: {}", stats.inventory.on_person);
        for (location, items) in &stats.inventory.stored {
            let _ = writeln!(out, "Stored - {location}: {items}");
        }
        let _ = writeln!(out, "Assets: {}", stats.inventory.assets);
        let _ = writeln!(out, "Main Quest: {}", settings.quests.main);
        if !settings.quests.optional.is_empty() {
            let _ = writeln!(out, "Optional Quests: {}", settings.quests.optional.join(", "));
        }
        if let Some(roll) = self.state.pending_dice_roll() {
            let _ = writeln!(out, "Pending roll: {roll}");
        }
        if let Some(roll) = &settings.last_dice_roll {
            let _ = writeln!(out, "Saved roll: {roll}");
        }
        let _ = writeln!(out, "Displayed: {}", section_list(self.state.last_generated()));
        let _ = write!(out, "Committed: {}", section_list(self.state.committed()));
        out
    }

    /// Process a line of user input and return a response.
    pub fn process(&mut self, input: &str) -> SessionResult<String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(String::new());
        }

        let parts: Vec<&str> = trimmed.splitn(2, ' ').collect();
        let cmd = parts[0].to_lowercase();
        let rest = parts.get(1).map(|s| s.trim()).unwrap_or("");

        match cmd.as_str() {
            "send" => self.do_send(rest),
            "reply" => self.do_reply(rest),
            "swipe" => self.do_swipe(rest),
            "nav" => self.do_nav(rest),
            "trackers" => self.do_trackers(rest),
            "edit" => self.edit(&StatsEdit::parse(rest)?),
            "roll" => self.do_roll(rest),
            "commit-roll" => self.commit_roll().map(|r| format!("Saved roll {r}")),
            "attr" => self.do_attr(rest),
            "mode" => self.do_mode(rest),
            "plot" => self.do_plot(rest),
            "prompt" => Ok(render_prompt(&self.next_prompt())),
            "summary" => Ok(self.summary()),
            "status" => Ok(self.status()),
            "help" if rest.eq_ignore_ascii_case("edit") => Ok(crate::edit::EDIT_USAGE.to_string()),
            "help" => Ok(HELP.to_string()),
            "quit" | "q" => Ok("Goodbye!".to_string()),
            _ => Err(SessionError::UnknownCommand(cmd)),
        }
    }

    fn do_send(&mut self, rest: &str) -> SessionResult<String> {
        if rest.is_empty() {
            return Err(usage("send <text>"));
        }
        let index = self.send_user_message(&unescape(rest));
        Ok(format!("Message #{index} sent."))
    }

    fn do_reply(&mut self, rest: &str) -> SessionResult<String> {
        if rest.is_empty() {
            return Err(usage("reply <text>"));
        }
        let received = self.reply(&unescape(rest))?;
        Ok(self.describe_received(&received))
    }

    fn do_swipe(&mut self, rest: &str) -> SessionResult<String> {
        if rest.is_empty() {
            return Err(usage("swipe <text>"));
        }
        let received = self.swipe(&unescape(rest))?;
        Ok(self.describe_received(&received))
    }

    fn do_nav(&mut self, rest: &str) -> SessionResult<String> {
        let swipe_id: usize = rest.parse().map_err(|_| usage("nav <index>"))?;
        match self.navigate(swipe_id)? {
            SwipeKind::Navigate => Ok(format!("Showing swipe {swipe_id}.")),
            SwipeKind::Generate => Ok(format!("Swipe {swipe_id} is empty.")),
        }
    }

    fn do_trackers(&mut self, rest: &str) -> SessionResult<String> {
        if rest.is_empty() {
            return Err(usage("trackers <text>"));
        }
        self.queue_tracker_reply(&unescape(rest));
        Ok("Tracker reply queued for the next dedicated call.".to_string())
    }

    fn do_roll(&mut self, rest: &str) -> SessionResult<String> {
        if rest.is_empty() {
            return Err(usage("roll <formula>"));
        }
        let roll = self.roll(rest)?;
        Ok(format!("Rolled {roll}"))
    }

    fn do_attr(&mut self, rest: &str) -> SessionResult<String> {
        let (name, delta) = rest.split_once(' ').ok_or_else(|| usage("attr <STR..CHA> <delta>"))?;
        let attribute = Attribute::parse(name)
            .ok_or_else(|| SessionError::InvalidInput(format!("unknown attribute: {name}")))?;
        let delta: i32 = delta
            .trim()
            .trim_start_matches('+')
            .parse()
            .map_err(|_| SessionError::InvalidInput(format!("not a number: {delta}")))?;
        let value = self.adjust_attribute(attribute, delta);
        Ok(format!("{} is now {value}", attribute.abbrev()))
    }

    fn do_mode(&mut self, rest: &str) -> SessionResult<String> {
        let mode = GenerationMode::parse(rest).ok_or_else(|| usage("mode <together|separate>"))?;
        self.set_mode(mode)?;
        Ok(format!("Generation mode: {mode}"))
    }

    fn do_plot(&mut self, rest: &str) -> SessionResult<String> {
        let on = match rest.to_lowercase().as_str() {
            "on" => true,
            "off" => false,
            _ => return Err(usage("plot <on|off>")),
        };
        self.set_plot_progression(on);
        Ok(format!("Plot progression {}", if on { "on" } else { "off" }))
    }

    fn describe_received(&self, received: &ReceivedMessage) -> String {
        let text = self
            .chat
            .last_assistant()
            .and_then(|i| self.chat.get(i).ok())
            .map(|m| m.mes.clone())
            .unwrap_or_default();
        let mut out = text;
        if !received.snapshot.is_empty() {
            let _ = write!(out, "\n[trackers: {}]", section_list(&received.snapshot));
        }
        if received.auto_committed {
            out.push_str("\n[committed as first tracker state]");
        }
        out
    }

    fn begin_swipe(&mut self) -> SessionResult<usize> {
        let message = self
            .chat
            .last_assistant()
            .ok_or(SessionError::NoAssistantMessage)?;
        let next_slot = self.chat.get(message)?.swipes.len();
        on_message_swiped(
            &mut self.state,
            &self.chat,
            message,
            next_slot,
            &self.config.parser,
        );
        Ok(message)
    }

    fn wants_tracker_call(&self) -> bool {
        let settings = self.state.settings();
        settings.enabled && settings.auto_update && settings.generation_mode == GenerationMode::Separate
    }

    fn open_generation(&mut self, target: Target, text: &str) -> SessionResult<ReceivedMessage> {
        let decision = on_generation_started(&mut self.state);
        if decision != CommitDecision::Skipped {
            debug!(?decision, "commit rule applied");
        }
        inject_prompts(&self.state, &self.chat, &self.config, &mut self.injected);

        let message = match target {
            Target::NewMessage => self
                .chat
                .push(ChatMessage::assistant(&self.config.character_name, text)),
            Target::NewSwipe(message) => {
                self.chat.get_mut(message)?.push_swipe(text);
                message
            }
        };

        let received = on_message_received(
            &mut self.state,
            &mut self.chat,
            message,
            text,
            &self.config.parser,
        );
        if let Some(display) = &received.display_text {
            self.chat.get_mut(message)?.set_text(display);
        }
        Ok(received)
    }

    fn close_generation(&mut self) {
        on_generation_ended(&mut self.state);
        self.state.set_plot_progression(false);
        self.persist();
    }

    fn run_queued_tracker_reply(&mut self) -> Option<TrackerSnapshot> {
        if !self.wants_tracker_call() {
            return None;
        }
        let text = self.queued_tracker_reply.take()?;
        match begin_tracker_update(&mut self.state, &self.chat, &self.config) {
            Ok(Some(_)) => {}
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "tracker update not started");
                return None;
            }
        }
        let message = self.chat.last_assistant();
        finish_tracker_update(
            &mut self.state,
            &mut self.chat,
            message,
            Ok(text),
            &self.config.parser,
        )
        .ok()
    }

    async fn tracker_call<G: TextGenerator>(&mut self, generator: &mut G) -> TrackerSnapshot {
        update_trackers(&mut self.state, &mut self.chat, generator, &self.config)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// Write settings, chat data and the chat to storage. Failures are
    /// logged; the in-memory state stays authoritative.
    pub fn persist(&mut self) {
        if let Err(e) = save_settings(self.storage.as_mut(), self.state.settings()) {
            warn!(error = %e, "could not save settings");
        }
        let data = ChatData {
            last_generated_data: self.state.last_generated().clone(),
            committed_tracker_data: self.state.committed().clone(),
        };
        if let Err(e) = save_chat_data(self.storage.as_mut(), &data) {
            warn!(error = %e, "could not save chat data");
        }
        let chat = match serde_json::to_value(&self.chat) {
            Ok(chat) => chat,
            Err(e) => {
                warn!(error = %e, "could not serialize chat");
                return;
            }
        };
        if let Err(e) = self.storage.write(StorageSlot::Chat, &chat) {
            warn!(error = %e, "could not save chat");
        }
    }
}

fn load_chat(storage: &dyn HostStorage) -> ChatLog {
    match storage.read(StorageSlot::Chat) {
        Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(error = %e, "saved chat is corrupt, starting empty");
            ChatLog::new()
        }),
        Ok(None) => ChatLog::new(),
        Err(e) => {
            warn!(error = %e, "could not read saved chat");
            ChatLog::new()
        }
    }
}

fn usage(text: &str) -> SessionError {
    SessionError::InvalidInput(format!("usage: {text}"))
}

fn unescape(text: &str) -> String {
    text.replace("\\n", "\n")
}

fn section_list(snapshot: &TrackerSnapshot) -> String {
    let names: Vec<&str> = TrackerSection::ALL
        .into_iter()
        .filter(|s| snapshot.get(*s).is_some())
        .map(TrackerSection::name)
        .collect();
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

/// Render prompt messages as `[role]` blocks.
pub fn render_prompt(messages: &[PromptMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("[{}]\n{}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}
