//! An in-memory host chat.
//!
//! `ChatLog` stands in for the host application's message list. It carries
//! just enough of the host's message shape (name, text, swipes, the selected
//! swipe, and the `extra` bag) for the session to store per-swipe tracker
//! data and to slice recent history into prompts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use rpgc_core::TrackerSnapshot;

use crate::error::{SessionError, SessionResult};
use crate::swipes::{SwipeRepository, read_swipe_data, write_swipe_data};

/// One chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Speaker name.
    pub name: String,
    /// Whether the player wrote this message.
    pub is_user: bool,
    /// Displayed text (the selected swipe).
    pub mes: String,
    /// Index of the selected swipe.
    #[serde(default)]
    pub swipe_id: usize,
    /// Every reply variant.
    #[serde(default)]
    pub swipes: Vec<String>,
    /// Extension data.
    #[serde(default)]
    pub extra: Map<String, Value>,
}

impl ChatMessage {
    /// A player message.
    pub fn user(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            is_user: true,
            mes: text.to_string(),
            swipe_id: 0,
            swipes: vec![text.to_string()],
            extra: Map::new(),
        }
    }

    /// An assistant message with a single swipe.
    pub fn assistant(name: &str, text: &str) -> Self {
        Self {
            is_user: false,
            ..Self::user(name, text)
        }
    }

    /// Replace the text of the selected swipe.
    pub fn set_text(&mut self, text: &str) {
        self.mes = text.to_string();
        match self.swipes.get_mut(self.swipe_id) {
            Some(slot) => *slot = text.to_string(),
            None => self.swipes.push(text.to_string()),
        }
    }

    /// Append a swipe, select it, and return its index.
    pub fn push_swipe(&mut self, text: &str) -> usize {
        self.swipes.push(text.to_string());
        self.swipe_id = self.swipes.len() - 1;
        self.mes = text.to_string();
        self.swipe_id
    }

    /// Select an existing swipe.
    pub fn select_swipe(&mut self, swipe_id: usize) -> SessionResult<()> {
        let text = self
            .swipes
            .get(swipe_id)
            .ok_or(SessionError::SwipeNotFound(swipe_id))?;
        self.mes = text.clone();
        self.swipe_id = swipe_id;
        Ok(())
    }
}

/// A message as seen by the prompt builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry<'a> {
    /// Whether the player wrote it.
    pub is_user: bool,
    /// Speaker name.
    pub name: &'a str,
    /// Displayed text.
    pub text: &'a str,
}

/// Read access to the host's chat history.
pub trait ChatHistory {
    /// Number of messages.
    fn len(&self) -> usize;

    /// The message at `index`.
    fn entry(&self, index: usize) -> Option<HistoryEntry<'_>>;

    /// Whether the chat is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the last assistant message strictly before `end`.
    fn last_assistant_before(&self, end: usize) -> Option<usize> {
        (0..end.min(self.len()))
            .rev()
            .find(|&i| self.entry(i).is_some_and(|e| !e.is_user))
    }

    /// The last `count` messages before `end`, oldest first.
    fn recent_before(&self, end: usize, count: usize) -> Vec<HistoryEntry<'_>> {
        let end = end.min(self.len());
        (end.saturating_sub(count)..end)
            .filter_map(|i| self.entry(i))
            .collect()
    }
}

/// The chat message list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    /// An empty chat.
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Append a message and return its index.
    pub fn push(&mut self, message: ChatMessage) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// The message at `index`.
    pub fn get(&self, index: usize) -> SessionResult<&ChatMessage> {
        self.messages
            .get(index)
            .ok_or(SessionError::MessageNotFound(index))
    }

    /// The message at `index`, mutably.
    pub fn get_mut(&mut self, index: usize) -> SessionResult<&mut ChatMessage> {
        self.messages
            .get_mut(index)
            .ok_or(SessionError::MessageNotFound(index))
    }

    /// Index of the last assistant message.
    pub fn last_assistant(&self) -> Option<usize> {
        self.last_assistant_before(self.messages.len())
    }
}

impl ChatHistory for ChatLog {
    fn len(&self) -> usize {
        self.messages.len()
    }

    fn entry(&self, index: usize) -> Option<HistoryEntry<'_>> {
        self.messages.get(index).map(|m| HistoryEntry {
            is_user: m.is_user,
            name: &m.name,
            text: &m.mes,
        })
    }
}

impl SwipeRepository for ChatLog {
    fn swipe_data(&self, message: usize, swipe_id: usize) -> Option<TrackerSnapshot> {
        read_swipe_data(&self.messages.get(message)?.extra, swipe_id)
    }

    fn set_swipe_data(
        &mut self,
        message: usize,
        swipe_id: usize,
        data: &TrackerSnapshot,
    ) -> SessionResult<()> {
        write_swipe_data(&mut self.get_mut(message)?.extra, swipe_id, data)
    }

    fn has_swipe_content(&self, message: usize, swipe_id: usize) -> bool {
        self.messages
            .get(message)
            .and_then(|m| m.swipes.get(swipe_id))
            .is_some_and(|text| !text.trim().is_empty())
    }

    fn current_swipe_id(&self, message: usize) -> Option<usize> {
        self.messages.get(message).map(|m| m.swipe_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat() -> ChatLog {
        let mut log = ChatLog::new();
        log.push(ChatMessage::assistant("Narrator", "Welcome."));
        log.push(ChatMessage::user("Alex", "Hello"));
        log.push(ChatMessage::assistant("Narrator", "Hi there."));
        log
    }

    #[test]
    fn swipes_select_and_push() {
        let mut log = chat();
        let msg = log.get_mut(2).unwrap();
        assert_eq!(msg.push_swipe("Greetings."), 1);
        assert_eq!(msg.mes, "Greetings.");
        msg.select_swipe(0).unwrap();
        assert_eq!(msg.mes, "Hi there.");
        assert!(matches!(
            msg.select_swipe(5),
            Err(SessionError::SwipeNotFound(5))
        ));
    }

    #[test]
    fn set_text_rewrites_selected_swipe() {
        let mut log = chat();
        let msg = log.get_mut(2).unwrap();
        msg.push_swipe("second");
        msg.set_text("cleaned");
        assert_eq!(msg.swipes, vec!["Hi there.", "cleaned"]);
    }

    #[test]
    fn history_queries() {
        let log = chat();
        assert_eq!(log.len(), 3);
        assert_eq!(log.last_assistant(), Some(2));
        assert_eq!(log.last_assistant_before(2), Some(0));
        let recent: Vec<_> = log.recent_before(3, 2).iter().map(|e| e.text).collect();
        assert_eq!(recent, vec!["Hello", "Hi there."]);
        assert_eq!(log.recent_before(3, 10).len(), 3);
    }

    #[test]
    fn swipe_repository() {
        let mut log = chat();
        assert!(log.has_swipe_content(2, 0));
        assert!(!log.has_swipe_content(2, 1));
        assert!(!log.has_swipe_content(9, 0));
        assert_eq!(log.current_swipe_id(2), Some(0));

        let data = TrackerSnapshot {
            info_box: Some("Info Box\n---\nDate: x".into()),
            ..Default::default()
        };
        log.set_swipe_data(2, 0, &data).unwrap();
        assert_eq!(log.swipe_data(2, 0), Some(data));
        assert!(log.set_swipe_data(9, 0, &TrackerSnapshot::default()).is_err());
    }

    #[test]
    fn serializes_as_message_array() {
        let log = chat();
        let json = serde_json::to_value(&log).unwrap();
        assert!(json.is_array());
        assert_eq!(json[1]["is_user"], true);
        let back: ChatLog = serde_json::from_value(json).unwrap();
        assert_eq!(back, log);
    }
}
