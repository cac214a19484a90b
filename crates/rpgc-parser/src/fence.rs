//! Fenced code blocks and reasoning spans.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::matcher::is_tracker_block;

static THINKING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<think(?:ing)?>.*?</think(?:ing)?>").expect("invalid thinking regex")
});

static CODE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```([^`]+)```").expect("invalid code block regex"));

static DIVIDER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*---[ \t]*$").expect("invalid divider regex"));

static BLANK_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*){2,}").expect("invalid blank-run regex"));

/// Language tags that are dropped from the first line of a block.
const LANGUAGE_TAGS: &[&str] = &["text", "txt", "plaintext", "markdown", "md", "yaml", "ini"];

/// Remove `<think>...</think>` and `<thinking>...</thinking>` spans.
pub fn strip_thinking(text: &str) -> String {
    THINKING.replace_all(text, "").into_owned()
}

/// Contents of every fenced code block, in order.
///
/// Blocks cannot contain a backtick. A leading plain-text language tag such
/// as `text` is dropped.
pub fn extract_code_blocks(text: &str) -> Vec<&str> {
    CODE_BLOCK
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| drop_language_tag(m.as_str()))
        .collect()
}

fn drop_language_tag(block: &str) -> &str {
    match block.split_once('\n') {
        Some((first, rest)) if LANGUAGE_TAGS.contains(&first.trim().to_lowercase().as_str()) => {
            rest
        }
        _ => block,
    }
}

/// Remove tracker blocks from an assistant message before display.
///
/// Fenced blocks that are recognized as tracker sections are removed along
/// with trailing whitespace; other fenced content is kept. Stray `---`
/// divider lines are dropped and runs of blank lines collapse to one.
pub fn strip_tracker_blocks(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    let mut last = 0;

    for caps in CODE_BLOCK.captures_iter(message) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !is_tracker_block(drop_language_tag(inner.as_str()).trim()) {
            continue;
        }
        out.push_str(&message[last..whole.start()]);
        let rest = &message[whole.end()..];
        last = whole.end() + (rest.len() - rest.trim_start().len());
    }
    out.push_str(&message[last..]);

    let out = DIVIDER_LINE.replace_all(&out, "");
    let out = BLANK_RUN.replace_all(&out, "\n\n");
    out.trim().to_string()
}
