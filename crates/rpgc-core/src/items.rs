//! Comma-separated item lists and bracket wrappers.
//!
//! Item lists are the freeform `"Sword, Rope (10 ft, frayed), Torch"` strings
//! the model writes for inventory buckets and optional quests. Commas inside
//! parentheses belong to the item description and never split it.

/// The string used for an empty list.
pub const NONE: &str = "None";

/// Split an item list on top-level commas.
///
/// Entries are trimmed; empty entries and `none` (any case) are dropped.
pub fn parse_items(text: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut depth: usize = 0;

    for ch in text.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                push_item(&mut items, &current);
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    push_item(&mut items, &current);
    items
}

fn push_item(items: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case(NONE) {
        items.push(trimmed.to_string());
    }
}

/// Join items with `", "`, or [`NONE`] when there are none.
pub fn serialize_items<S: AsRef<str>>(items: &[S]) -> String {
    if items.is_empty() {
        return NONE.to_string();
    }
    items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}

const BRACKET_PAIRS: &[(char, char)] = &[('[', ']'), ('{', '}'), ('(', ')')];

/// Remove bracket, brace, or paren layers that wrap the entire text.
///
/// `"[[Stats ...]]"` becomes `"Stats ..."`, but `"[a] and [b]"` is left
/// alone because its first bracket closes before the end. The result is
/// always trimmed, so applying this twice is the same as applying it once.
pub fn strip_brackets(text: &str) -> String {
    let mut current = text.trim();
    while let Some(inner) = unwrap_once(current) {
        current = inner.trim();
    }
    current.to_string()
}

fn unwrap_once(text: &str) -> Option<&str> {
    let first = text.chars().next()?;
    let &(open, close) = BRACKET_PAIRS.iter().find(|(o, _)| *o == first)?;
    if !text.ends_with(close) || text.len() < open.len_utf8() + close.len_utf8() {
        return None;
    }

    let mut depth = 0usize;
    let last = text.len() - close.len_utf8();
    for (idx, ch) in text.char_indices() {
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return (idx == last).then(|| &text[open.len_utf8()..last]);
            }
        }
    }
    None
}
