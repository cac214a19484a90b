//! Section extraction from a full model response.

use tracing::debug;

use rpgc_core::items::strip_brackets;
use rpgc_core::{TrackerSection, TrackerSnapshot};

use crate::fence::{extract_code_blocks, strip_thinking};
use crate::matcher::{header_for, is_combined_block, matching_sections};

/// Extract the raw text of each tracker section from a model response.
///
/// Reasoning spans are removed first. Each fenced block is then either split
/// as a combined block or assigned to the first matching section that is
/// still empty. Blocks that match nothing are ignored.
pub fn parse_response(response: &str) -> TrackerSnapshot {
    let cleaned = strip_thinking(response);
    let mut snapshot = TrackerSnapshot::default();

    for block in extract_code_blocks(&cleaned) {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }

        if is_combined_block(block) {
            for (section, text) in split_combined(block) {
                fill(&mut snapshot, section, text);
            }
            continue;
        }

        let target = matching_sections(block)
            .into_iter()
            .find(|s| snapshot.get(*s).is_none());
        match target {
            Some(section) => fill(&mut snapshot, section, block),
            None => debug!(len = block.len(), "ignoring unmatched code block"),
        }
    }

    snapshot
}

fn fill(snapshot: &mut TrackerSnapshot, section: TrackerSection, text: &str) {
    let slot = snapshot.slot_mut(section);
    if slot.is_some() {
        debug!(%section, "section already filled, keeping the first");
        return;
    }
    *slot = Some(strip_brackets(text));
}

/// Split a combined block at each section header.
///
/// Each section runs from the start of its header line to the start of the
/// next header, whatever order the headers appear in. Text before the first
/// header is dropped.
pub fn split_combined(block: &str) -> Vec<(TrackerSection, &str)> {
    let mut starts: Vec<(usize, TrackerSection)> = TrackerSection::ALL
        .iter()
        .filter_map(|&s| header_for(s).find(block).map(|m| (m.start(), s)))
        .collect();
    starts.sort_by_key(|(pos, _)| *pos);

    let mut sections = Vec::with_capacity(starts.len());
    for (i, &(start, section)) in starts.iter().enumerate() {
        let end = starts
            .get(i + 1)
            .map_or(block.len(), |&(next, _)| next);
        let text = block[start..end].trim();
        if !text.is_empty() {
            sections.push((section, text));
        }
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const COMBINED: &str = "The tavern is loud.\n\n```\nUser Stats\n---\nHealth: 80%\nEnergy: 50%\n\nInfo Box\n---\nDate: Monday\nLocation: Tavern\n\nPresent Characters\n---\n😊: Elena | Friendly | Ally | 💭 Nice night.\n```\n\nShe waves.";

    #[test]
    fn combined_block_yields_three_isolated_sections() {
        let s = parse_response(COMBINED);
        let stats = s.user_stats.unwrap();
        let info = s.info_box.unwrap();
        let chars = s.character_thoughts.unwrap();

        assert_eq!(stats, "User Stats\n---\nHealth: 80%\nEnergy: 50%");
        assert_eq!(info, "Info Box\n---\nDate: Monday\nLocation: Tavern");
        assert!(chars.starts_with("Present Characters\n---\n"));
        assert!(chars.contains("Elena"));

        assert!(!stats.contains("Date:") && !stats.contains("Elena"));
        assert!(!info.contains("Health") && !info.contains("Elena"));
        assert!(!chars.contains("Health") && !chars.contains("Date:"));
    }

    #[test]
    fn combined_block_in_any_order() {
        let text = "```\nPresent Characters\n---\n🙂: Ana | Calm | Ally | 💭 Hm\n\nStats\n---\nHealth: 10%\n\nInfo Box\n---\nTime: Noon\n```";
        let s = parse_response(text);
        assert_eq!(s.user_stats.as_deref(), Some("Stats\n---\nHealth: 10%"));
        assert_eq!(s.info_box.as_deref(), Some("Info Box\n---\nTime: Noon"));
        assert_eq!(
            s.character_thoughts.as_deref(),
            Some("Present Characters\n---\n🙂: Ana | Calm | Ally | 💭 Hm")
        );
    }

    #[test]
    fn stats_block_and_unrelated_code() {
        let text = "```\nStats\n---\nHealth: 90%\n```\nHere is a sample:\n```rust\nfn main() { println!(\"hi\"); }\n```";
        let s = parse_response(text);
        assert!(s.user_stats.is_some());
        assert!(s.info_box.is_none());
        assert!(s.character_thoughts.is_none());
    }

    #[test]
    fn separate_blocks() {
        let text = "```\nStats\n---\nHealth: 1%\n```\n```\nInfo Box\n---\nDate: x\n```\n```\nPresent Characters\n---\n🙂: A | b | c | 💭 d\n```";
        let s = parse_response(text);
        assert!(s.user_stats.is_some() && s.info_box.is_some() && s.character_thoughts.is_some());
    }

    #[test]
    fn fallback_matchers() {
        let text = "```\nHealth: 40%\nEnergy: 30%\n```\n```\nDate: Tuesday\nTime: Dawn\nLocation: Road\n```";
        let s = parse_response(text);
        assert_eq!(s.user_stats.as_deref(), Some("Health: 40%\nEnergy: 30%"));
        assert_eq!(s.info_box.as_deref(), Some("Date: Tuesday\nTime: Dawn\nLocation: Road"));
    }

    #[test]
    fn first_block_wins() {
        let text = "```\nStats\n---\nHealth: 1%\n```\n```\nStats\n---\nHealth: 2%\n```";
        let s = parse_response(text);
        assert_eq!(s.user_stats.as_deref(), Some("Stats\n---\nHealth: 1%"));
    }

    #[test]
    fn brackets_stripped() {
        let text = "```\n[[Stats\n---\nHealth: 5%]]\n```";
        let s = parse_response(text);
        assert_eq!(s.user_stats.as_deref(), Some("Stats\n---\nHealth: 5%"));
    }

    #[test]
    fn thinking_ignored() {
        let text = "<think>```\nStats\n---\nHealth: 1%\n```</think>No trackers here.";
        assert!(parse_response(text).is_empty());
    }

    #[test]
    fn no_blocks() {
        assert!(parse_response("Just prose.").is_empty());
        assert!(parse_response("").is_empty());
    }

    proptest! {
        #[test]
        fn trackers_found_after_any_narrative(
            narrative in "[a-zA-Z .,!?\n]{0,200}",
            health in 0u32..=100,
        ) {
            let text = format!("{narrative}\n```\nStats\n---\nHealth: {health}%\n```");
            let snapshot = parse_response(&text);
            let stats = snapshot.user_stats.unwrap_or_default();
            let expected = format!("Health: {health}%");
            prop_assert!(stats.contains(&expected));
            prop_assert!(snapshot.info_box.is_none());
        }
    }
}
