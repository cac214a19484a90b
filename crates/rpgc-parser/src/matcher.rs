//! Declarative section matchers.
//!
//! Each tracker section has an ordered list of matchers. The header matchers
//! look for a header line followed by a `---` divider, which is the format
//! the model is instructed to use. The fallback matchers look for the fields
//! the section must contain, for models that drift from the header text.

use once_cell::sync::Lazy;
use regex::Regex;

use rpgc_core::TrackerSection;

/// Header names recognized for the Stats section.
pub const STATS_HEADERS: &[&str] = &["User Stats", "Player Stats", "Stats"];
/// Header names recognized for the Info Box section.
pub const INFO_BOX_HEADERS: &[&str] = &["Info Box", "Scene Info", "Information"];
/// Header names recognized for the Present Characters section.
pub const CHARACTER_HEADERS: &[&str] = &["Present Characters", "Character Thoughts", "Characters"];

/// Build a header-plus-divider regex. The match starts at the beginning of
/// the header line so that a section split there keeps its whole header.
fn header_regex(names: &[&str]) -> Regex {
    let alternation = names
        .iter()
        .map(|n| regex::escape(n).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?im)^[^\n]*?(?:{alternation})[ \t:]*\r?\n\s*---"))
        .expect("invalid header regex")
}

static STATS_HEADER: Lazy<Regex> = Lazy::new(|| header_regex(STATS_HEADERS));
static INFO_BOX_HEADER: Lazy<Regex> = Lazy::new(|| header_regex(INFO_BOX_HEADERS));
static CHARACTER_HEADER: Lazy<Regex> = Lazy::new(|| header_regex(CHARACTER_HEADERS));

static HEALTH_PERCENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Health:\s*\d+%").expect("invalid health regex"));
static ENERGY_PERCENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Energy:\s*\d+%").expect("invalid energy regex"));
static DATE_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Date:").expect("invalid date regex"));
static LOCATION_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Location:").expect("invalid location regex"));
static TIME_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Time:").expect("invalid time regex"));
static THOUGHTS_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Thoughts").expect("invalid thoughts regex"));

/// A named predicate that recognizes one section.
pub struct SectionMatcher {
    /// Short name used in logs.
    pub name: &'static str,
    /// The section this matcher recognizes.
    pub section: TrackerSection,
    /// The test applied to a trimmed block.
    pub matches: fn(&str) -> bool,
}

impl std::fmt::Debug for SectionMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionMatcher")
            .field("name", &self.name)
            .field("section", &self.section)
            .finish()
    }
}

/// The matcher table, in priority order.
pub const MATCHERS: &[SectionMatcher] = &[
    SectionMatcher {
        name: "stats-header",
        section: TrackerSection::Stats,
        matches: has_stats_header,
    },
    SectionMatcher {
        name: "stats-fields",
        section: TrackerSection::Stats,
        matches: |b| HEALTH_PERCENT.is_match(b) && ENERGY_PERCENT.is_match(b),
    },
    SectionMatcher {
        name: "info-box-header",
        section: TrackerSection::InfoBox,
        matches: has_info_box_header,
    },
    SectionMatcher {
        name: "info-box-fields",
        section: TrackerSection::InfoBox,
        matches: |b| DATE_LABEL.is_match(b) && LOCATION_LABEL.is_match(b) && TIME_LABEL.is_match(b),
    },
    SectionMatcher {
        name: "characters-header",
        section: TrackerSection::PresentCharacters,
        matches: has_character_header,
    },
    SectionMatcher {
        name: "characters-fields",
        section: TrackerSection::PresentCharacters,
        matches: |b| b.contains(" | ") && (THOUGHTS_WORD.is_match(b) || b.contains('💭')),
    },
];

/// Whether the block has a Stats header followed by a divider.
pub fn has_stats_header(block: &str) -> bool {
    STATS_HEADER.is_match(block)
}

/// Whether the block has an Info Box header followed by a divider.
pub fn has_info_box_header(block: &str) -> bool {
    INFO_BOX_HEADER.is_match(block)
}

/// Whether the block has a Present Characters header followed by a divider.
pub fn has_character_header(block: &str) -> bool {
    CHARACTER_HEADER.is_match(block)
}

/// The header regex for a section.
pub(crate) fn header_for(section: TrackerSection) -> &'static Regex {
    match section {
        TrackerSection::Stats => &STATS_HEADER,
        TrackerSection::InfoBox => &INFO_BOX_HEADER,
        TrackerSection::PresentCharacters => &CHARACTER_HEADER,
    }
}

/// Whether one block carries a Stats header and at least one other header.
pub fn is_combined_block(block: &str) -> bool {
    has_stats_header(block) && (has_info_box_header(block) || has_character_header(block))
}

/// Sections whose matchers accept the block, in matcher order, without
/// duplicates.
pub fn matching_sections(block: &str) -> Vec<TrackerSection> {
    let mut found = Vec::new();
    for m in MATCHERS {
        if !found.contains(&m.section) && (m.matches)(block) {
            found.push(m.section);
        }
    }
    found
}

/// Whether a block would be taken as tracker content at all.
pub fn is_tracker_block(block: &str) -> bool {
    is_combined_block(block) || !matching_sections(block).is_empty()
}
