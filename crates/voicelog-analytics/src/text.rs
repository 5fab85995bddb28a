//! Tokenizers shared by the miner and the aggregator.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\w+").expect("valid hashtag regex"));

static CAPS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{2,}\b").expect("valid caps regex"));

static PARAGRAPH_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t\r]*\n").expect("valid paragraph regex"));

/// Case-folded, whitespace-split tokens.
pub(crate) fn lower_tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().map(str::to_lowercase)
}

/// Non-overlapping occurrences of `needle` in `haystack`.
///
/// Both sides are compared as given; callers fold case first when needed.
pub(crate) fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

/// Hashtags in first-appearance order, lowercased and de-duplicated.
#[must_use]
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    HASHTAG_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

/// All-caps words (two or more capitals) that are not known acronyms.
pub(crate) fn shouted_words(text: &str, stoplist: &[String]) -> usize {
    CAPS_RE
        .find_iter(text)
        .filter(|m| !stoplist.iter().any(|s| s == m.as_str()))
        .count()
}

pub(crate) fn is_emoji(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1F300..=0x1F9FF | 0x1FA70..=0x1FAFF | 0x2600..=0x26FF | 0x2700..=0x27BF
    )
}

/// Variation selectors, joiners and skin-tone modifiers trail an emoji
/// without being one.
fn is_emoji_modifier(c: char) -> bool {
    matches!(u32::from(c), 0xFE0E | 0xFE0F | 0x200D | 0x1F3FB..=0x1F3FF)
}

pub(crate) fn starts_with_emoji(text: &str) -> bool {
    text.trim_start().chars().next().is_some_and(is_emoji)
}

pub(crate) fn ends_with_emoji(text: &str) -> bool {
    text.trim_end()
        .chars()
        .rev()
        .find(|c| !is_emoji_modifier(*c))
        .is_some_and(is_emoji)
}

/// Sentences split on `.`, `!` and `?`, trimmed, empties dropped.
pub(crate) fn sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Blank-line-separated blocks with content.
pub(crate) fn paragraph_count(text: &str) -> usize {
    PARAGRAPH_BREAK_RE
        .split(text.trim())
        .filter(|block| !block.trim().is_empty())
        .count()
}

pub(crate) fn line_break_count(text: &str) -> usize {
    text.trim().matches('\n').count()
}

/// `...` and the single-character ellipsis both count once.
pub(crate) fn ellipsis_count(text: &str) -> usize {
    text.matches("...").count() + text.matches('\u{2026}').count()
}
