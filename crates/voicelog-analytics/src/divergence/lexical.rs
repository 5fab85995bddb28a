//! Corpus-level token and phrase deltas between drafts and finals.

use std::collections::HashMap;

use serde::Serialize;

use crate::diff::{compute_diff, LineChange};
use crate::text::{count_occurrences, lower_tokens};

/// `[token, count]` on the wire.
pub type TokenCount = (String, usize);

const WORD_SHIFT_LIMIT: usize = 15;
const LINE_PATTERN_LIMIT: usize = 20;
const MIN_TOKEN_CHARS: usize = 4;
const MIN_REPEAT: usize = 2;
const DOMINANCE_RATIO: f64 = 1.5;

/// Items that net out of (or into) the final side across the whole corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectionalDelta {
    pub removed: Vec<TokenCount>,
    pub added: Vec<TokenCount>,
}

/// Descending by count, ties by token so output is stable.
fn sort_counts(entries: &mut [TokenCount]) {
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
}

/// Occurrences of each reference item summed over every text.
///
/// `case_fold` lowercases both sides, which phrase lists want and emoji
/// lists do not need.
pub(crate) fn reference_totals<'a>(
    texts: impl IntoIterator<Item = &'a str>,
    items: &[String],
    case_fold: bool,
) -> Vec<usize> {
    let needles: Vec<String> = items
        .iter()
        .map(|i| if case_fold { i.to_lowercase() } else { i.clone() })
        .collect();
    let mut totals = vec![0; needles.len()];

    for text in texts {
        let haystack = if case_fold {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        for (total, needle) in totals.iter_mut().zip(&needles) {
            *total += count_occurrences(&haystack, needle);
        }
    }
    totals
}

/// Net per-item delta of two aligned total vectors.
///
/// An item appears on at most one side and only with a positive count.
pub(crate) fn directional_delta(
    items: &[String],
    draft_totals: &[usize],
    final_totals: &[usize],
) -> DirectionalDelta {
    let mut delta = DirectionalDelta::default();
    for ((item, &draft), &fin) in items.iter().zip(draft_totals).zip(final_totals) {
        if draft > fin {
            delta.removed.push((item.clone(), draft - fin));
        } else if fin > draft {
            delta.added.push((item.clone(), fin - draft));
        }
    }
    sort_counts(&mut delta.removed);
    sort_counts(&mut delta.added);
    delta
}

fn word_counts<'a>(texts: impl IntoIterator<Item = &'a str>) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for text in texts {
        for token in lower_tokens(text) {
            if token.chars().count() >= MIN_TOKEN_CHARS {
                *counts.entry(token).or_insert(0) += 1;
            }
        }
    }
    counts
}

#[allow(clippy::cast_precision_loss)]
fn dominant(
    side: &HashMap<String, usize>,
    other: &HashMap<String, usize>,
    limit: usize,
) -> Vec<TokenCount> {
    let mut out: Vec<TokenCount> = side
        .iter()
        .filter(|(word, count)| {
            **count >= MIN_REPEAT
                && other
                    .get(*word)
                    .is_none_or(|o| **count as f64 >= *o as f64 * DOMINANCE_RATIO)
        })
        .map(|(word, count)| (word.clone(), *count))
        .collect();
    sort_counts(&mut out);
    out.truncate(limit);
    out
}

/// Open-vocabulary word shift. `added` holds words the final side uses at
/// least twice and half again as often as the draft side (or exclusively).
pub(crate) fn word_shift<'a>(
    drafts: impl IntoIterator<Item = &'a str>,
    finals: impl IntoIterator<Item = &'a str>,
) -> DirectionalDelta {
    let draft_words = word_counts(drafts);
    let final_words = word_counts(finals);
    DirectionalDelta {
        removed: dominant(&draft_words, &final_words, WORD_SHIFT_LIMIT),
        added: dominant(&final_words, &draft_words, WORD_SHIFT_LIMIT),
    }
}

fn repeated_patterns(counts: HashMap<String, usize>) -> Vec<TokenCount> {
    let mut out: Vec<TokenCount> = counts
        .into_iter()
        .filter(|(_, count)| *count >= MIN_REPEAT)
        .collect();
    sort_counts(&mut out);
    out.truncate(LINE_PATTERN_LIMIT);
    out
}

/// Lines the user repeatedly strips or writes in, taken from each pair's
/// diff and normalized (trimmed, lowercased).
pub(crate) fn line_patterns<'a>(
    pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> DirectionalDelta {
    let mut removed: HashMap<String, usize> = HashMap::new();
    let mut added: HashMap<String, usize> = HashMap::new();

    for (draft, fin) in pairs {
        let Ok(ops) = compute_diff(draft, fin) else {
            continue;
        };
        for op in ops {
            let key = op.content.trim().to_lowercase();
            if key.chars().count() < MIN_TOKEN_CHARS {
                continue;
            }
            match op.change {
                LineChange::Removed => *removed.entry(key).or_insert(0) += 1,
                LineChange::Added => *added.entry(key).or_insert(0) += 1,
                LineChange::Unchanged => {}
            }
        }
    }

    DirectionalDelta {
        removed: repeated_patterns(removed),
        added: repeated_patterns(added),
    }
}
