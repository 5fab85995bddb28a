//! Line-level diff and edit quantification for draft/final pairs.
//!
//! The default [`GreedyLineDiff`] walks both texts with two cursors and
//! pairs mismatched lines one-to-one. It is not a minimal edit script: one
//! inserted line shifts every following line and each shifted pair counts as
//! a removal plus an addition. Historical edit counts were produced this way,
//! so the walk is kept exactly and sits behind [`LineDiff`] so another
//! algorithm can be swapped in without touching callers.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use voicelog_core::Post;

use crate::error::AnalyticsError;
use crate::text::lower_tokens;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineChange {
    Unchanged,
    Added,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineOp {
    #[serde(rename = "type")]
    pub change: LineChange,
    pub content: String,
}

impl LineOp {
    fn new(change: LineChange, content: &str) -> Self {
        Self {
            change,
            content: content.to_string(),
        }
    }
}

/// Line-diff strategy.
pub trait LineDiff {
    /// Diff `old` against `new`, both already split into lines.
    fn diff(&self, old: &[&str], new: &[&str]) -> Vec<LineOp>;
}

/// Two-pointer greedy alignment.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyLineDiff;

impl LineDiff for GreedyLineDiff {
    fn diff(&self, old: &[&str], new: &[&str]) -> Vec<LineOp> {
        let mut ops = Vec::with_capacity(old.len().max(new.len()));
        let (mut i, mut j) = (0, 0);

        while i < old.len() || j < new.len() {
            if i >= old.len() {
                ops.push(LineOp::new(LineChange::Added, new[j]));
                j += 1;
            } else if j >= new.len() {
                ops.push(LineOp::new(LineChange::Removed, old[i]));
                i += 1;
            } else if old[i] == new[j] {
                ops.push(LineOp::new(LineChange::Unchanged, old[i]));
                i += 1;
                j += 1;
            } else {
                ops.push(LineOp::new(LineChange::Removed, old[i]));
                ops.push(LineOp::new(LineChange::Added, new[j]));
                i += 1;
                j += 1;
            }
        }

        ops
    }
}

fn split_lines(text: &str) -> Vec<&str> {
    text.trim().lines().collect()
}

/// Diff two texts with an explicit strategy.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyText`] if either text is empty or
/// whitespace-only.
pub fn diff_with<D: LineDiff + ?Sized>(
    differ: &D,
    draft: &str,
    final_text: &str,
) -> Result<Vec<LineOp>, AnalyticsError> {
    if draft.trim().is_empty() {
        return Err(AnalyticsError::EmptyText { field: "draftText" });
    }
    if final_text.trim().is_empty() {
        return Err(AnalyticsError::EmptyText { field: "finalText" });
    }
    Ok(differ.diff(&split_lines(draft), &split_lines(final_text)))
}

/// Diff a draft against its final version with the greedy walk.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyText`] if either text is empty or
/// whitespace-only.
pub fn compute_diff(draft: &str, final_text: &str) -> Result<Vec<LineOp>, AnalyticsError> {
    diff_with(&GreedyLineDiff, draft, final_text)
}

/// Edit count from a precomputed op list: non-unchanged ops halved, rounded
/// up, never below 1 when the texts differ.
fn edit_count_from_ops(ops: &[LineOp], texts_differ: bool) -> u32 {
    if !texts_differ {
        return 0;
    }
    let changed = ops
        .iter()
        .filter(|op| op.change != LineChange::Unchanged)
        .count();
    u32::try_from(changed.div_ceil(2)).unwrap_or(u32::MAX).max(1)
}

/// Integer proxy for how much a draft changed.
///
/// `0` when either text is empty or both are identical; otherwise at least 1.
#[must_use]
pub fn edit_count(draft: &str, final_text: &str) -> u32 {
    match compute_diff(draft, final_text) {
        Ok(ops) => edit_count_from_ops(&ops, draft != final_text),
        Err(_) => 0,
    }
}

/// Jaccard index over case-folded whitespace token sets.
///
/// Two texts with no tokens at all are identical (`1.0`).
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a_set: HashSet<String> = lower_tokens(a).collect();
    let b_set: HashSet<String> = lower_tokens(b).collect();

    let union = a_set.union(&b_set).count();
    if union == 0 {
        return 1.0;
    }
    let intersection = a_set.intersection(&b_set).count();

    #[allow(clippy::cast_precision_loss)]
    let ratio = intersection as f64 / union as f64;
    ratio
}

/// Per-kind totals for a diff, for display next to the op list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    pub unchanged: usize,
    pub added: usize,
    pub removed: usize,
}

impl DiffSummary {
    #[must_use]
    pub fn from_ops(ops: &[LineOp]) -> Self {
        ops.iter().fold(Self::default(), |mut acc, op| {
            match op.change {
                LineChange::Unchanged => acc.unchanged += 1,
                LineChange::Added => acc.added += 1,
                LineChange::Removed => acc.removed += 1,
            }
            acc
        })
    }
}

/// Build a new post from a draft/final pair, deriving its edit count.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyText`] if either text is empty.
pub fn log_post(
    topic: &str,
    draft: &str,
    final_text: &str,
    created_at: DateTime<Utc>,
) -> Result<Post, AnalyticsError> {
    let ops = compute_diff(draft, final_text)?;
    let edits = edit_count_from_ops(&ops, draft != final_text);
    let post = Post::new(topic, draft, final_text, edits, created_at)?;
    tracing::debug!(post_id = %post.id, edit_count = edits, "logged draft/final pair");
    Ok(post)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(ops: &[LineOp]) -> Vec<(LineChange, &str)> {
        ops.iter().map(|o| (o.change, o.content.as_str())).collect()
    }

    #[test]
    fn single_line_substitution() {
        let ops = compute_diff("A\nB\nC", "A\nX\nC").unwrap();
        assert_eq!(
            kinds(&ops),
            vec![
                (LineChange::Unchanged, "A"),
                (LineChange::Removed, "B"),
                (LineChange::Added, "X"),
                (LineChange::Unchanged, "C"),
            ]
        );
        assert_eq!(edit_count("A\nB\nC", "A\nX\nC"), 1);
    }

    #[test]
    fn identical_texts_are_all_unchanged() {
        let text = "line one\nline two\n\nline four";
        let ops = compute_diff(text, text).unwrap();
        assert_eq!(ops.len(), 4);
        assert!(ops.iter().all(|o| o.change == LineChange::Unchanged));
        assert_eq!(edit_count(text, text), 0);
    }

    #[test]
    fn inserted_line_cascades() {
        // Greedy alignment: inserting "new" at the top shifts every line.
        let ops = compute_diff("a\nb\nc", "new\na\nb\nc").unwrap();
        assert_eq!(
            kinds(&ops),
            vec![
                (LineChange::Removed, "a"),
                (LineChange::Added, "new"),
                (LineChange::Removed, "b"),
                (LineChange::Added, "a"),
                (LineChange::Removed, "c"),
                (LineChange::Added, "b"),
                (LineChange::Added, "c"),
            ]
        );
        // 7 changed ops -> ceil(7/2) = 4
        assert_eq!(edit_count("a\nb\nc", "new\na\nb\nc"), 4);
    }

    #[test]
    fn trailing_lines_removed() {
        let ops = compute_diff("a\nb\nc", "a").unwrap();
        assert_eq!(
            kinds(&ops),
            vec![
                (LineChange::Unchanged, "a"),
                (LineChange::Removed, "b"),
                (LineChange::Removed, "c"),
            ]
        );
        assert_eq!(edit_count("a\nb\nc", "a"), 1);
    }

    #[test]
    fn edit_count_is_directional() {
        assert_eq!(edit_count("a\nb\nc", "new\na\nb\nc"), 4);
        assert_eq!(edit_count("new\na\nb\nc", "a\nb\nc"), 4);
        assert_eq!(edit_count("x", "x\ny\nz"), 1);
    }

    #[test]
    fn whitespace_only_difference_still_counts_as_an_edit() {
        assert_eq!(edit_count("hello", "hello\n"), 1);
    }

    #[test]
    fn empty_inputs_are_rejected() {
        assert!(matches!(
            compute_diff("", "final"),
            Err(AnalyticsError::EmptyText { field: "draftText" })
        ));
        assert!(matches!(
            compute_diff("draft", "   "),
            Err(AnalyticsError::EmptyText { field: "finalText" })
        ));
        assert_eq!(edit_count("", "final"), 0);
        assert_eq!(edit_count("draft", ""), 0);
    }

    #[test]
    fn crlf_lines_match_lf_lines() {
        let ops = compute_diff("a\r\nb", "a\nb").unwrap();
        assert!(ops.iter().all(|o| o.change == LineChange::Unchanged));
    }

    #[test]
    fn similarity_properties() {
        assert!((similarity("The cat sat", "the CAT sat") - 1.0).abs() < f64::EPSILON);
        assert!((similarity("", "   ") - 1.0).abs() < f64::EPSILON);
        assert!(similarity("", "word").abs() < f64::EPSILON);

        let ab = similarity("a b c", "b c d");
        let ba = similarity("b c d", "a b c");
        assert!((ab - ba).abs() < f64::EPSILON);
        assert!((ab - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_counts_each_kind() {
        let ops = compute_diff("A\nB\nC", "A\nX\nC\nD").unwrap();
        let summary = DiffSummary::from_ops(&ops);
        assert_eq!(
            summary,
            DiffSummary {
                unchanged: 2,
                added: 2,
                removed: 1
            }
        );
    }

    #[test]
    fn log_post_derives_edit_count() {
        let post = log_post("", "A\nB", "A\nC", Utc::now()).unwrap();
        assert_eq!(post.edit_count, 1);
        assert_eq!(post.topic, "Untitled");
        assert!(log_post("t", " ", "x", Utc::now()).is_err());
    }

    /// Custom strategies plug in through the trait.
    struct EverythingChanged;

    impl LineDiff for EverythingChanged {
        fn diff(&self, old: &[&str], new: &[&str]) -> Vec<LineOp> {
            old.iter()
                .map(|l| LineOp::new(LineChange::Removed, l))
                .chain(new.iter().map(|l| LineOp::new(LineChange::Added, l)))
                .collect()
        }
    }

    #[test]
    fn alternative_strategy_is_substitutable() {
        let ops = diff_with(&EverythingChanged, "a\nb", "a\nb").unwrap();
        assert_eq!(ops.len(), 4);
    }
}
