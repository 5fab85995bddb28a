//! Stylistic drift between AI drafts and the user's finals.
//!
//! Every figure here is a corpus-level aggregate: reference-list deltas net
//! draft occurrences against final occurrences across all posts, so a phrase
//! stripped from one post and reintroduced in another cancels out.

mod lexical;
mod signals;
mod voice;

pub use lexical::{DirectionalDelta, TokenCount};
pub use signals::{ScalarSignals, SignalPair};
pub use voice::{ImprovementTrend, VoiceFactor, VoiceScore};

use serde::Serialize;

use voicelog_core::{Post, Vocabulary};

use crate::sample::{mean_of, round_to, Sampled};
use lexical::{directional_delta, line_patterns, reference_totals, word_shift};
use signals::{scalar_signals, SideTally};
use voice::{improvement_trend, voice_score, VoiceInputs};

const SUGGESTED_PATTERNS: usize = 5;
const PATTERN_PREVIEW_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SuggestionKind {
    Avoid,
    Emoji,
    Encourage,
    Formatting,
    Structure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionItem {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub reason: String,
}

/// A prompt-tuning hint mined from the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub title: String,
    pub items: Vec<SuggestionItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DivergenceReport {
    pub total_posts: usize,
    pub vocabulary_version: String,
    /// `None` for an empty corpus.
    pub mean_edit_count: Option<f64>,
    pub marketing_phrases: DirectionalDelta,
    pub salesy_emoji: DirectionalDelta,
    pub encouraged_expressions: DirectionalDelta,
    pub words: DirectionalDelta,
    pub line_patterns: DirectionalDelta,
    pub signals: Option<ScalarSignals>,
    pub voice: VoiceScore,
    pub trend: Sampled<ImprovementTrend>,
    pub suggestions: Vec<Suggestion>,
}

fn times(count: usize) -> &'static str {
    if count == 1 {
        "time"
    } else {
        "times"
    }
}

fn counted_items(entries: &[TokenCount], verb: &str) -> Vec<SuggestionItem> {
    entries
        .iter()
        .map(|(text, count)| SuggestionItem {
            text: text.clone(),
            count: Some(*count),
            reason: format!("{verb} {count} {}", times(*count)),
        })
        .collect()
}

fn preview(pattern: &str) -> String {
    if pattern.chars().count() > PATTERN_PREVIEW_CHARS {
        let head: String = pattern.chars().take(PATTERN_PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        pattern.to_string()
    }
}

fn suggestions(report: &DivergenceReport) -> Vec<Suggestion> {
    let mut out = Vec::new();

    if !report.marketing_phrases.removed.is_empty() {
        out.push(Suggestion {
            kind: SuggestionKind::Avoid,
            title: "Phrases to avoid".to_string(),
            items: counted_items(&report.marketing_phrases.removed, "Removed"),
        });
    }

    if !report.salesy_emoji.removed.is_empty() {
        out.push(Suggestion {
            kind: SuggestionKind::Emoji,
            title: "Emoji to avoid".to_string(),
            items: counted_items(&report.salesy_emoji.removed, "Removed"),
        });
    }

    if !report.encouraged_expressions.added.is_empty() {
        out.push(Suggestion {
            kind: SuggestionKind::Encourage,
            title: "Expressions to use more".to_string(),
            items: counted_items(&report.encouraged_expressions.added, "Added"),
        });
    }

    if let Some(signals) = &report.signals {
        let caps = signals.caps_per_post;
        if caps.draft > caps.final_value {
            out.push(Suggestion {
                kind: SuggestionKind::Formatting,
                title: "Reduce capitalization".to_string(),
                items: vec![SuggestionItem {
                    text: format!(
                        "Shouted words per post reduced from {:.1} to {:.1}",
                        caps.draft, caps.final_value
                    ),
                    count: None,
                    reason: "Tighten the capitalization guidance".to_string(),
                }],
            });
        }
    }

    if !report.line_patterns.added.is_empty() {
        out.push(Suggestion {
            kind: SuggestionKind::Structure,
            title: "Lines you commonly add".to_string(),
            items: report
                .line_patterns
                .added
                .iter()
                .take(SUGGESTED_PATTERNS)
                .map(|(pattern, count)| SuggestionItem {
                    text: preview(pattern),
                    count: Some(*count),
                    reason: format!("Added similar content {count} {}", times(*count)),
                })
                .collect(),
        });
    }

    out
}

/// Mine the whole corpus for draft-to-final drift.
#[must_use]
pub fn mine_divergence(
    posts: &[Post],
    vocabulary: &Vocabulary,
    min_trend_posts: usize,
) -> DivergenceReport {
    let drafts = || posts.iter().map(|p| p.draft_text.as_str());
    let finals = || posts.iter().map(|p| p.final_text.as_str());

    let marketing_final = reference_totals(finals(), &vocabulary.marketing_phrases, true);
    let emoji_final = reference_totals(finals(), &vocabulary.salesy_emoji, false);
    let encouraged_final = reference_totals(finals(), &vocabulary.encouraged_expressions, true);

    let marketing_phrases = directional_delta(
        &vocabulary.marketing_phrases,
        &reference_totals(drafts(), &vocabulary.marketing_phrases, true),
        &marketing_final,
    );
    let salesy_emoji = directional_delta(
        &vocabulary.salesy_emoji,
        &reference_totals(drafts(), &vocabulary.salesy_emoji, false),
        &emoji_final,
    );
    let encouraged_expressions = directional_delta(
        &vocabulary.encouraged_expressions,
        &reference_totals(drafts(), &vocabulary.encouraged_expressions, true),
        &encouraged_final,
    );

    let mut draft_tally = SideTally::default();
    let mut final_tally = SideTally::default();
    for post in posts {
        draft_tally.record(
            &post.draft_text,
            &vocabulary.acronym_stoplist,
            &vocabulary.call_to_action,
        );
        final_tally.record(
            &post.final_text,
            &vocabulary.acronym_stoplist,
            &vocabulary.call_to_action,
        );
    }

    let voice = voice_score(VoiceInputs {
        marketing_remaining: marketing_final.iter().sum(),
        salesy_emoji_remaining: emoji_final.iter().sum(),
        encouraged_used: encouraged_final.iter().sum(),
        final_caps_per_post: final_tally.caps_per_post(),
    });

    let mut report = DivergenceReport {
        total_posts: posts.len(),
        vocabulary_version: vocabulary.version.clone(),
        mean_edit_count: mean_of(posts.iter().map(|p| f64::from(p.edit_count)))
            .map(|(m, _)| round_to(m, 1)),
        marketing_phrases,
        salesy_emoji,
        encouraged_expressions,
        words: word_shift(drafts(), finals()),
        line_patterns: line_patterns(
            posts
                .iter()
                .map(|p| (p.draft_text.as_str(), p.final_text.as_str())),
        ),
        signals: scalar_signals(&draft_tally, &final_tally),
        voice,
        trend: improvement_trend(posts, min_trend_posts),
        suggestions: Vec::new(),
    };
    report.suggestions = suggestions(&report);

    tracing::debug!(
        posts = report.total_posts,
        voice_score = report.voice.score,
        vocabulary = %report.vocabulary_version,
        "mined divergence"
    );

    report
}
