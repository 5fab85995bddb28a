//! Scalar stylistic signals averaged per side of the corpus.

use serde::Serialize;

use crate::sample::round_to;
use crate::text::{
    ellipsis_count, ends_with_emoji, extract_hashtags, line_break_count, paragraph_count,
    sentences, shouted_words, starts_with_emoji,
};

const SHORT_SENTENCE_WORDS: usize = 8;

/// One signal measured on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalPair {
    pub draft: f64,
    #[serde(rename = "final")]
    pub final_value: f64,
}

impl SignalPair {
    fn rounded(draft: f64, final_value: f64) -> Self {
        Self {
            draft: round_to(draft, 2),
            final_value: round_to(final_value, 2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarSignals {
    /// Shouted (all-caps, non-acronym) words per post.
    pub caps_per_post: SignalPair,
    pub exclamations_per_post: SignalPair,
    pub questions_per_post: SignalPair,
    pub ellipses_per_post: SignalPair,
    pub sentences_per_post: SignalPair,
    /// Words per sentence, pooled over every sentence on the side.
    pub avg_sentence_words: SignalPair,
    pub short_sentence_pct: SignalPair,
    pub paragraphs_per_post: SignalPair,
    pub line_breaks_per_post: SignalPair,
    pub hashtags_per_post: SignalPair,
    pub starts_with_emoji_pct: SignalPair,
    pub ends_with_emoji_pct: SignalPair,
    pub opens_with_i_pct: SignalPair,
    pub opens_with_question_pct: SignalPair,
    pub closes_with_call_to_action_pct: SignalPair,
}

/// Running totals for one side.
#[derive(Debug, Default)]
pub(crate) struct SideTally {
    texts: usize,
    caps: usize,
    exclamations: usize,
    questions: usize,
    ellipses: usize,
    sentences: usize,
    sentence_words: usize,
    short_sentences: usize,
    paragraphs: usize,
    line_breaks: usize,
    hashtags: usize,
    starts_with_emoji: usize,
    ends_with_emoji: usize,
    opens_with_i: usize,
    opens_with_question: usize,
    closes_with_cta: usize,
}

/// First sentence terminator in the text is a question mark.
fn opens_with_question(text: &str) -> bool {
    text.trim_start()
        .chars()
        .find(|c| matches!(c, '.' | '!' | '?'))
        == Some('?')
}

/// Last non-blank line mentions a call-to-action keyword.
fn closes_with_cta(text: &str, keywords: &[String]) -> bool {
    let Some(last) = text.lines().rev().find(|l| !l.trim().is_empty()) else {
        return false;
    };
    let last = last.to_lowercase();
    keywords.iter().any(|k| last.contains(&k.to_lowercase()))
}

impl SideTally {
    pub(crate) fn record(&mut self, text: &str, stoplist: &[String], cta: &[String]) {
        self.texts += 1;
        self.caps += shouted_words(text, stoplist);
        self.exclamations += text.matches('!').count();
        self.questions += text.matches('?').count();
        self.ellipses += ellipsis_count(text);

        for sentence in sentences(text) {
            let words = sentence.split_whitespace().count();
            self.sentences += 1;
            self.sentence_words += words;
            if words < SHORT_SENTENCE_WORDS {
                self.short_sentences += 1;
            }
        }

        self.paragraphs += paragraph_count(text);
        self.line_breaks += line_break_count(text);
        self.hashtags += extract_hashtags(text).len();
        self.starts_with_emoji += usize::from(starts_with_emoji(text));
        self.ends_with_emoji += usize::from(ends_with_emoji(text));
        self.opens_with_i += usize::from(text.trim_start().starts_with("I "));
        self.opens_with_question += usize::from(opens_with_question(text));
        self.closes_with_cta += usize::from(closes_with_cta(text, cta));
    }

    #[allow(clippy::cast_precision_loss)]
    fn ratio(numerator: usize, denominator: usize) -> f64 {
        if denominator == 0 {
            0.0
        } else {
            numerator as f64 / denominator as f64
        }
    }

    fn per_text(&self, total: usize) -> f64 {
        Self::ratio(total, self.texts)
    }

    fn pct_of_texts(&self, total: usize) -> f64 {
        Self::ratio(total, self.texts) * 100.0
    }

    /// Unrounded shouted words per post, for scoring.
    pub(crate) fn caps_per_post(&self) -> f64 {
        self.per_text(self.caps)
    }
}

/// Pair the two tallies. Returns `None` for an empty corpus rather than a
/// table of zeros.
pub(crate) fn scalar_signals(draft: &SideTally, fin: &SideTally) -> Option<ScalarSignals> {
    if draft.texts == 0 || fin.texts == 0 {
        return None;
    }

    let pair = |f: fn(&SideTally) -> f64| SignalPair::rounded(f(draft), f(fin));

    Some(ScalarSignals {
        caps_per_post: pair(|s| s.per_text(s.caps)),
        exclamations_per_post: pair(|s| s.per_text(s.exclamations)),
        questions_per_post: pair(|s| s.per_text(s.questions)),
        ellipses_per_post: pair(|s| s.per_text(s.ellipses)),
        sentences_per_post: pair(|s| s.per_text(s.sentences)),
        avg_sentence_words: pair(|s| SideTally::ratio(s.sentence_words, s.sentences)),
        short_sentence_pct: pair(|s| {
            SideTally::ratio(s.short_sentences, s.sentences) * 100.0
        }),
        paragraphs_per_post: pair(|s| s.per_text(s.paragraphs)),
        line_breaks_per_post: pair(|s| s.per_text(s.line_breaks)),
        hashtags_per_post: pair(|s| s.per_text(s.hashtags)),
        starts_with_emoji_pct: pair(|s| s.pct_of_texts(s.starts_with_emoji)),
        ends_with_emoji_pct: pair(|s| s.pct_of_texts(s.ends_with_emoji)),
        opens_with_i_pct: pair(|s| s.pct_of_texts(s.opens_with_i)),
        opens_with_question_pct: pair(|s| s.pct_of_texts(s.opens_with_question)),
        closes_with_call_to_action_pct: pair(|s| s.pct_of_texts(s.closes_with_cta)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(texts: &[&str]) -> SideTally {
        let stoplist = vec!["UK".to_string()];
        let cta = vec!["link in bio".to_string(), "pop in".to_string()];
        let mut t = SideTally::default();
        for text in texts {
            t.record(text, &stoplist, &cta);
        }
        t
    }

    #[test]
    fn empty_corpus_has_no_signals() {
        assert!(scalar_signals(&SideTally::default(), &SideTally::default()).is_none());
    }

    #[test]
    fn per_post_averages() {
        let draft = tally(&[
            "🔥 HUGE news! The BEST pies in the UK!! Link in bio",
            "Are you ready? We are.",
        ]);
        let fin = tally(&["I made pies. Pop in Saturday."]);
        let signals = scalar_signals(&draft, &fin).unwrap();

        // HUGE + BEST across 2 posts; UK is stoplisted.
        assert!((signals.caps_per_post.draft - 1.0).abs() < 1e-9);
        assert!((signals.exclamations_per_post.draft - 1.5).abs() < 1e-9);
        assert!((signals.starts_with_emoji_pct.draft - 50.0).abs() < 1e-9);
        assert!((signals.opens_with_question_pct.draft - 50.0).abs() < 1e-9);
        assert!((signals.closes_with_call_to_action_pct.draft - 50.0).abs() < 1e-9);

        assert!((signals.opens_with_i_pct.final_value - 100.0).abs() < 1e-9);
        assert!((signals.closes_with_call_to_action_pct.final_value - 100.0).abs() < 1e-9);
        assert!((signals.sentences_per_post.final_value - 2.0).abs() < 1e-9);
        // "I made pies" (3) + "Pop in Saturday" (3) -> 3 words per sentence
        assert!((signals.avg_sentence_words.final_value - 3.0).abs() < 1e-9);
        assert!((signals.short_sentence_pct.final_value - 100.0).abs() < 1e-9);
    }

    #[test]
    fn final_key_serializes_as_final() {
        let json = serde_json::to_value(SignalPair::rounded(1.234, 0.5)).unwrap();
        assert_eq!(json, serde_json::json!({"draft": 1.23, "final": 0.5}));
    }
}
