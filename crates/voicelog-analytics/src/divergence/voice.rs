//! Voice-match score and edit-effort trend.

use serde::Serialize;

use voicelog_core::Post;

use crate::sample::{mean_of, round_to, Sampled};

const BASE_SCORE: i32 = 100;
const MARKETING_PENALTY_EACH: i32 = 5;
const MARKETING_PENALTY_CAP: i32 = 30;
const EMOJI_PENALTY_EACH: i32 = 3;
const EMOJI_PENALTY_CAP: i32 = 15;
const EXPRESSION_BONUS_EACH: i32 = 3;
const EXPRESSION_BONUS_CAP: i32 = 15;
const CAPS_ALLOWANCE: f64 = 3.0;
const CAPS_PENALTY_CAP: f64 = 10.0;

/// One labelled contribution to the score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceFactor {
    pub label: String,
    /// Signed points applied to the base score.
    pub adjustment: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceScore {
    /// Always within `0..=100`.
    pub score: u8,
    pub factors: Vec<VoiceFactor>,
}

/// What remains on the final side after editing.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct VoiceInputs {
    pub marketing_remaining: usize,
    pub salesy_emoji_remaining: usize,
    pub encouraged_used: usize,
    pub final_caps_per_post: f64,
}

fn scaled(count: usize, each: i32, cap: i32) -> i32 {
    i32::try_from(count)
        .unwrap_or(i32::MAX)
        .saturating_mul(each)
        .min(cap)
}

/// Score how closely final texts match the user's voice.
///
/// Starts at 100, applies capped penalties and a capped bonus, then clamps
/// to `[0, 100]`. Zero-valued adjustments are left out of `factors`.
pub(crate) fn voice_score(inputs: VoiceInputs) -> VoiceScore {
    let mut factors = Vec::new();

    let marketing = scaled(
        inputs.marketing_remaining,
        MARKETING_PENALTY_EACH,
        MARKETING_PENALTY_CAP,
    );
    if marketing > 0 {
        factors.push(VoiceFactor {
            label: format!(
                "{} marketing phrase(s) left in finals",
                inputs.marketing_remaining
            ),
            adjustment: -marketing,
        });
    }

    let emoji = scaled(
        inputs.salesy_emoji_remaining,
        EMOJI_PENALTY_EACH,
        EMOJI_PENALTY_CAP,
    );
    if emoji > 0 {
        factors.push(VoiceFactor {
            label: format!(
                "{} salesy emoji left in finals",
                inputs.salesy_emoji_remaining
            ),
            adjustment: -emoji,
        });
    }

    let bonus = scaled(
        inputs.encouraged_used,
        EXPRESSION_BONUS_EACH,
        EXPRESSION_BONUS_CAP,
    );
    if bonus > 0 {
        factors.push(VoiceFactor {
            label: format!("{} encouraged expression(s) used", inputs.encouraged_used),
            adjustment: bonus,
        });
    }

    if inputs.final_caps_per_post > CAPS_ALLOWANCE {
        #[allow(clippy::cast_possible_truncation)]
        let caps = (2.0 * (inputs.final_caps_per_post - CAPS_ALLOWANCE))
            .min(CAPS_PENALTY_CAP)
            .round() as i32;
        if caps > 0 {
            factors.push(VoiceFactor {
                label: format!(
                    "{:.1} shouted words per post",
                    inputs.final_caps_per_post
                ),
                adjustment: -caps,
            });
        }
    }

    let total = factors
        .iter()
        .fold(BASE_SCORE, |acc, f| acc + f.adjustment)
        .clamp(0, 100);

    VoiceScore {
        score: u8::try_from(total).unwrap_or(0),
        factors,
    }
}

/// Mean edit effort before and after the chronological midpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementTrend {
    pub earlier_mean: f64,
    pub later_mean: f64,
    /// `None` when the earlier half averaged zero edits.
    pub percent_change: Option<f64>,
    /// Later half needed strictly fewer edits.
    pub improving: bool,
}

fn mean_edits(posts: &[&Post]) -> f64 {
    mean_of(posts.iter().map(|p| f64::from(p.edit_count))).map_or(0.0, |(m, _)| m)
}

/// Compare edit counts across the chronological halves of the corpus.
pub(crate) fn improvement_trend(posts: &[Post], min_posts: usize) -> Sampled<ImprovementTrend> {
    Sampled::gate(posts.len(), min_posts, || {
        let mut ordered: Vec<&Post> = posts.iter().collect();
        ordered.sort_by_key(|p| p.created_at);
        let (earlier, later) = ordered.split_at(ordered.len() / 2);

        let earlier_mean = mean_edits(earlier);
        let later_mean = mean_edits(later);
        let percent_change = (earlier_mean != 0.0)
            .then(|| round_to((later_mean - earlier_mean) / earlier_mean * 100.0, 1));

        ImprovementTrend {
            earlier_mean: round_to(earlier_mean, 2),
            later_mean: round_to(later_mean, 2),
            percent_change,
            improving: later_mean < earlier_mean,
        }
    })
}
