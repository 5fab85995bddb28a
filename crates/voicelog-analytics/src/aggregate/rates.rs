use std::fmt;

use serde::Serialize;

use voicelog_core::MetricSnapshot;

use crate::sample::round_to;

/// Per-reach rates for one snapshot. Each is `None` when its component or
/// a usable reach is missing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRates {
    pub engagement_rate: Option<f64>,
    pub like_rate: Option<f64>,
    pub comment_rate: Option<f64>,
    pub save_rate: Option<f64>,
    pub share_rate: Option<f64>,
    /// Sum of whichever of likes, comments, saves and shares were reported.
    pub engagement_total: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RateKind {
    EngagementRate,
    LikeRate,
    CommentRate,
    SaveRate,
    ShareRate,
}

impl RateKind {
    pub const ALL: [RateKind; 5] = [
        RateKind::EngagementRate,
        RateKind::LikeRate,
        RateKind::CommentRate,
        RateKind::SaveRate,
        RateKind::ShareRate,
    ];

    #[must_use]
    pub fn of(self, rates: &ComponentRates) -> Option<f64> {
        match self {
            RateKind::EngagementRate => rates.engagement_rate,
            RateKind::LikeRate => rates.like_rate,
            RateKind::CommentRate => rates.comment_rate,
            RateKind::SaveRate => rates.save_rate,
            RateKind::ShareRate => rates.share_rate,
        }
    }
}

impl fmt::Display for RateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateKind::EngagementRate => write!(f, "engagementRate"),
            RateKind::LikeRate => write!(f, "likeRate"),
            RateKind::CommentRate => write!(f, "commentRate"),
            RateKind::SaveRate => write!(f, "saveRate"),
            RateKind::ShareRate => write!(f, "shareRate"),
        }
    }
}

fn usable_reach(snapshot: &MetricSnapshot) -> Option<u64> {
    snapshot.reach.filter(|r| *r > 0)
}

#[allow(clippy::cast_precision_loss)]
fn per_reach(count: Option<u64>, reach: u64, places: i32) -> Option<f64> {
    count.map(|c| round_to(c as f64 / reach as f64 * 100.0, places))
}

fn present_sum(values: &[Option<u64>]) -> Option<u64> {
    values
        .iter()
        .flatten()
        .fold(None, |acc, v| Some(acc.unwrap_or(0) + v))
}

/// `(likes + comments + saves) / reach × 100`, two decimals.
///
/// Absent components are skipped, but at least one must be present and
/// reach must be present and non-zero. A missing rate is never reported as
/// zero.
#[must_use]
pub fn engagement_rate(snapshot: &MetricSnapshot) -> Option<f64> {
    let reach = usable_reach(snapshot)?;
    let engaged = present_sum(&[snapshot.likes, snapshot.comments, snapshot.saves])?;
    per_reach(Some(engaged), reach, 2)
}

#[must_use]
pub fn component_rates(snapshot: &MetricSnapshot) -> ComponentRates {
    let engagement_total = present_sum(&[
        snapshot.likes,
        snapshot.comments,
        snapshot.saves,
        snapshot.shares,
    ]);
    let Some(reach) = usable_reach(snapshot) else {
        return ComponentRates {
            engagement_total,
            ..ComponentRates::default()
        };
    };

    ComponentRates {
        engagement_rate: engagement_rate(snapshot),
        like_rate: per_reach(snapshot.likes, reach, 2),
        comment_rate: per_reach(snapshot.comments, reach, 3),
        save_rate: per_reach(snapshot.saves, reach, 2),
        share_rate: per_reach(snapshot.shares, reach, 3),
        engagement_total,
    }
}
