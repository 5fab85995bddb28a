//! Percentile benchmarks and period-over-period medians.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use uuid::Uuid;

use voicelog_core::{AnalyticsConfig, MediaType, Post};

use super::{ComponentRates, MeasuredPost, RateKind};
use crate::sample::{median_of, round_to, Sampled};

/// Where a value sits in its baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Percentile {
    #[serde(rename_all = "camelCase")]
    Ranked { percentile: u8, baseline_size: usize },
    #[serde(rename_all = "camelCase")]
    InsufficientBaseline { observed: usize, required: usize },
    /// The value being ranked was not reported.
    MissingValue,
}

impl Percentile {
    #[must_use]
    pub fn rank(&self) -> Option<u8> {
        match self {
            Percentile::Ranked { percentile, .. } => Some(*percentile),
            _ => None,
        }
    }
}

/// `round(100 × |{b ≤ value}| / |baseline|)` over the non-null baseline.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn percentile_rank(
    value: Option<f64>,
    baseline: impl IntoIterator<Item = Option<f64>>,
    min_baseline: usize,
) -> Percentile {
    let Some(value) = value else {
        return Percentile::MissingValue;
    };
    let valid: Vec<f64> = baseline.into_iter().flatten().collect();
    if valid.len() < min_baseline || valid.is_empty() {
        return Percentile::InsufficientBaseline {
            observed: valid.len(),
            required: min_baseline,
        };
    }
    let at_or_below = valid.iter().filter(|b| **b <= value).count();
    let pct = (at_or_below as f64 / valid.len() as f64 * 100.0).round();
    Percentile::Ranked {
        percentile: pct.clamp(0.0, 100.0) as u8,
        baseline_size: valid.len(),
    }
}

/// Comparison population for percentile ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineWindow {
    /// Set when the window was narrowed to one media type.
    pub scoped_to: Option<MediaType>,
    #[serde(skip)]
    pub rates: Vec<ComponentRates>,
    pub size: usize,
}

/// The most recent rated posts, up to `config.baseline_window` of them.
///
/// With a `media_type`, the window is narrowed to that type only when at
/// least `config.min_baseline` rated posts of the type exist.
#[must_use]
pub fn baseline_window(
    posts: &[MeasuredPost<'_>],
    media_type: Option<MediaType>,
    config: &AnalyticsConfig,
) -> BaselineWindow {
    let mut rated: Vec<&MeasuredPost<'_>> = posts
        .iter()
        .filter(|m| m.rates.engagement_rate.is_some())
        .collect();
    rated.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));

    let scoped: Option<Vec<&MeasuredPost<'_>>> = media_type.and_then(|mt| {
        let subset: Vec<_> = rated
            .iter()
            .copied()
            .filter(|m| m.post.media_type == Some(mt))
            .collect();
        (subset.len() >= config.min_baseline).then_some(subset)
    });
    let scoped_to = scoped.as_ref().and(media_type);
    let chosen = scoped.unwrap_or(rated);

    let rates: Vec<ComponentRates> = chosen
        .into_iter()
        .take(config.baseline_window)
        .map(|m| m.rates)
        .collect();

    BaselineWindow {
        scoped_to,
        size: rates.len(),
        rates,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatePercentile {
    pub rate: RateKind,
    pub value: Option<f64>,
    pub percentile: Percentile,
}

/// One post's rates ranked against the current baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentileReport {
    pub post_id: Uuid,
    pub topic: String,
    pub media_type: Option<MediaType>,
    pub measured: bool,
    pub rates: ComponentRates,
    pub baseline: BaselineWindow,
    pub percentiles: Vec<RatePercentile>,
}

/// Rank `post` against the baseline drawn from `posts`.
///
/// `rates` is `None` for a post that has never been measured; every rank
/// is then [`Percentile::MissingValue`].
#[must_use]
pub fn percentile_report(
    post: &Post,
    rates: Option<ComponentRates>,
    posts: &[MeasuredPost<'_>],
    config: &AnalyticsConfig,
) -> PercentileReport {
    let baseline = baseline_window(posts, post.media_type, config);
    let own = rates.unwrap_or_default();

    let percentiles = RateKind::ALL
        .iter()
        .map(|kind| RatePercentile {
            rate: *kind,
            value: kind.of(&own),
            percentile: percentile_rank(
                kind.of(&own),
                baseline.rates.iter().map(|r| kind.of(r)),
                config.min_baseline,
            ),
        })
        .collect();

    PercentileReport {
        post_id: post.id,
        topic: post.topic.clone(),
        media_type: post.media_type,
        measured: rates.is_some(),
        rates: own,
        baseline,
        percentiles,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodComparison {
    pub days: i64,
    pub current_median: f64,
    pub previous_median: f64,
    pub current_posts: usize,
    pub previous_posts: usize,
    /// Percent change of the current median over the previous one; `None`
    /// when the previous median is zero.
    pub delta_pct: Option<f64>,
}

/// Starts of the previous and current `days`-long windows ending at
/// `as_of`, or `None` if either falls outside the representable range.
fn window_starts(as_of: DateTime<Utc>, days: i64) -> Option<[DateTime<Utc>; 2]> {
    let span = TimeDelta::try_days(days)?;
    let current_start = as_of.checked_sub_signed(span)?;
    let previous_start = current_start.checked_sub_signed(span)?;
    Some([previous_start, current_start])
}

fn rated_in<'a>(
    posts: &'a [MeasuredPost<'a>],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    inclusive_end: bool,
) -> impl Iterator<Item = &'a MeasuredPost<'a>> {
    posts.iter().filter(move |m| {
        let t = m.timestamp();
        m.rates.engagement_rate.is_some() && t >= from && (t < to || (inclusive_end && t == to))
    })
}

/// Median engagement over the last `config.period_days` against the
/// window before it. Both windows need `config.min_period_posts` rated
/// posts; the sentinel reports the thinner window's count.
#[must_use]
pub fn period_comparison(
    posts: &[MeasuredPost<'_>],
    as_of: DateTime<Utc>,
    config: &AnalyticsConfig,
) -> Sampled<PeriodComparison> {
    let Some([previous_start, current_start]) = window_starts(as_of, config.period_days) else {
        return Sampled::InsufficientData {
            observed: 0,
            required: config.min_period_posts,
        };
    };

    let current: Vec<f64> = rated_in(posts, current_start, as_of, true)
        .filter_map(|m| m.rates.engagement_rate)
        .collect();
    let previous: Vec<f64> = rated_in(posts, previous_start, current_start, false)
        .filter_map(|m| m.rates.engagement_rate)
        .collect();

    let observed = current.len().min(previous.len());
    let current_posts = current.len();
    let previous_posts = previous.len();

    Sampled::gate(observed, config.min_period_posts, || {
        let current_median = median_of(current).unwrap_or(0.0);
        let previous_median = median_of(previous).unwrap_or(0.0);
        let delta_pct = (previous_median != 0.0).then(|| {
            round_to(
                (current_median - previous_median) / previous_median * 100.0,
                1,
            )
        });
        PeriodComparison {
            days: config.period_days,
            current_median: round_to(current_median, 2),
            previous_median: round_to(previous_median, 2),
            current_posts,
            previous_posts,
            delta_pct,
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateMedian {
    pub rate: RateKind,
    pub median: Option<f64>,
    pub sample_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub days: i64,
    pub post_count: usize,
    pub medians: Vec<RateMedian>,
}

/// Median of each rate over measured posts from the last
/// `config.period_days`, each over its own present samples.
#[must_use]
pub fn period_summary(
    posts: &[MeasuredPost<'_>],
    as_of: DateTime<Utc>,
    config: &AnalyticsConfig,
) -> Sampled<PeriodSummary> {
    let Some(start) = TimeDelta::try_days(config.period_days)
        .and_then(|span| as_of.checked_sub_signed(span))
    else {
        return Sampled::InsufficientData {
            observed: 0,
            required: 1,
        };
    };
    let recent: Vec<&MeasuredPost<'_>> = posts
        .iter()
        .filter(|m| {
            let t = m.timestamp();
            t >= start && t <= as_of
        })
        .collect();

    Sampled::gate(recent.len(), 1, || PeriodSummary {
        days: config.period_days,
        post_count: recent.len(),
        medians: RateKind::ALL
            .iter()
            .map(|kind| {
                let values: Vec<f64> = recent.iter().filter_map(|m| kind.of(&m.rates)).collect();
                RateMedian {
                    rate: *kind,
                    sample_count: values.len(),
                    median: median_of(values).map(|m| round_to(m, 3)),
                }
            })
            .collect(),
    })
}

#[cfg(test)]
#[path = "percentile_test.rs"]
mod tests;
