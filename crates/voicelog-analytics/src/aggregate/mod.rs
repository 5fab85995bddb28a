//! Small-sample statistics over sparse, partially-null engagement metrics.
//!
//! Missing values stay missing: a rate with no usable denominator is `None`,
//! aggregates run over present samples only, and every aggregate carries the
//! sample count behind it. Thin data yields a [`Sampled::InsufficientData`]
//! sentinel rather than an error.
//!
//! [`Sampled::InsufficientData`]: crate::sample::Sampled::InsufficientData

mod bands;
mod hashtags;
mod percentile;
mod rates;
mod shrinkage;

pub use bands::{edit_bands, BandStats, EditBand};
pub use hashtags::{
    hashtag_lift_report, hashtag_usage, trending_hashtags, HashtagLift, HashtagLiftReport,
    HashtagUsage, TagCount, TrendingTag,
};
pub use percentile::{
    baseline_window, percentile_rank, percentile_report, period_comparison, period_summary,
    BaselineWindow, Percentile, PercentileReport, PeriodComparison, PeriodSummary, RateMedian,
    RatePercentile,
};
pub use rates::{component_rates, engagement_rate, ComponentRates, RateKind};
pub use shrinkage::{shrinkage_score, time_of_day_report, BucketScore, TimeOfDayReport};

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use voicelog_core::{Corpus, MetricSnapshot, Post};

/// A post paired with its authoritative snapshot and the rates derived
/// from it.
#[derive(Debug, Clone, Copy)]
pub struct MeasuredPost<'a> {
    pub post: &'a Post,
    pub snapshot: &'a MetricSnapshot,
    pub rates: ComponentRates,
}

impl<'a> MeasuredPost<'a> {
    #[must_use]
    pub fn new(post: &'a Post, snapshot: &'a MetricSnapshot) -> Self {
        Self {
            post,
            snapshot,
            rates: component_rates(snapshot),
        }
    }

    /// Publish time when known, else when the metrics were fetched.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.post.published_at.unwrap_or(self.snapshot.fetched_at)
    }
}

/// Every post that has at least one snapshot, most recent first.
#[must_use]
pub fn measured_posts(corpus: &Corpus) -> Vec<MeasuredPost<'_>> {
    let latest: HashMap<Uuid, &MetricSnapshot> = corpus.latest_snapshots();
    let mut measured: Vec<MeasuredPost<'_>> = corpus
        .posts
        .iter()
        .filter_map(|post| {
            latest
                .get(&post.id)
                .copied()
                .map(|snap| MeasuredPost::new(post, snap))
        })
        .collect();
    measured.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    measured
}
