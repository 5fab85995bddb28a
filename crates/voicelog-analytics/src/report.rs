//! Report assembly over one materialized corpus snapshot.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use voicelog_core::{AnalyticsConfig, Corpus, Vocabulary};

use crate::aggregate::{
    edit_bands, hashtag_lift_report, hashtag_usage, measured_posts, percentile_report,
    period_comparison, period_summary, time_of_day_report, trending_hashtags, BandStats,
    HashtagLiftReport, HashtagUsage, MeasuredPost, PercentileReport, PeriodComparison,
    PeriodSummary, TimeOfDayReport, TrendingTag,
};
use crate::divergence::{mine_divergence, DivergenceReport};
use crate::error::AnalyticsError;
use crate::sample::Sampled;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HashtagSection {
    pub lift: HashtagLiftReport,
    pub usage: HashtagUsage,
    pub trending: Vec<TrendingTag>,
}

/// How complete the metric sync behind this report was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncQuality {
    pub measured_posts: usize,
    /// Linked to a platform post but with no snapshot yet.
    pub published_unmeasured: usize,
    /// Unreported raw fields summed over the authoritative snapshots.
    pub missing_metric_fields: usize,
    /// Snapshots whose post is not in the corpus; ignored.
    pub orphan_snapshots: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub as_of: DateTime<Utc>,
    pub total_posts: usize,
    pub sync: SyncQuality,
    pub divergence: DivergenceReport,
    pub time_of_day: TimeOfDayReport,
    pub hashtags: HashtagSection,
    /// One entry per measured post, most recent first.
    pub performance: Vec<PercentileReport>,
    pub period_comparison: Sampled<PeriodComparison>,
    pub period_summary: Sampled<PeriodSummary>,
    pub edit_bands: Sampled<Vec<BandStats>>,
}

/// Check the structural contract the persistence collaborator promises.
///
/// Returns the number of orphaned snapshots, which are tolerated.
fn validate_corpus(corpus: &Corpus) -> Result<usize, AnalyticsError> {
    let mut ids = HashSet::with_capacity(corpus.posts.len());
    for post in &corpus.posts {
        post.validate()
            .map_err(|e| AnalyticsError::MalformedPost {
                post_id: post.id,
                reason: e.to_string(),
            })?;
        if !ids.insert(post.id) {
            return Err(AnalyticsError::MalformedPost {
                post_id: post.id,
                reason: "duplicate post id".to_string(),
            });
        }
    }

    let orphans = corpus
        .metrics
        .iter()
        .filter(|m| !ids.contains(&m.post_id))
        .count();
    if orphans > 0 {
        tracing::warn!(orphans, "metric snapshots reference unknown posts; ignoring them");
    }
    Ok(orphans)
}

fn sync_quality(corpus: &Corpus, measured: &[MeasuredPost<'_>], orphans: usize) -> SyncQuality {
    let measured_ids: HashSet<Uuid> = measured.iter().map(|m| m.post.id).collect();
    SyncQuality {
        measured_posts: measured.len(),
        published_unmeasured: corpus
            .posts
            .iter()
            .filter(|p| p.is_published() && !measured_ids.contains(&p.id))
            .count(),
        missing_metric_fields: measured
            .iter()
            .map(|m| m.snapshot.missing_field_count())
            .sum(),
        orphan_snapshots: orphans,
    }
}

/// Build the full analytics payload for one corpus snapshot.
///
/// `as_of` anchors every time window; the engine never reads the clock.
///
/// # Errors
///
/// Returns [`AnalyticsError::MalformedPost`] if a post has empty text or a
/// duplicated id. Thin data never errors.
pub fn build_report(
    corpus: &Corpus,
    vocabulary: &Vocabulary,
    config: &AnalyticsConfig,
    as_of: DateTime<Utc>,
) -> Result<Report, AnalyticsError> {
    let orphans = validate_corpus(corpus)?;
    let measured = measured_posts(corpus);

    tracing::info!(
        posts = corpus.posts.len(),
        measured = measured.len(),
        snapshots = corpus.metrics.len(),
        %as_of,
        "building report"
    );

    let divergence = mine_divergence(&corpus.posts, vocabulary, config.min_trend_posts);
    let time_of_day = time_of_day_report(&measured, config);
    let hashtags = HashtagSection {
        lift: hashtag_lift_report(&measured, config),
        usage: hashtag_usage(&corpus.posts),
        trending: trending_hashtags(&corpus.posts, as_of),
    };
    let performance = measured
        .iter()
        .map(|m| percentile_report(m.post, Some(m.rates), &measured, config))
        .collect();

    let report = Report {
        as_of,
        total_posts: corpus.posts.len(),
        sync: sync_quality(corpus, &measured, orphans),
        divergence,
        time_of_day,
        hashtags,
        performance,
        period_comparison: period_comparison(&measured, as_of, config),
        period_summary: period_summary(&measured, as_of, config),
        edit_bands: edit_bands(&measured),
    };

    tracing::debug!(
        voice_score = report.divergence.voice.score,
        best_hour = report.time_of_day.best_hour.is_sufficient(),
        period_delta = report.period_comparison.is_sufficient(),
        "report assembled"
    );

    Ok(report)
}

/// Percentile report for a single post.
///
/// A post that has never been measured still gets a report, with every
/// rank marked as a missing value.
///
/// # Errors
///
/// Returns [`AnalyticsError::UnknownPost`] if `post_id` is not in the
/// corpus, or [`AnalyticsError::MalformedPost`] if the corpus is malformed.
pub fn post_performance(
    corpus: &Corpus,
    post_id: Uuid,
    config: &AnalyticsConfig,
) -> Result<PercentileReport, AnalyticsError> {
    validate_corpus(corpus)?;
    let post = corpus
        .post(post_id)
        .ok_or(AnalyticsError::UnknownPost(post_id))?;
    let measured = measured_posts(corpus);
    let rates = measured
        .iter()
        .find(|m| m.post.id == post_id)
        .map(|m| m.rates);

    Ok(percentile_report(post, rates, &measured, config))
}
