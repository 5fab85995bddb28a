//! Shrinkage-regularized posting-time buckets.

use std::collections::BTreeMap;

use chrono::{Datelike, FixedOffset, Offset, Timelike, Utc};
use serde::Serialize;

use voicelog_core::AnalyticsConfig;

use super::MeasuredPost;
use crate::sample::{mean_of, round_to, Sampled};

/// Blend a bucket mean toward the global mean, weighted by sample size.
///
/// `(n/(n+k))·m + (k/(n+k))·g`. At `n = 0` this is exactly `g`; as `n`
/// grows it converges to `m`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn shrinkage_score(bucket_mean: f64, global_mean: f64, n: usize, k: f64) -> f64 {
    let n = n as f64;
    if n + k == 0.0 {
        return global_mean;
    }
    (n / (n + k)) * bucket_mean + (k / (n + k)) * global_mean
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketScore {
    /// `"14:00"` for hours, `"Monday"` for weekdays.
    pub bucket_key: String,
    pub raw_mean: f64,
    pub shrinkage_score: f64,
    pub sample_count: usize,
    pub meets_minimum_sample: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeOfDayReport {
    /// Mean engagement rate over every rated post, `None` when there are none.
    pub global_mean: Option<f64>,
    pub posts_analyzed: usize,
    /// Rated posts left out because their publish time is unknown.
    pub posts_without_publish_time: usize,
    pub utc_offset_minutes: i32,
    pub minimum_sample: usize,
    /// Best first.
    pub hours: Vec<BucketScore>,
    /// Best first.
    pub weekdays: Vec<BucketScore>,
    pub best_hour: Sampled<BucketScore>,
    pub best_weekday: Sampled<BucketScore>,
}

/// Indexed by `Weekday::num_days_from_monday`.
const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

fn score_buckets(
    buckets: BTreeMap<u32, Vec<f64>>,
    key: impl Fn(u32) -> String,
    global_mean: f64,
    config: &AnalyticsConfig,
) -> Vec<BucketScore> {
    let mut scored: Vec<BucketScore> = buckets
        .into_iter()
        .filter_map(|(index, values)| {
            let (mean, n) = mean_of(values)?;
            Some(BucketScore {
                bucket_key: key(index),
                raw_mean: round_to(mean, 2),
                shrinkage_score: round_to(
                    shrinkage_score(mean, global_mean, n, config.shrinkage_k),
                    2,
                ),
                sample_count: n,
                meets_minimum_sample: n >= config.min_bucket_n,
            })
        })
        .collect();
    // Stable sort keeps bucket order among equal scores.
    scored.sort_by(|a, b| b.shrinkage_score.total_cmp(&a.shrinkage_score));
    scored
}

/// Highest-scoring bucket that meets the minimum sample, or a sentinel
/// carrying the largest bucket size seen.
fn best_bucket(scored: &[BucketScore], required: usize) -> Sampled<BucketScore> {
    match scored.iter().find(|b| b.meets_minimum_sample) {
        Some(best) => Sampled::Sufficient {
            value: best.clone(),
            sample_count: best.sample_count,
        },
        None => Sampled::InsufficientData {
            observed: scored.iter().map(|b| b.sample_count).max().unwrap_or(0),
            required,
        },
    }
}

/// Bucket rated posts by local publish hour and weekday.
///
/// Local time is UTC shifted by `config.utc_offset_minutes`; an offset
/// outside ±24h falls back to UTC. Posts without an engagement rate or a
/// publish time are left out of every bucket and of the global mean.
#[must_use]
pub fn time_of_day_report(posts: &[MeasuredPost<'_>], config: &AnalyticsConfig) -> TimeOfDayReport {
    let offset = config
        .utc_offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or(Utc.fix());

    let mut hours: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    let mut weekdays: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    let mut all = Vec::new();
    let mut unpublished = 0;

    for measured in posts {
        let Some(rate) = measured.rates.engagement_rate else {
            continue;
        };
        let Some(published_at) = measured.post.published_at else {
            unpublished += 1;
            continue;
        };
        let local = published_at.with_timezone(&offset);
        hours.entry(local.hour()).or_default().push(rate);
        weekdays
            .entry(local.weekday().num_days_from_monday())
            .or_default()
            .push(rate);
        all.push(rate);
    }

    let global = mean_of(all.iter().copied());
    let global_mean = global.map_or(0.0, |(m, _)| m);

    let hours = score_buckets(hours, |h| format!("{h:02}:00"), global_mean, config);
    let weekdays = score_buckets(
        weekdays,
        |d| {
            WEEKDAY_NAMES
                .get(d as usize)
                .copied()
                .unwrap_or_default()
                .to_string()
        },
        global_mean,
        config,
    );

    TimeOfDayReport {
        global_mean: global.map(|(m, _)| round_to(m, 2)),
        posts_analyzed: all.len(),
        posts_without_publish_time: unpublished,
        utc_offset_minutes: config.utc_offset_minutes,
        minimum_sample: config.min_bucket_n,
        best_hour: best_bucket(&hours, config.min_bucket_n),
        best_weekday: best_bucket(&weekdays, config.min_bucket_n),
        hours,
        weekdays,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone};

    use super::*;
    use crate::aggregate::test_support::measured_fixture;

    #[test]
    fn zero_samples_yield_global_mean() {
        assert!((shrinkage_score(9.0, 2.5, 0, 10.0) - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn large_samples_converge_to_bucket_mean() {
        let score = shrinkage_score(9.0, 2.5, 1_000_000, 10.0);
        assert!((score - 9.0).abs() < 1e-3, "got {score}");
    }

    #[test]
    fn small_bucket_is_pulled_toward_global() {
        // 3/13 * 5 + 10/13 * 2
        let score = shrinkage_score(5.0, 2.0, 3, 10.0);
        assert!((score - 2.692_307).abs() < 1e-5, "got {score}");
    }

    fn at(hour: u32, day_offset: i64) -> DateTime<Utc> {
        // 2025-03-03 is a Monday.
        Utc.with_ymd_and_hms(2025, 3, 3, hour, 0, 0).unwrap() + Duration::days(day_offset)
    }

    #[test]
    fn best_hour_needs_minimum_sample() {
        let config = AnalyticsConfig::default();
        // Four high posts at 09:00, six average posts at 18:00.
        let mut rows: Vec<(DateTime<Utc>, Option<f64>)> =
            (0..4).map(|d| (at(9, d * 7), Some(10.0))).collect();
        rows.extend((0..6).map(|d| (at(18, d * 7 + 1), Some(3.0))));
        let fixture = measured_fixture(&rows);
        let measured = fixture.measured();

        let report = time_of_day_report(&measured, &config);
        assert_eq!(report.posts_analyzed, 10);
        assert_eq!(report.hours[0].bucket_key, "09:00");
        assert!(!report.hours[0].meets_minimum_sample);

        let best = report.best_hour.value().unwrap();
        assert_eq!(best.bucket_key, "18:00");
        assert_eq!(best.sample_count, 6);

        // All six 18:00 posts fall on Tuesdays.
        assert_eq!(report.best_weekday.value().unwrap().bucket_key, "Tuesday");
    }

    #[test]
    fn thin_corpus_reports_sentinel() {
        let fixture = measured_fixture(&[(at(9, 0), Some(4.0)), (at(10, 0), None)]);
        let measured = fixture.measured();
        let report = time_of_day_report(&measured, &AnalyticsConfig::default());
        assert_eq!(report.posts_analyzed, 1);
        assert_eq!(
            report.best_hour,
            Sampled::InsufficientData {
                observed: 1,
                required: 5
            }
        );
        assert_eq!(report.global_mean, Some(4.0));
    }

    #[test]
    fn offset_shifts_hour_and_day() {
        let config = AnalyticsConfig {
            utc_offset_minutes: -120,
            ..AnalyticsConfig::default()
        };
        let fixture = measured_fixture(&[(at(1, 0), Some(2.0))]);
        let measured = fixture.measured();
        let report = time_of_day_report(&measured, &config);
        assert_eq!(report.hours[0].bucket_key, "23:00");
        assert_eq!(report.weekdays[0].bucket_key, "Sunday");
    }

    #[test]
    fn posts_without_publish_time_are_not_bucketed() {
        let mut fixture = measured_fixture(&[(at(9, 0), Some(4.0)), (at(14, 0), Some(8.0))]);
        fixture.posts[1].published_at = None;
        let measured = fixture.measured();

        let report = time_of_day_report(&measured, &AnalyticsConfig::default());
        assert_eq!(report.posts_analyzed, 1);
        assert_eq!(report.posts_without_publish_time, 1);
        assert_eq!(report.hours.len(), 1);
        assert_eq!(report.hours[0].bucket_key, "09:00");
        assert_eq!(report.global_mean, Some(4.0));
    }

    #[test]
    fn overflowing_offset_falls_back_to_utc() {
        let config = AnalyticsConfig {
            utc_offset_minutes: i32::MAX,
            ..AnalyticsConfig::default()
        };
        let fixture = measured_fixture(&[(at(7, 0), Some(2.0))]);
        let measured = fixture.measured();
        let report = time_of_day_report(&measured, &config);
        assert_eq!(report.hours[0].bucket_key, "07:00");
        assert_eq!(report.weekdays[0].bucket_key, "Monday");
    }

    #[test]
    fn empty_input_has_no_global_mean() {
        let report = time_of_day_report(&[], &AnalyticsConfig::default());
        assert_eq!(report.global_mean, None);
        assert!(report.hours.is_empty());
        assert!(!report.best_weekday.is_sufficient());
    }
}
