//! Hashtag ledger: usage, trending, and shrunk engagement lift.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use voicelog_core::{AnalyticsConfig, Post};

use super::MeasuredPost;
use crate::sample::{mean_of, round_to};
use crate::text::extract_hashtags;

const LIFT_LIST_LIMIT: usize = 10;
const USAGE_TOP_LIMIT: usize = 20;
const TRENDING_LIMIT: usize = 10;
const TRENDING_WINDOW_DAYS: i64 = 30;
const TRENDING_MIN_COUNT: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HashtagLift {
    pub token: String,
    /// Tagged posts that carried an engagement rate.
    pub sample_count: usize,
    pub bucket_mean: f64,
    pub baseline_mean: f64,
    pub raw_lift: f64,
    pub lift_score: f64,
    pub meets_minimum_sample: bool,
    /// Rounded mean reach over tagged posts that reported one.
    pub average_reach: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HashtagLiftReport {
    /// Mean engagement rate over every rated post; `None` with no ratings.
    pub baseline_mean: Option<f64>,
    pub rated_posts: usize,
    pub minimum_sample: usize,
    /// Positive lift, eligible only, strongest first.
    pub best: Vec<HashtagLift>,
    /// Negative lift, eligible only, most negative first.
    pub worst: Vec<HashtagLift>,
    /// Every scored tag, by descending lift score.
    pub all: Vec<HashtagLift>,
}

#[derive(Default)]
struct TagLedger {
    rates: Vec<f64>,
    reaches: Vec<f64>,
}

/// Score each tag's engagement against the corpus baseline.
///
/// `liftScore = (n/(n+k))·(bucketMean − baselineMean)`, so a tag seen on
/// only a few rated posts is pulled toward zero lift. Tags below
/// `config.min_tag_n` are scored but kept out of `best` and `worst`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn hashtag_lift_report(
    posts: &[MeasuredPost<'_>],
    config: &AnalyticsConfig,
) -> HashtagLiftReport {
    let baseline = mean_of(posts.iter().filter_map(|m| m.rates.engagement_rate));
    let Some((baseline_mean, rated_posts)) = baseline else {
        return HashtagLiftReport {
            baseline_mean: None,
            rated_posts: 0,
            minimum_sample: config.min_tag_n,
            best: Vec::new(),
            worst: Vec::new(),
            all: Vec::new(),
        };
    };

    let mut ledger: HashMap<String, TagLedger> = HashMap::new();
    for measured in posts {
        for tag in extract_hashtags(&measured.post.final_text) {
            let entry = ledger.entry(tag).or_default();
            if let Some(rate) = measured.rates.engagement_rate {
                entry.rates.push(rate);
            }
            if let Some(reach) = measured.snapshot.reach {
                entry.reaches.push(reach as f64);
            }
        }
    }

    let mut all: Vec<HashtagLift> = ledger
        .into_iter()
        .filter_map(|(token, tally)| {
            let (bucket_mean, n) = mean_of(tally.rates)?;
            let raw_lift = bucket_mean - baseline_mean;
            let lift_score = (n as f64 / (n as f64 + config.shrinkage_k)) * raw_lift;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let average_reach = mean_of(tally.reaches).map(|(m, _)| m.round() as u64);
            Some(HashtagLift {
                token,
                sample_count: n,
                bucket_mean: round_to(bucket_mean, 2),
                baseline_mean: round_to(baseline_mean, 2),
                raw_lift: round_to(raw_lift, 2),
                lift_score: round_to(lift_score, 2),
                meets_minimum_sample: n >= config.min_tag_n,
                average_reach,
            })
        })
        .collect();
    all.sort_by(|a, b| {
        b.lift_score
            .total_cmp(&a.lift_score)
            .then_with(|| a.token.cmp(&b.token))
    });

    let best: Vec<HashtagLift> = all
        .iter()
        .filter(|t| t.meets_minimum_sample && t.lift_score > 0.0)
        .take(LIFT_LIST_LIMIT)
        .cloned()
        .collect();
    let worst: Vec<HashtagLift> = all
        .iter()
        .rev()
        .filter(|t| t.meets_minimum_sample && t.lift_score < 0.0)
        .take(LIFT_LIST_LIMIT)
        .cloned()
        .collect();

    tracing::debug!(
        tags = all.len(),
        best = best.len(),
        worst = worst.len(),
        rated_posts,
        "scored hashtag lift"
    );

    HashtagLiftReport {
        baseline_mean: Some(round_to(baseline_mean, 2)),
        rated_posts,
        minimum_sample: config.min_tag_n,
        best,
        worst,
        all,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub token: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HashtagUsage {
    pub total_unique: usize,
    /// Tag-post pairs; a tag repeated within one post counts once.
    pub total_usage: usize,
    /// `None` for an empty corpus.
    pub average_per_post: Option<f64>,
    pub posts_with_hashtags: usize,
    pub top: Vec<TagCount>,
}

fn tag_counts<'a>(posts: impl IntoIterator<Item = &'a Post>) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for post in posts {
        for tag in extract_hashtags(&post.final_text) {
            *counts.entry(tag).or_insert(0) += 1;
        }
    }
    counts
}

fn ranked(counts: HashMap<String, usize>) -> Vec<TagCount> {
    let mut ranked: Vec<TagCount> = counts
        .into_iter()
        .map(|(token, count)| TagCount { token, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.token.cmp(&b.token)));
    ranked
}

/// How often each tag appears across final texts, measured or not.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn hashtag_usage(posts: &[Post]) -> HashtagUsage {
    let mut all = ranked(tag_counts(posts));
    let total_usage: usize = all.iter().map(|t| t.count).sum();
    let total_unique = all.len();
    all.truncate(USAGE_TOP_LIMIT);

    HashtagUsage {
        total_unique,
        total_usage,
        average_per_post: (!posts.is_empty())
            .then(|| round_to(total_usage as f64 / posts.len() as f64, 1)),
        posts_with_hashtags: posts
            .iter()
            .filter(|p| !extract_hashtags(&p.final_text).is_empty())
            .count(),
        top: all,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingTag {
    pub token: String,
    pub recent_count: usize,
    pub previous_count: usize,
    /// Whole-percent growth over the previous window; 100 for new tags.
    pub growth: i64,
}

/// Tags used at least twice in the 30 days up to `as_of`, ranked by growth
/// over the 30 days before that. Windows are by creation time.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn trending_hashtags(posts: &[Post], as_of: DateTime<Utc>) -> Vec<TrendingTag> {
    let recent_start = as_of - Duration::days(TRENDING_WINDOW_DAYS);
    let previous_start = recent_start - Duration::days(TRENDING_WINDOW_DAYS);

    let recent = tag_counts(
        posts
            .iter()
            .filter(|p| p.created_at >= recent_start && p.created_at <= as_of),
    );
    let previous = tag_counts(
        posts
            .iter()
            .filter(|p| p.created_at >= previous_start && p.created_at < recent_start),
    );

    let mut trending: Vec<TrendingTag> = recent
        .into_iter()
        .filter(|(_, count)| *count >= TRENDING_MIN_COUNT)
        .map(|(token, recent_count)| {
            let previous_count = previous.get(&token).copied().unwrap_or(0);
            let growth = if previous_count > 0 {
                ((recent_count as f64 - previous_count as f64) / previous_count as f64 * 100.0)
                    .round() as i64
            } else {
                100
            };
            TrendingTag {
                token,
                recent_count,
                previous_count,
                growth,
            }
        })
        .collect();
    trending.sort_by(|a, b| {
        b.growth
            .cmp(&a.growth)
            .then_with(|| b.recent_count.cmp(&a.recent_count))
            .then_with(|| a.token.cmp(&b.token))
    });
    trending.truncate(TRENDING_LIMIT);
    trending
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::aggregate::test_support::{fixture, Row};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn thin_positive_tag_is_shrunk_and_not_best() {
        // Three #pies posts at 5%, nine untagged at 1% -> baseline 2%.
        let mut rows: Vec<Row> = (0..3)
            .map(|i| Row::new(day(i), Some(5.0)).text("Hot pies #Pies"))
            .collect();
        rows.extend((3..12).map(|i| Row::new(day(i), Some(1.0)).reach(20_000)));
        let fx = fixture(&rows);
        let measured = fx.measured();

        let report = hashtag_lift_report(&measured, &AnalyticsConfig::default());
        assert_eq!(report.rated_posts, 12);
        assert_eq!(report.baseline_mean, Some(2.0));

        let pies = &report.all[0];
        assert_eq!(pies.token, "#pies");
        assert_eq!(pies.sample_count, 3);
        assert!((pies.raw_lift - 3.0).abs() < 1e-9);
        assert!((pies.lift_score - 0.69).abs() < 1e-9, "got {}", pies.lift_score);
        assert!(!pies.meets_minimum_sample);
        assert!(report.best.is_empty());
        assert_eq!(pies.average_reach, Some(10_000));
    }

    #[test]
    fn eligible_tags_split_into_best_and_worst() {
        let mut rows = Vec::new();
        for i in 0..5 {
            rows.push(Row::new(day(i), Some(6.0)).text("#good"));
            rows.push(Row::new(day(i), Some(1.0)).text("#bad"));
        }
        let fx = fixture(&rows);
        let measured = fx.measured();

        let report = hashtag_lift_report(&measured, &AnalyticsConfig::default());
        assert_eq!(report.best.len(), 1);
        assert_eq!(report.best[0].token, "#good");
        // 5/15 * 2.5
        assert!((report.best[0].lift_score - 0.83).abs() < 1e-9);
        assert_eq!(report.worst.len(), 1);
        assert_eq!(report.worst[0].token, "#bad");
        assert!(report.worst[0].lift_score < 0.0);
    }

    #[test]
    fn unrated_posts_do_not_score_tags() {
        let fx = fixture(&[Row::new(day(0), None).text("#ghost")]);
        let measured = fx.measured();
        let report = hashtag_lift_report(&measured, &AnalyticsConfig::default());
        assert_eq!(report.baseline_mean, None);
        assert!(report.all.is_empty());
    }

    fn post(day_n: i64, text: &str) -> Post {
        Post::new("t", "draft", text, 1, day(day_n)).unwrap()
    }

    #[test]
    fn usage_counts_once_per_post() {
        let posts = vec![
            post(0, "#a #a #b"),
            post(1, "#A and #c"),
            post(2, "no tags"),
        ];
        let usage = hashtag_usage(&posts);
        assert_eq!(usage.total_unique, 3);
        assert_eq!(usage.total_usage, 4);
        assert_eq!(usage.average_per_post, Some(1.3));
        assert_eq!(usage.posts_with_hashtags, 2);
        assert_eq!(
            usage.top[0],
            TagCount {
                token: "#a".to_string(),
                count: 2
            }
        );
        assert_eq!(hashtag_usage(&[]).average_per_post, None);
    }

    #[test]
    fn trending_compares_adjacent_windows() {
        let as_of = day(60);
        let posts = vec![
            // previous window
            post(5, "#steady #fading"),
            post(6, "#fading"),
            // recent window
            post(40, "#steady #fresh"),
            post(41, "#steady #fresh"),
            post(42, "#fresh #once"),
            // after as_of: ignored
            post(61, "#fresh"),
        ];
        let trending = trending_hashtags(&posts, as_of);
        let tokens: Vec<&str> = trending.iter().map(|t| t.token.as_str()).collect();
        // Both grew 100% (2 vs 1, and new); ties go to the larger recent count.
        assert_eq!(tokens, vec!["#fresh", "#steady"]);
        assert_eq!(trending[0].recent_count, 3);
        assert_eq!(trending[0].previous_count, 0);
        assert_eq!(trending[1].growth, 100);
        assert_eq!(trending[1].previous_count, 1);
    }
}
