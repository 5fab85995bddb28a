//! End-to-end checks of report assembly over realistic corpus snapshots.

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use voicelog_analytics::aggregate::Percentile;
use voicelog_analytics::{build_report, log_post, post_performance, AnalyticsError, Sampled};
use voicelog_core::{AnalyticsConfig, Corpus, MetricSnapshot, Post, Vocabulary};

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap()
}

fn snapshot(post: &Post, likes: u64, reach: u64) -> MetricSnapshot {
    MetricSnapshot {
        post_id: post.id,
        reach: Some(reach),
        impressions: None,
        views: None,
        likes: Some(likes),
        comments: None,
        saves: None,
        shares: None,
        engagement_rate: None,
        fetched_at: post.created_at + Duration::hours(24),
    }
}

/// Three `#pies` posts at 5% engagement and nine untagged posts at 1%,
/// all with a reach of 20,000.
fn bakery_corpus() -> Corpus {
    let mut posts = Vec::new();
    let mut metrics = Vec::new();
    for i in 0..12 {
        let created_at = as_of() - Duration::days(i + 1);
        let (final_text, likes) = if i < 3 {
            ("Fresh bakes out of the oven\n#pies", 1_000)
        } else {
            ("Open until six tonight", 200)
        };
        let post = Post::new("bakery", "AMAZING bakes!!!", final_text, 2, created_at).unwrap();
        metrics.push(snapshot(&post, likes, 20_000));
        posts.push(post);
    }
    Corpus::new(posts, metrics)
}

#[test]
fn thin_hashtag_lift_is_shrunk_toward_zero() {
    let corpus = bakery_corpus();
    let report = build_report(
        &corpus,
        &Vocabulary::default(),
        &AnalyticsConfig::default(),
        as_of(),
    )
    .unwrap();

    let lift = &report.hashtags.lift;
    assert_eq!(lift.baseline_mean, Some(2.0));
    assert_eq!(lift.rated_posts, 12);

    let pies = lift.all.iter().find(|t| t.token == "#pies").unwrap();
    assert_eq!(pies.sample_count, 3);
    assert!((pies.raw_lift - 3.0).abs() < 1e-9);
    assert!((pies.lift_score - 0.69).abs() < 1e-9);
    assert!(!pies.meets_minimum_sample);
    assert!(lift.best.is_empty());
    assert_eq!(pies.average_reach, Some(20_000));
}

#[test]
fn full_report_covers_every_section() {
    let corpus = bakery_corpus();
    let report = build_report(
        &corpus,
        &Vocabulary::default(),
        &AnalyticsConfig::default(),
        as_of(),
    )
    .unwrap();

    assert_eq!(report.total_posts, 12);
    assert_eq!(report.sync.measured_posts, 12);
    assert_eq!(report.performance.len(), 12);
    assert_eq!(report.divergence.total_posts, 12);
    assert!(report.divergence.trend.is_sufficient());
    assert!(report.edit_bands.is_sufficient());
    assert_eq!(report.hashtags.usage.posts_with_hashtags, 3);

    // Every post shares one baseline of twelve rated posts.
    let newest = &report.performance[0];
    assert_eq!(newest.baseline.size, 12);
    assert!(matches!(
        newest.percentiles[0].percentile,
        Percentile::Ranked { .. }
    ));

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["timeOfDay"]["bestHour"]["status"].is_string());
    assert_eq!(json["hashtags"]["lift"]["baselineMean"], 2.0);
}

#[test]
fn two_posts_get_no_trend_and_no_error() {
    let t = as_of() - Duration::days(3);
    let posts = vec![
        Post::new("a", "draft one", "final one", 5, t).unwrap(),
        Post::new("b", "draft two", "final two", 1, t + Duration::days(1)).unwrap(),
    ];
    let corpus = Corpus::new(posts, Vec::new());

    let report = build_report(
        &corpus,
        &Vocabulary::default(),
        &AnalyticsConfig::default(),
        as_of(),
    )
    .unwrap();

    assert_eq!(
        report.divergence.trend,
        Sampled::InsufficientData {
            observed: 2,
            required: 4
        }
    );
    assert!(report.performance.is_empty());
    assert!(!report.period_comparison.is_sufficient());
    assert!(!report.time_of_day.best_hour.is_sufficient());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["divergence"]["trend"]["status"], "insufficientData");
    assert_eq!(json["editBands"]["observed"], 0);
}

#[test]
fn sync_quality_counts_gaps_and_orphans() {
    let mut corpus = bakery_corpus();

    let mut published = Post::new("", "draft", "final", 0, as_of()).unwrap();
    published.external_media_id = Some("17900000000000001".to_string());
    corpus.posts.push(published);

    let mut orphan = snapshot(&corpus.posts[0], 10, 100);
    orphan.post_id = Uuid::new_v4();
    corpus.metrics.push(orphan);

    let report = build_report(
        &corpus,
        &Vocabulary::default(),
        &AnalyticsConfig::default(),
        as_of(),
    )
    .unwrap();

    assert_eq!(report.sync.measured_posts, 12);
    assert_eq!(report.sync.published_unmeasured, 1);
    assert_eq!(report.sync.orphan_snapshots, 1);
    // impressions, views, comments, saves and shares are unreported.
    assert_eq!(report.sync.missing_metric_fields, 12 * 5);
}

#[test]
fn corpus_from_json_with_blank_final_is_malformed() {
    let corpus: Corpus = serde_json::from_value(serde_json::json!({
        "posts": [{
            "id": "7f8a1a3e-3c1f-4d55-9a57-2f3d1f4c9b10",
            "draftText": "Something",
            "finalText": "   ",
            "createdAt": "2025-06-01T10:00:00Z"
        }]
    }))
    .unwrap();

    let err = build_report(
        &corpus,
        &Vocabulary::default(),
        &AnalyticsConfig::default(),
        as_of(),
    )
    .unwrap_err();
    assert!(matches!(err, AnalyticsError::MalformedPost { .. }));
}

#[test]
fn duplicate_post_ids_are_malformed() {
    let post = Post::new("a", "draft", "final", 1, as_of()).unwrap();
    let corpus = Corpus::new(vec![post.clone(), post], Vec::new());

    let err = post_performance(&corpus, Uuid::new_v4(), &AnalyticsConfig::default()).unwrap_err();
    assert!(
        matches!(err, AnalyticsError::MalformedPost { ref reason, .. } if reason.contains("duplicate"))
    );
}

#[test]
fn performance_for_unknown_post_is_an_error() {
    let corpus = bakery_corpus();
    let missing = Uuid::new_v4();
    let err = post_performance(&corpus, missing, &AnalyticsConfig::default()).unwrap_err();
    assert!(matches!(err, AnalyticsError::UnknownPost(id) if id == missing));
}

#[test]
fn performance_for_unmeasured_post_reports_missing_values() {
    let mut corpus = bakery_corpus();
    let fresh = Post::new("new", "draft", "final", 0, as_of()).unwrap();
    let fresh_id = fresh.id;
    corpus.posts.push(fresh);

    let report = post_performance(&corpus, fresh_id, &AnalyticsConfig::default()).unwrap();
    assert!(!report.measured);
    assert_eq!(report.baseline.size, 12);
    assert!(report
        .percentiles
        .iter()
        .all(|p| p.percentile == Percentile::MissingValue));
}

#[test]
fn performance_ranks_a_tagged_post_at_the_top() {
    let corpus = bakery_corpus();
    let tagged = corpus.posts[0].id;

    let report = post_performance(&corpus, tagged, &AnalyticsConfig::default()).unwrap();
    assert!(report.measured);
    assert_eq!(report.rates.engagement_rate, Some(5.0));
    assert_eq!(report.percentiles[0].percentile.rank(), Some(100));
}

#[test]
fn logged_post_carries_derived_edit_count() {
    let post = log_post("", "A\nB\nC", "A\nX\nC", as_of()).unwrap();
    assert_eq!(post.edit_count, 1);
    assert_eq!(post.topic, voicelog_core::UNTITLED_TOPIC);
    assert!(!post.is_published());
}

#[test]
fn oversized_period_degrades_to_sentinels() {
    let config = AnalyticsConfig {
        period_days: 1_000_000_000,
        ..AnalyticsConfig::default()
    };
    let report = build_report(&bakery_corpus(), &Vocabulary::default(), &config, as_of()).unwrap();

    assert!(!report.period_comparison.is_sufficient());
    assert!(!report.period_summary.is_sufficient());
    assert_eq!(report.sync.measured_posts, 12);
}

#[test]
fn best_hour_ignores_posts_without_publish_time() {
    let mut corpus = bakery_corpus();
    for post in corpus.posts.iter_mut().take(6) {
        post.published_at = Some(post.created_at + Duration::hours(2));
    }
    let report = build_report(
        &corpus,
        &Vocabulary::default(),
        &AnalyticsConfig::default(),
        as_of(),
    )
    .unwrap();

    assert_eq!(report.time_of_day.posts_analyzed, 6);
    assert_eq!(report.time_of_day.posts_without_publish_time, 6);
}
