use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Thresholds and constants used by the aggregation engine.
///
/// Every field has a default matching the values the engine has always
/// reported with; overriding them changes which buckets are surfaced as
/// "best" but never turns an insufficient sample into an error.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    /// Shrinkage constant `k` in `(n/(n+k))·m + (k/(n+k))·g`.
    pub shrinkage_k: f64,
    /// Minimum samples for a time-of-day bucket to be selected as best.
    pub min_bucket_n: usize,
    /// Minimum samples for a hashtag to appear in best/worst lists.
    pub min_tag_n: usize,
    /// Maximum number of posts in the percentile baseline window.
    pub baseline_window: usize,
    /// Minimum valid baseline entries before a percentile is reported.
    pub min_baseline: usize,
    /// Length of each comparison period, in days.
    pub period_days: i64,
    /// Minimum rated posts per period window.
    pub min_period_posts: usize,
    /// Minimum posts before an improvement trend is reported.
    pub min_trend_posts: usize,
    /// Offset applied to publish timestamps before bucketing by hour/day.
    pub utc_offset_minutes: i32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            shrinkage_k: 10.0,
            min_bucket_n: 5,
            min_tag_n: 5,
            baseline_window: 30,
            min_baseline: 10,
            period_days: 28,
            min_period_posts: 3,
            min_trend_posts: 4,
            utc_offset_minutes: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Vocabulary YAML file; `None` means the built-in vocabulary.
    pub vocabulary_path: Option<PathBuf>,
    pub analytics: AnalyticsConfig,
}
