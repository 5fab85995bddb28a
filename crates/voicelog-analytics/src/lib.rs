//! Draft-vs-final divergence mining and small-sample engagement analytics.
//!
//! Everything here is a pure function of a [`voicelog_core::Corpus`]
//! snapshot, a [`voicelog_core::Vocabulary`] and an injected `as_of`
//! instant. Persistence and metric collection live elsewhere.

pub mod aggregate;
pub mod diff;
pub mod divergence;
pub mod error;
pub mod report;
pub mod sample;

mod text;

pub use diff::{
    compute_diff, diff_with, edit_count, log_post, similarity, DiffSummary, GreedyLineDiff,
    LineChange, LineDiff, LineOp,
};
pub use divergence::{mine_divergence, DivergenceReport};
pub use error::AnalyticsError;
pub use report::{build_report, post_performance, HashtagSection, Report, SyncQuality};
pub use sample::Sampled;
pub use text::extract_hashtags;
