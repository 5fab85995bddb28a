use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A point-in-time read of a published post's engagement.
///
/// Every raw field is independently nullable: `None` means the platform did
/// not report the value, which is distinct from a reported zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSnapshot {
    pub post_id: Uuid,
    #[serde(default)]
    pub reach: Option<u64>,
    #[serde(default)]
    pub impressions: Option<u64>,
    #[serde(default)]
    pub views: Option<u64>,
    #[serde(default)]
    pub likes: Option<u64>,
    #[serde(default)]
    pub comments: Option<u64>,
    #[serde(default)]
    pub saves: Option<u64>,
    #[serde(default)]
    pub shares: Option<u64>,
    /// Rate as last stored by the collaborator. The engine recomputes it
    /// from the raw fields rather than trusting this value.
    #[serde(default)]
    pub engagement_rate: Option<f64>,
    pub fetched_at: DateTime<Utc>,
}

impl MetricSnapshot {
    /// Number of raw metric fields the platform left unreported.
    #[must_use]
    pub fn missing_field_count(&self) -> usize {
        [
            self.impressions,
            self.reach,
            self.views,
            self.likes,
            self.comments,
            self.saves,
            self.shares,
        ]
        .iter()
        .filter(|v| v.is_none())
        .count()
    }
}

/// Pick the authoritative snapshot: the most recent by `fetched_at`.
///
/// Ties keep the later element of the slice.
#[must_use]
pub fn latest_snapshot(snapshots: &[MetricSnapshot]) -> Option<&MetricSnapshot> {
    snapshots.iter().max_by_key(|s| s.fetched_at)
}
