//! The materialized snapshot handed to the analytics engine per request.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metrics::MetricSnapshot;
use crate::posts::Post;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Corpus {
    #[serde(default)]
    pub posts: Vec<Post>,
    /// All snapshots, each keyed to its post by `postId`.
    #[serde(default)]
    pub metrics: Vec<MetricSnapshot>,
}

impl Corpus {
    #[must_use]
    pub fn new(posts: Vec<Post>, metrics: Vec<MetricSnapshot>) -> Self {
        Self { posts, metrics }
    }

    /// Latest snapshot per post id.
    #[must_use]
    pub fn latest_snapshots(&self) -> HashMap<Uuid, &MetricSnapshot> {
        let mut latest: HashMap<Uuid, &MetricSnapshot> = HashMap::new();
        for snap in &self.metrics {
            latest
                .entry(snap.post_id)
                .and_modify(|current| {
                    if snap.fetched_at >= current.fetched_at {
                        *current = snap;
                    }
                })
                .or_insert(snap);
        }
        latest
    }

    #[must_use]
    pub fn post(&self, id: Uuid) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }
}
