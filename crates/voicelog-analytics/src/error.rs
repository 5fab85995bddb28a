use thiserror::Error;
use uuid::Uuid;

use voicelog_core::CoreError;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("{field} must be non-empty")]
    EmptyText { field: &'static str },

    #[error("post {post_id} violates the corpus contract: {reason}")]
    MalformedPost { post_id: Uuid, reason: String },

    #[error("post {0} not found in corpus")]
    UnknownPost(Uuid),

    #[error(transparent)]
    Core(#[from] CoreError),
}
