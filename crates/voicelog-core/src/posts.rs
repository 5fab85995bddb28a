use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

/// Topic recorded when the logging form leaves it blank.
pub const UNTITLED_TOPIC: &str = "Untitled";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    Image,
    Video,
    CarouselAlbum,
    Reels,
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Image => write!(f, "IMAGE"),
            MediaType::Video => write!(f, "VIDEO"),
            MediaType::CarouselAlbum => write!(f, "CAROUSEL_ALBUM"),
            MediaType::Reels => write!(f, "REELS"),
        }
    }
}

/// Link between a logged post and its published counterpart on the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishLink {
    pub external_media_id: String,
    pub permalink: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub media_type: Option<MediaType>,
}

/// One logged draft/final pair.
///
/// Serialized flat, in the shape the persistence layer materializes rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    #[serde(default = "untitled")]
    pub topic: String,
    pub draft_text: String,
    pub final_text: String,
    #[serde(default)]
    pub edit_count: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub external_media_id: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
    #[serde(default)]
    pub media_type: Option<MediaType>,
}

fn untitled() -> String {
    UNTITLED_TOPIC.to_string()
}

impl Post {
    /// Create a new, unpublished post.
    ///
    /// A blank `topic` is recorded as [`UNTITLED_TOPIC`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyText`] if either text is empty or whitespace-only.
    pub fn new(
        topic: &str,
        draft_text: impl Into<String>,
        final_text: impl Into<String>,
        edit_count: u32,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        let draft_text = draft_text.into();
        let final_text = final_text.into();

        if draft_text.trim().is_empty() {
            return Err(CoreError::EmptyText { field: "draftText" });
        }
        if final_text.trim().is_empty() {
            return Err(CoreError::EmptyText { field: "finalText" });
        }

        let topic = if topic.trim().is_empty() {
            untitled()
        } else {
            topic.trim().to_string()
        };

        Ok(Self {
            id: Uuid::new_v4(),
            topic,
            draft_text,
            final_text,
            edit_count,
            created_at,
            published_at: None,
            external_media_id: None,
            permalink: None,
            media_type: None,
        })
    }

    /// Check the creation invariant on a post that arrived from outside
    /// [`Post::new`] (e.g. deserialized from a collaborator).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyText`] naming the offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.draft_text.trim().is_empty() {
            return Err(CoreError::EmptyText { field: "draftText" });
        }
        if self.final_text.trim().is_empty() {
            return Err(CoreError::EmptyText { field: "finalText" });
        }
        Ok(())
    }

    #[must_use]
    pub fn is_published(&self) -> bool {
        self.external_media_id.is_some()
    }

    #[must_use]
    pub fn publish_link(&self) -> Option<PublishLink> {
        self.external_media_id
            .as_ref()
            .map(|external_media_id| PublishLink {
                external_media_id: external_media_id.clone(),
                permalink: self.permalink.clone(),
                published_at: self.published_at,
                media_type: self.media_type,
            })
    }

    /// Attach (or replace) the publish link. Texts are left untouched.
    pub fn attach_publish_link(&mut self, link: PublishLink) {
        self.external_media_id = Some(link.external_media_id);
        self.permalink = link.permalink;
        self.published_at = link.published_at;
        self.media_type = link.media_type;
    }

    /// Detach the publish link, returning it if one was attached.
    pub fn detach_publish_link(&mut self) -> Option<PublishLink> {
        let link = self.publish_link();
        self.external_media_id = None;
        self.permalink = None;
        self.published_at = None;
        self.media_type = None;
        link
    }
}
