//! Video and watch-history database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Video database model.
///
/// Only the shape needed by the watch-history read model; video upload and
/// processing live elsewhere.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct VideoDbModel {
    /// Unique identifier (UUID)
    pub id: String,
    /// Owning user
    pub owner_id: String,
    pub title: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub duration_secs: i64,
    pub views: i64,
    /// Unix epoch milliseconds (UTC) when the video was created.
    pub created_at: i64,
}

impl VideoDbModel {
    /// Create a new video record.
    pub fn new(
        owner_id: impl Into<String>,
        title: impl Into<String>,
        video_url: impl Into<String>,
        thumbnail_url: Option<String>,
        duration_secs: i64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            title: title.into(),
            video_url: video_url.into(),
            thumbnail_url,
            duration_secs,
            views: 0,
            created_at: crate::database::time::now_ms(),
        }
    }
}
