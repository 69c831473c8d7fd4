//! Video repository and the watch-history aggregation.

use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};

use crate::Result;
use crate::database::models::VideoDbModel;

/// Watch-history projection: one previously watched video joined with a
/// denormalized summary of its owner.
#[derive(Debug, Clone, FromRow)]
pub struct WatchHistoryRow {
    pub video_id: String,
    pub title: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub duration_secs: i64,
    pub views: i64,
    pub owner_full_name: String,
    pub owner_username: String,
    pub owner_avatar_url: String,
    pub position: i64,
    pub watched_at: i64,
}

/// Video repository trait.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Create a new video record.
    async fn create(&self, video: &VideoDbModel) -> Result<()>;

    /// Find a video by its ID.
    async fn find_by_id(&self, id: &str) -> Result<Option<VideoDbModel>>;

    /// Append a watch-history entry for the user, after any existing
    /// entries (next position).
    async fn append_watch(&self, user_id: &str, video_id: &str) -> Result<()>;

    /// The user's watch history in stored (append) order, each entry joined
    /// to its video and the video owner's summary.
    async fn watch_history(&self, user_id: &str) -> Result<Vec<WatchHistoryRow>>;
}

/// SQLx implementation of VideoRepository.
pub struct SqlxVideoRepository {
    pool: SqlitePool,
}

impl SqlxVideoRepository {
    /// Create a new SqlxVideoRepository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRepository for SqlxVideoRepository {
    async fn create(&self, video: &VideoDbModel) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO videos (
                id, owner_id, title, video_url, thumbnail_url,
                duration_secs, views, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&video.id)
        .bind(&video.owner_id)
        .bind(&video.title)
        .bind(&video.video_url)
        .bind(&video.thumbnail_url)
        .bind(video.duration_secs)
        .bind(video.views)
        .bind(video.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<VideoDbModel>> {
        let video = sqlx::query_as::<_, VideoDbModel>("SELECT * FROM videos WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(video)
    }

    async fn append_watch(&self, user_id: &str, video_id: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO watch_history (id, user_id, video_id, position, watched_at)
            VALUES (
                ?1,
                ?2,
                ?3,
                (SELECT COALESCE(MAX(position), 0) + 1 FROM watch_history WHERE user_id = ?2),
                ?4
            )
            "#,
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(video_id)
        .bind(crate::database::time::now_ms())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn watch_history(&self, user_id: &str) -> Result<Vec<WatchHistoryRow>> {
        let rows = sqlx::query_as::<_, WatchHistoryRow>(
            r#"
            SELECT
                w.video_id,
                v.title,
                v.video_url,
                v.thumbnail_url,
                v.duration_secs,
                v.views,
                o.full_name AS owner_full_name,
                o.username AS owner_username,
                o.avatar_url AS owner_avatar_url,
                w.position,
                w.watched_at
            FROM watch_history w
            JOIN videos v ON v.id = w.video_id
            JOIN users o ON o.id = v.owner_id
            WHERE w.user_id = ?
            ORDER BY w.position ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
