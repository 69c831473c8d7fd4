//! Subscription repository and the channel-profile aggregation.

use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};

use crate::Result;
use crate::database::models::SubscriptionDbModel;

/// Channel-profile projection: a user joined with its subscription counts
/// and the viewer's subscription status.
#[derive(Debug, Clone, FromRow)]
pub struct ChannelProfileRow {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    pub subscribers_count: i64,
    pub subscribed_to_count: i64,
    pub is_subscribed: bool,
}

/// Subscription repository trait.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a subscription edge. Returns false when the edge already
    /// exists (duplicate subscribe is a no-op).
    async fn create(&self, subscription: &SubscriptionDbModel) -> Result<bool>;

    /// Delete a subscription edge. Returns false when no edge existed.
    async fn delete(&self, subscriber_id: &str, channel_id: &str) -> Result<bool>;

    /// Resolve a channel profile by lowercased username, with subscriber /
    /// subscribed-to counts and the viewer's subscription status computed in
    /// a single aggregation.
    async fn channel_profile(
        &self,
        viewer_id: &str,
        username: &str,
    ) -> Result<Option<ChannelProfileRow>>;
}

/// SQLx implementation of SubscriptionRepository.
pub struct SqlxSubscriptionRepository {
    pool: SqlitePool,
}

impl SqlxSubscriptionRepository {
    /// Create a new SqlxSubscriptionRepository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SqlxSubscriptionRepository {
    async fn create(&self, subscription: &SubscriptionDbModel) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO subscriptions (id, subscriber_id, channel_id, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&subscription.id)
        .bind(&subscription.subscriber_id)
        .bind(&subscription.channel_id)
        .bind(subscription.created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, subscriber_id: &str, channel_id: &str) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM subscriptions WHERE subscriber_id = ? AND channel_id = ?")
                .bind(subscriber_id)
                .bind(channel_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn channel_profile(
        &self,
        viewer_id: &str,
        username: &str,
    ) -> Result<Option<ChannelProfileRow>> {
        let row = sqlx::query_as::<_, ChannelProfileRow>(
            r#"
            SELECT
                u.full_name,
                u.username,
                u.email,
                u.avatar_url,
                u.cover_image_url,
                (SELECT COUNT(*) FROM subscriptions s WHERE s.channel_id = u.id)
                    AS subscribers_count,
                (SELECT COUNT(*) FROM subscriptions s WHERE s.subscriber_id = u.id)
                    AS subscribed_to_count,
                EXISTS(
                    SELECT 1 FROM subscriptions s
                    WHERE s.channel_id = u.id AND s.subscriber_id = ?
                ) AS is_subscribed
            FROM users u
            WHERE u.username = ?
            "#,
        )
        .bind(viewer_id)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
