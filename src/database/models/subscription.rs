//! Subscription database model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Subscription edge: `subscriber` follows `channel` (both users).
///
/// (subscriber_id, channel_id) is unique at the schema level, so repeated
/// subscribes cannot create duplicate edges.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SubscriptionDbModel {
    /// Unique identifier (UUID)
    pub id: String,
    /// The user who subscribes
    pub subscriber_id: String,
    /// The user being subscribed to
    pub channel_id: String,
    /// Unix epoch milliseconds (UTC) when the edge was created.
    pub created_at: i64,
}

impl SubscriptionDbModel {
    /// Create a new subscription edge.
    pub fn new(subscriber_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            subscriber_id: subscriber_id.into(),
            channel_id: channel_id.into(),
            created_at: crate::database::time::now_ms(),
        }
    }
}
