//! Sanitized API views of database rows.
//!
//! Everything serialized to clients is camelCase and never includes the
//! password hash or the stored refresh token.

use serde::Serialize;

use crate::database::models::UserDbModel;
use crate::database::repositories::{ChannelProfileRow, WatchHistoryRow};

/// Public view of a user account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&UserDbModel> for UserView {
    fn from(user: &UserDbModel) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            avatar: user.avatar_url.clone(),
            cover_image: user.cover_image_url.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Channel profile with subscription counts, as seen by a specific viewer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfileView {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub avatar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub subscribers_count: i64,
    pub channels_subscribed_to_count: i64,
    pub is_subscribed: bool,
}

impl From<ChannelProfileRow> for ChannelProfileView {
    fn from(row: ChannelProfileRow) -> Self {
        Self {
            full_name: row.full_name,
            username: row.username,
            email: row.email,
            avatar: row.avatar_url,
            cover_image: row.cover_image_url,
            subscribers_count: row.subscribers_count,
            channels_subscribed_to_count: row.subscribed_to_count,
            is_subscribed: row.is_subscribed,
        }
    }
}

/// Denormalized owner summary embedded in watch-history entries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummaryView {
    pub full_name: String,
    pub username: String,
    pub avatar: String,
}

/// One watch-history entry: the video plus its owner's summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchVideoView {
    pub id: String,
    pub title: String,
    pub video_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub duration: i64,
    pub views: i64,
    pub owner: OwnerSummaryView,
    pub watched_at: i64,
}

impl From<WatchHistoryRow> for WatchVideoView {
    fn from(row: WatchHistoryRow) -> Self {
        Self {
            id: row.video_id,
            title: row.title,
            video_file: row.video_url,
            thumbnail: row.thumbnail_url,
            duration: row.duration_secs,
            views: row.views,
            owner: OwnerSummaryView {
                full_name: row.owner_full_name,
                username: row.owner_username,
                avatar: row.owner_avatar_url,
            },
            watched_at: row.watched_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_view_omits_credentials() {
        let mut user = UserDbModel::new(
            "Ada",
            "ada@example.com",
            "Ada Lovelace",
            "secret-hash",
            "https://cdn.example.com/a.png",
            None,
        );
        user.refresh_token = Some("stored-refresh".to_string());

        let view = UserView::from(&user);
        let json = serde_json::to_string(&view).unwrap();

        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("stored-refresh"));
        assert!(json.contains("\"username\":\"ada\""));
        assert!(json.contains("\"fullName\":\"Ada Lovelace\""));
    }

    #[test]
    fn test_channel_profile_view_camel_case() {
        let view = ChannelProfileView::from(ChannelProfileRow {
            full_name: "Ada Lovelace".to_string(),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            avatar_url: "a.png".to_string(),
            cover_image_url: None,
            subscribers_count: 3,
            subscribed_to_count: 1,
            is_subscribed: true,
        });
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["subscribersCount"], 3);
        assert_eq!(json["channelsSubscribedToCount"], 1);
        assert_eq!(json["isSubscribed"], true);
        assert!(json.get("coverImage").is_none());
    }
}
