//! Channel profiles, subscriptions, and watch history.

use std::sync::Arc;

use tracing::{debug, info};

use crate::database::models::SubscriptionDbModel;
use crate::database::repositories::{
    ChannelProfileRow, SubscriptionRepository, UserRepository, VideoRepository, WatchHistoryRow,
};

use super::error::ApiError;

/// Profile operation errors.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Username is required")]
    MissingUsername,

    #[error("Channel does not exist")]
    ChannelNotFound,

    #[error("Video not found")]
    VideoNotFound,

    #[error("Cannot subscribe to yourself")]
    SelfSubscription,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::MissingUsername => ApiError::bad_request("Username is required"),
            ProfileError::ChannelNotFound => ApiError::not_found("Channel does not exist"),
            ProfileError::VideoNotFound => ApiError::not_found("Video not found"),
            ProfileError::SelfSubscription => ApiError::bad_request("Cannot subscribe to yourself"),
            ProfileError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                ApiError::internal("Database error occurred")
            }
        }
    }
}

/// Profile service.
pub struct ProfileService {
    user_repo: Arc<dyn UserRepository>,
    subscription_repo: Arc<dyn SubscriptionRepository>,
    video_repo: Arc<dyn VideoRepository>,
}

impl ProfileService {
    /// Create a new ProfileService.
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        subscription_repo: Arc<dyn SubscriptionRepository>,
        video_repo: Arc<dyn VideoRepository>,
    ) -> Self {
        Self {
            user_repo,
            subscription_repo,
            video_repo,
        }
    }

    /// Resolve a channel profile by username, as seen by `viewer_id`.
    ///
    /// Username lookup is case-insensitive (usernames are stored lowercased).
    pub async fn channel_profile(
        &self,
        viewer_id: &str,
        username: &str,
    ) -> Result<ChannelProfileRow, ProfileError> {
        let username = username.trim().to_lowercase();
        if username.is_empty() {
            return Err(ProfileError::MissingUsername);
        }

        debug!(viewer_id = %viewer_id, username = %username, "Channel profile lookup");

        self.subscription_repo
            .channel_profile(viewer_id, &username)
            .await
            .map_err(|e| ProfileError::Database(e.to_string()))?
            .ok_or(ProfileError::ChannelNotFound)
    }

    /// The user's watch history in the order the videos were watched.
    pub async fn watch_history(&self, user_id: &str) -> Result<Vec<WatchHistoryRow>, ProfileError> {
        self.video_repo
            .watch_history(user_id)
            .await
            .map_err(|e| ProfileError::Database(e.to_string()))
    }

    /// Record that the user watched a video, appending to their history.
    pub async fn record_watch(&self, user_id: &str, video_id: &str) -> Result<(), ProfileError> {
        self.video_repo
            .find_by_id(video_id)
            .await
            .map_err(|e| ProfileError::Database(e.to_string()))?
            .ok_or(ProfileError::VideoNotFound)?;

        self.video_repo
            .append_watch(user_id, video_id)
            .await
            .map_err(|e| ProfileError::Database(e.to_string()))?;

        debug!(user_id = %user_id, video_id = %video_id, "Watch recorded");
        Ok(())
    }

    /// Subscribe the user to a channel. Subscribing twice is a no-op.
    pub async fn subscribe(
        &self,
        subscriber_id: &str,
        channel_username: &str,
    ) -> Result<(), ProfileError> {
        let channel = self
            .user_repo
            .find_by_username(&channel_username.trim().to_lowercase())
            .await
            .map_err(|e| ProfileError::Database(e.to_string()))?
            .ok_or(ProfileError::ChannelNotFound)?;

        if channel.id == subscriber_id {
            return Err(ProfileError::SelfSubscription);
        }

        let created = self
            .subscription_repo
            .create(&SubscriptionDbModel::new(subscriber_id, &channel.id))
            .await
            .map_err(|e| ProfileError::Database(e.to_string()))?;

        if created {
            info!(
                subscriber_id = %subscriber_id,
                channel_id = %channel.id,
                "Subscription created"
            );
        }
        Ok(())
    }

    /// Unsubscribe the user from a channel. Unsubscribing when not
    /// subscribed is a no-op.
    pub async fn unsubscribe(
        &self,
        subscriber_id: &str,
        channel_username: &str,
    ) -> Result<(), ProfileError> {
        let channel = self
            .user_repo
            .find_by_username(&channel_username.trim().to_lowercase())
            .await
            .map_err(|e| ProfileError::Database(e.to_string()))?
            .ok_or(ProfileError::ChannelNotFound)?;

        let removed = self
            .subscription_repo
            .delete(subscriber_id, &channel.id)
            .await
            .map_err(|e| ProfileError::Database(e.to_string()))?;

        if removed {
            info!(
                subscriber_id = %subscriber_id,
                channel_id = %channel.id,
                "Subscription removed"
            );
        }
        Ok(())
    }
}
