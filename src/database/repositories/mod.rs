//! Repository traits and SQLx implementations.

pub mod subscription;
pub mod user;
pub mod video;

pub use subscription::{ChannelProfileRow, SqlxSubscriptionRepository, SubscriptionRepository};
pub use user::{SqlxUserRepository, UserRepository};
pub use video::{SqlxVideoRepository, VideoRepository, WatchHistoryRow};
