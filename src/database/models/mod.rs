//! Database models.

pub mod subscription;
pub mod user;
pub mod video;

pub use subscription::SubscriptionDbModel;
pub use user::UserDbModel;
pub use video::VideoDbModel;
