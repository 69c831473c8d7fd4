//! mediahub — user-account backend for a media-sharing application.
//!
//! Provides registration, login/logout with JWT access/refresh token
//! rotation, password and profile management, and the channel-profile and
//! watch-history read models.

pub mod api;
pub mod database;
pub mod error;
pub mod media;

pub use error::{Error, Result};
