//! User database model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User database model.
///
/// Represents a user account. The `refresh_token` column holds either NULL
/// or exactly the most recently issued refresh token for the user; older
/// tokens are implicitly invalidated when it is overwritten.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserDbModel {
    /// Unique identifier (UUID)
    pub id: String,
    /// Unique username, stored lowercased
    pub username: String,
    /// Unique email address
    pub email: String,
    /// Display name
    pub full_name: String,
    /// Argon2id password hash
    pub password_hash: String,
    /// Avatar image URL (required)
    pub avatar_url: String,
    /// Cover image URL (optional)
    pub cover_image_url: Option<String>,
    /// Currently valid refresh token (None when logged out)
    pub refresh_token: Option<String>,
    /// Unix epoch milliseconds (UTC) when the user was created.
    pub created_at: i64,
    /// Unix epoch milliseconds (UTC) when the user was last updated.
    pub updated_at: i64,
}

impl UserDbModel {
    /// Create a new user. The username is lowercased here so every stored
    /// user satisfies the lowercase invariant regardless of caller input.
    /// Note: password must be hashed before calling this.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        full_name: impl Into<String>,
        password_hash: impl Into<String>,
        avatar_url: impl Into<String>,
        cover_image_url: Option<String>,
    ) -> Self {
        let now = crate::database::time::now_ms();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.into().to_lowercase(),
            email: email.into(),
            full_name: full_name.into(),
            password_hash: password_hash.into(),
            avatar_url: avatar_url.into(),
            cover_image_url,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }
}
