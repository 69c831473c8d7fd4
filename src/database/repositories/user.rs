//! User repository for database operations.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::Result;
use crate::database::models::UserDbModel;

/// User repository trait for user data access operations.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user in the database.
    async fn create(&self, user: &UserDbModel) -> Result<()>;

    /// Find a user by their unique ID.
    async fn find_by_id(&self, id: &str) -> Result<Option<UserDbModel>>;

    /// Find a user by their username (usernames are stored lowercased).
    async fn find_by_username(&self, username: &str) -> Result<Option<UserDbModel>>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserDbModel>>;

    /// Find a user matching either identifier. Both are optional; a None or
    /// blank identifier never matches.
    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<UserDbModel>>;

    /// Replace the stored refresh token with a single-field atomic update.
    /// `None` clears it (logout / revoke).
    async fn update_refresh_token(&self, id: &str, token: Option<&str>) -> Result<()>;

    /// Update a user's password hash.
    async fn update_password(&self, id: &str, password_hash: &str) -> Result<()>;

    /// Update full name and email.
    async fn update_profile(&self, id: &str, full_name: &str, email: &str) -> Result<()>;

    /// Update the avatar URL.
    async fn update_avatar(&self, id: &str, avatar_url: &str) -> Result<()>;

    /// Update the cover image URL.
    async fn update_cover_image(&self, id: &str, cover_image_url: &str) -> Result<()>;
}

/// SQLx implementation of UserRepository.
pub struct SqlxUserRepository {
    pool: SqlitePool,
}

impl SqlxUserRepository {
    /// Create a new SqlxUserRepository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &UserDbModel) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, email, full_name, password_hash, avatar_url,
                cover_image_url, refresh_token, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(&user.avatar_url)
        .bind(&user.cover_image_url)
        .bind(&user.refresh_token)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserDbModel>> {
        let user = sqlx::query_as::<_, UserDbModel>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserDbModel>> {
        let user = sqlx::query_as::<_, UserDbModel>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserDbModel>> {
        let user = sqlx::query_as::<_, UserDbModel>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<UserDbModel>> {
        let username = username.map(str::trim).filter(|s| !s.is_empty());
        let email = email.map(str::trim).filter(|s| !s.is_empty());

        let user = sqlx::query_as::<_, UserDbModel>(
            r#"
            SELECT * FROM users
            WHERE (?1 IS NOT NULL AND username = ?1)
               OR (?2 IS NOT NULL AND email = ?2)
            LIMIT 1
            "#,
        )
        .bind(username.map(|u| u.to_lowercase()))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_refresh_token(&self, id: &str, token: Option<&str>) -> Result<()> {
        sqlx::query("UPDATE users SET refresh_token = ?, updated_at = ? WHERE id = ?")
            .bind(token)
            .bind(crate::database::time::now_ms())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_password(&self, id: &str, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(crate::database::time::now_ms())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_profile(&self, id: &str, full_name: &str, email: &str) -> Result<()> {
        sqlx::query("UPDATE users SET full_name = ?, email = ?, updated_at = ? WHERE id = ?")
            .bind(full_name)
            .bind(email)
            .bind(crate::database::time::now_ms())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_avatar(&self, id: &str, avatar_url: &str) -> Result<()> {
        sqlx::query("UPDATE users SET avatar_url = ?, updated_at = ? WHERE id = ?")
            .bind(avatar_url)
            .bind(crate::database::time::now_ms())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_cover_image(&self, id: &str, cover_image_url: &str) -> Result<()> {
        sqlx::query("UPDATE users SET cover_image_url = ?, updated_at = ? WHERE id = ?")
            .bind(cover_image_url)
            .bind(crate::database::time::now_ms())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
