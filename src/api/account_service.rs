//! Account lifecycle: registration, profile reads, and profile updates.

use std::sync::Arc;

use tracing::{info, warn};

use crate::database::models::UserDbModel;
use crate::database::repositories::UserRepository;
use crate::media::{MediaStore, UploadedFile};

use super::auth_service::AuthService;
use super::error::ApiError;

/// Account operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("User with this username or email already exists")]
    AlreadyExists,

    #[error("Email is already in use")]
    EmailInUse,

    #[error("Avatar file is required")]
    AvatarRequired,

    #[error("Error while uploading {0}")]
    UploadFailed(&'static str),

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::MissingField(_) | AccountError::AvatarRequired => {
                ApiError::bad_request(err.to_string())
            }
            AccountError::AlreadyExists | AccountError::EmailInUse => {
                ApiError::conflict(err.to_string())
            }
            AccountError::UploadFailed(_) => ApiError::bad_request(err.to_string()),
            AccountError::UserNotFound => ApiError::not_found("User not found"),
            AccountError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                ApiError::internal("Database error occurred")
            }
            AccountError::Internal(msg) => {
                tracing::error!("Internal account error: {}", msg);
                ApiError::internal("An unexpected error occurred")
            }
        }
    }
}

/// Registration input, already extracted from the multipart form.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
}

/// Account service.
pub struct AccountService {
    user_repo: Arc<dyn UserRepository>,
    media_store: Arc<dyn MediaStore>,
}

impl AccountService {
    /// Create a new AccountService.
    pub fn new(user_repo: Arc<dyn UserRepository>, media_store: Arc<dyn MediaStore>) -> Self {
        Self {
            user_repo,
            media_store,
        }
    }

    fn require<'a>(value: &'a str, field: &'static str) -> Result<&'a str, AccountError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AccountError::MissingField(field));
        }
        Ok(trimmed)
    }

    /// Register a new account.
    ///
    /// The avatar upload is mandatory; a cover image is optional and a failed
    /// cover upload downgrades to "no cover" rather than failing the whole
    /// registration.
    pub async fn register(
        &self,
        input: RegisterInput,
        avatar: Option<UploadedFile>,
        cover_image: Option<UploadedFile>,
    ) -> Result<UserDbModel, AccountError> {
        let username = Self::require(&input.username, "username")?;
        let email = Self::require(&input.email, "email")?;
        let full_name = Self::require(&input.full_name, "fullName")?;
        let password = Self::require(&input.password, "password")?;

        let existing = self
            .user_repo
            .find_by_username_or_email(Some(username), Some(email))
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;
        if existing.is_some() {
            warn!(username = %username, "Registration rejected: account exists");
            return Err(AccountError::AlreadyExists);
        }

        let avatar = avatar.ok_or(AccountError::AvatarRequired)?;
        let avatar_url = self
            .media_store
            .store(&avatar)
            .await
            .map_err(|e| AccountError::Internal(e.to_string()))?
            .ok_or(AccountError::UploadFailed("avatar"))?;

        let cover_image_url = match cover_image {
            Some(file) => self.media_store.store(&file).await.unwrap_or(None),
            None => None,
        };

        let password_hash = AuthService::hash_password(password)
            .map_err(|e| AccountError::Internal(e.to_string()))?;

        let user = UserDbModel::new(
            username,
            email,
            full_name,
            password_hash,
            avatar_url,
            cover_image_url,
        );
        self.user_repo
            .create(&user)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        info!(user_id = %user.id, username = %user.username, "User registered");

        // Re-read so the caller gets exactly what was stored.
        self.user_repo
            .find_by_id(&user.id)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?
            .ok_or(AccountError::UserNotFound)
    }

    /// Fetch the current user's account.
    pub async fn current_user(&self, user_id: &str) -> Result<UserDbModel, AccountError> {
        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?
            .ok_or(AccountError::UserNotFound)
    }

    /// Update the full name and email. Both fields are required.
    pub async fn update_account(
        &self,
        user_id: &str,
        full_name: &str,
        email: &str,
    ) -> Result<UserDbModel, AccountError> {
        let full_name = Self::require(full_name, "fullName")?;
        let email = Self::require(email, "email")?;

        // The email column is unique; surface a conflict instead of a raw
        // constraint violation.
        if let Some(other) = self
            .user_repo
            .find_by_email(email)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?
            && other.id != user_id
        {
            return Err(AccountError::EmailInUse);
        }

        self.user_repo
            .update_profile(user_id, full_name, email)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        info!(user_id = %user_id, "Account details updated");

        self.current_user(user_id).await
    }

    /// Replace the avatar with a newly uploaded file.
    pub async fn update_avatar(
        &self,
        user_id: &str,
        file: Option<UploadedFile>,
    ) -> Result<UserDbModel, AccountError> {
        let file = file.ok_or(AccountError::AvatarRequired)?;
        let url = self
            .media_store
            .store(&file)
            .await
            .map_err(|e| AccountError::Internal(e.to_string()))?
            .ok_or(AccountError::UploadFailed("avatar"))?;

        self.user_repo
            .update_avatar(user_id, &url)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        info!(user_id = %user_id, "Avatar updated");

        self.current_user(user_id).await
    }

    /// Replace the cover image with a newly uploaded file.
    pub async fn update_cover_image(
        &self,
        user_id: &str,
        file: Option<UploadedFile>,
    ) -> Result<UserDbModel, AccountError> {
        let file = file.ok_or(AccountError::MissingField("coverImage"))?;
        let url = self
            .media_store
            .store(&file)
            .await
            .map_err(|e| AccountError::Internal(e.to_string()))?
            .ok_or(AccountError::UploadFailed("cover image"))?;

        self.user_repo
            .update_cover_image(user_id, &url)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        info!(user_id = %user_id, "Cover image updated");

        self.current_user(user_id).await
    }
}
