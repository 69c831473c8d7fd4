//! Authentication service for login, token rotation, and password operations.
//!
//! Token model: each user holds at most one live refresh token, stored on
//! the user row. Issuing a new pair overwrites it, logout clears it, and a
//! presented refresh token must equal the stored one exactly. A valid token
//! that no longer matches is treated as reuse and revokes the stored token.

use std::sync::Arc;

use argon2::{
    Argon2, Params,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::{debug, info, warn};

use crate::database::models::UserDbModel;
use crate::database::repositories::UserRepository;

use super::error::ApiError;
use super::jwt::JwtService;

/// Authentication configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Access token expiration in seconds (default: 86400 = 1 day)
    pub access_token_expiration_secs: u64,
    /// Refresh token expiration in seconds (default: 864000 = 10 days)
    pub refresh_token_expiration_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_expiration_secs: 86400,    // 1 day
            refresh_token_expiration_secs: 864000,  // 10 days
        }
    }
}

impl AuthConfig {
    /// Create AuthConfig from environment variables.
    ///
    /// Environment variables:
    /// - `ACCESS_TOKEN_EXPIRATION_SECS`: Access token expiration in seconds (default: 86400)
    /// - `REFRESH_TOKEN_EXPIRATION_SECS`: Refresh token expiration in seconds (default: 864000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let access_token_expiration_secs = std::env::var("ACCESS_TOKEN_EXPIRATION_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.access_token_expiration_secs);

        let refresh_token_expiration_secs = std::env::var("REFRESH_TOKEN_EXPIRATION_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.refresh_token_expiration_secs);

        Self {
            access_token_expiration_secs,
            refresh_token_expiration_secs,
        }
    }
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Username or email is required")]
    MissingIdentifier,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Refresh token is expired or already used")]
    TokenReused,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Current password is incorrect")]
    IncorrectCurrentPassword,

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::unauthorized("Invalid credentials"),
            AuthError::MissingIdentifier => ApiError::bad_request("Username or email is required"),
            AuthError::TokenExpired => ApiError::unauthorized("Token has expired"),
            AuthError::TokenReused => {
                ApiError::unauthorized("Refresh token is expired or already used")
            }
            AuthError::InvalidToken => ApiError::unauthorized("Invalid token"),
            AuthError::IncorrectCurrentPassword => {
                ApiError::unauthorized("Current password is incorrect")
            }
            AuthError::UserNotFound => ApiError::not_found("User not found"),
            AuthError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                ApiError::internal("Database error occurred")
            }
            AuthError::Internal(msg) => {
                tracing::error!("Internal auth error: {}", msg);
                ApiError::internal("An unexpected error occurred")
            }
        }
    }
}

/// Token pair returned on successful login or refresh.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    /// JWT access token
    pub access_token: String,
    /// JWT refresh token
    pub refresh_token: String,
    /// Access token expiration in seconds
    pub expires_in: u64,
    /// Refresh token expiration in seconds
    pub refresh_expires_in: u64,
}

/// Authentication service.
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    jwt_service: Arc<JwtService>,
    config: AuthConfig,
}

impl AuthService {
    /// Create a new AuthService.
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        jwt_service: Arc<JwtService>,
        config: AuthConfig,
    ) -> Self {
        Self {
            user_repo,
            jwt_service,
            config,
        }
    }

    /// Hash a password using Argon2id with OWASP recommended parameters.
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        // OWASP recommended parameters: m=19456 (19 MiB), t=2, p=1
        let params = Params::new(19456, 2, 1, None)
            .map_err(|e| AuthError::Internal(format!("Invalid Argon2 params: {}", e)))?;
        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a stored hash.
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash format: {}", e)))?;

        // Default Argon2 for verification (it reads params from the hash)
        let argon2 = Argon2::default();
        Ok(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Generate an access/refresh pair for the user and persist the refresh
    /// token on the user row, replacing whatever was stored before.
    pub async fn issue_token_pair(&self, user: &UserDbModel) -> Result<AuthTokens, AuthError> {
        let access_token = self
            .jwt_service
            .generate_access_token(user)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        let refresh_token = self
            .jwt_service
            .generate_refresh_token(&user.id)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        self.user_repo
            .update_refresh_token(&user.id, Some(&refresh_token))
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            expires_in: self.config.access_token_expiration_secs,
            refresh_expires_in: self.config.refresh_token_expiration_secs,
        })
    }

    /// Authenticate a user by username or email plus password.
    ///
    /// Either identifier is sufficient; a match on one of them counts.
    pub async fn authenticate(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        password: &str,
    ) -> Result<(UserDbModel, AuthTokens), AuthError> {
        let has_username = username.is_some_and(|u| !u.trim().is_empty());
        let has_email = email.is_some_and(|e| !e.trim().is_empty());
        if !has_username && !has_email {
            return Err(AuthError::MissingIdentifier);
        }

        debug!(username = ?username, email = ?email, "Login attempt");

        let user = self
            .user_repo
            .find_by_username_or_email(username, email)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?
            .ok_or(AuthError::UserNotFound)?;

        if !Self::verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login failed: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.issue_token_pair(&user).await?;

        info!(user_id = %user.id, username = %user.username, "Login successful");

        Ok((user, tokens))
    }

    /// Rotate tokens using a presented refresh token.
    ///
    /// The token must be a valid refresh JWT AND byte-equal to the one stored
    /// on the user row. A valid-but-stale token means an older token is being
    /// replayed after rotation; the stored token is revoked so the session
    /// chain dies.
    pub async fn refresh_tokens(
        &self,
        presented: &str,
    ) -> Result<(UserDbModel, AuthTokens), AuthError> {
        let presented = presented.trim();
        if presented.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let claims = self
            .jwt_service
            .validate_refresh_token(presented)
            .map_err(|e| match e {
                super::jwt::JwtError::TokenExpired => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })?;

        let user = self
            .user_repo
            .find_by_id(&claims.sub)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?
            .ok_or(AuthError::InvalidToken)?;

        match user.refresh_token.as_deref() {
            Some(stored) if stored == presented => {}
            _ => {
                warn!(
                    user_id = %user.id,
                    "Stale refresh token presented (possible reuse); revoking stored token"
                );
                self.user_repo
                    .update_refresh_token(&user.id, None)
                    .await
                    .map_err(|e| AuthError::Database(e.to_string()))?;
                return Err(AuthError::TokenReused);
            }
        }

        let tokens = self.issue_token_pair(&user).await?;

        debug!(user_id = %user.id, "Refresh token rotated");

        Ok((user, tokens))
    }

    /// Log out a user by clearing the stored refresh token.
    pub async fn logout(&self, user_id: &str) -> Result<(), AuthError> {
        self.user_repo
            .update_refresh_token(user_id, None)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    /// Change a user's password after verifying the current one.
    ///
    /// Existing sessions keep their tokens; only the credential changes.
    pub async fn change_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?
            .ok_or(AuthError::UserNotFound)?;

        if !Self::verify_password(current_password, &user.password_hash)? {
            warn!(user_id = %user_id, "Password change failed: incorrect current password");
            return Err(AuthError::IncorrectCurrentPassword);
        }

        let new_hash = Self::hash_password(new_password)?;
        self.user_repo
            .update_password(user_id, &new_hash)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        info!(user_id = %user_id, "Password changed");
        Ok(())
    }
}
