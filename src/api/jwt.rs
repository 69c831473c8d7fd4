//! JWT token signing and validation.
//!
//! Two token kinds, each signed with its own secret and TTL: short-lived
//! access tokens carrying the user's profile claims, and long-lived refresh
//! tokens carrying only the user id.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

use crate::database::models::UserDbModel;

/// Access token claims.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessClaims {
    /// User ID (subject)
    pub sub: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    /// Expiration timestamp (Unix)
    pub exp: u64,
    /// Issued at timestamp (Unix)
    pub iat: u64,
}

/// Refresh token claims. Carries only the user id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshClaims {
    /// User ID (subject)
    pub sub: String,
    /// Expiration timestamp (Unix)
    pub exp: u64,
    /// Issued at timestamp (Unix)
    pub iat: u64,
}

/// JWT service error types.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Token generation failed: {0}")]
    TokenGeneration(String),
    #[error("Token validation failed: {0}")]
    TokenValidation(String),
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token")]
    InvalidToken,
}

/// JWT service for access and refresh token generation and validation.
#[derive(Clone)]
pub struct JwtService {
    access_encoding_key: EncodingKey,
    access_decoding_key: DecodingKey,
    refresh_encoding_key: EncodingKey,
    refresh_decoding_key: DecodingKey,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
}

impl JwtService {
    /// Create a new JWT service.
    ///
    /// # Arguments
    /// * `access_secret` - Signing secret for access tokens
    /// * `refresh_secret` - Signing secret for refresh tokens
    /// * `access_ttl_secs` - Access token lifetime in seconds
    /// * `refresh_ttl_secs` - Refresh token lifetime in seconds
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl_secs: u64,
        refresh_ttl_secs: u64,
    ) -> Self {
        Self {
            access_encoding_key: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding_key: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding_key: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding_key: DecodingKey::from_secret(refresh_secret.as_bytes()),
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    /// Create a new JWT service from environment variables.
    ///
    /// Requires `ACCESS_TOKEN_SECRET` and `REFRESH_TOKEN_SECRET`; returns
    /// `None` when either is missing.
    pub fn from_env(access_ttl_secs: u64, refresh_ttl_secs: u64) -> Option<Self> {
        let access_secret = std::env::var("ACCESS_TOKEN_SECRET").ok()?;
        let refresh_secret = std::env::var("REFRESH_TOKEN_SECRET").ok()?;

        info!(
            "JWT service initialized (access ttl: {}s, refresh ttl: {}s)",
            access_ttl_secs, refresh_ttl_secs
        );

        Some(Self::new(
            &access_secret,
            &refresh_secret,
            access_ttl_secs,
            refresh_ttl_secs,
        ))
    }

    fn now_secs() -> Result<u64, JwtError> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Generate an access token embedding the user's profile claims.
    pub fn generate_access_token(&self, user: &UserDbModel) -> Result<String, JwtError> {
        let now = Self::now_secs()?;

        let claims = AccessClaims {
            sub: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            exp: now + self.access_ttl_secs,
            iat: now,
        };

        encode(&Header::default(), &claims, &self.access_encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Generate a refresh token for a user id.
    pub fn generate_refresh_token(&self, user_id: &str) -> Result<String, JwtError> {
        let now = Self::now_secs()?;

        let claims = RefreshClaims {
            sub: user_id.to_string(),
            exp: now + self.refresh_ttl_secs,
            iat: now,
        };

        encode(&Header::default(), &claims, &self.refresh_encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Validate an access token and extract its claims.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims, JwtError> {
        Self::map_decode(decode::<AccessClaims>(
            token,
            &self.access_decoding_key,
            &Validation::default(),
        ))
    }

    /// Validate a refresh token and extract its claims.
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshClaims, JwtError> {
        Self::map_decode(decode::<RefreshClaims>(
            token,
            &self.refresh_decoding_key,
            &Validation::default(),
        ))
    }

    fn map_decode<T>(
        result: jsonwebtoken::errors::Result<jsonwebtoken::TokenData<T>>,
    ) -> Result<T, JwtError> {
        result.map(|data| data.claims).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            jsonwebtoken::errors::ErrorKind::InvalidToken
            | jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidToken,
            _ => JwtError::TokenValidation(e.to_string()),
        })
    }

    /// Access token lifetime in seconds.
    pub fn access_ttl_secs(&self) -> u64 {
        self.access_ttl_secs
    }

    /// Refresh token lifetime in seconds.
    pub fn refresh_ttl_secs(&self) -> u64 {
        self.refresh_ttl_secs
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> UserDbModel {
        UserDbModel::new(
            "ada",
            "ada@example.com",
            "Ada Lovelace",
            "hash",
            "https://cdn.example.com/a.png",
            None,
        )
    }

    fn create_test_service() -> JwtService {
        JwtService::new(
            "access-secret-32-chars-long!!!!!",
            "refresh-secret-32-chars-long!!!!",
            3600,
            864000,
        )
    }

    #[test]
    fn test_generate_and_validate_access_token() {
        let service = create_test_service();
        let user = test_user();

        let token = service
            .generate_access_token(&user)
            .expect("Token generation should succeed");
        let claims = service
            .validate_access_token(&token)
            .expect("Token validation should succeed");

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "ada");
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.full_name, "Ada Lovelace");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_generate_and_validate_refresh_token() {
        let service = create_test_service();

        let token = service
            .generate_refresh_token("user-123")
            .expect("Token generation should succeed");
        let claims = service
            .validate_refresh_token(&token)
            .expect("Token validation should succeed");

        assert_eq!(claims.sub, "user-123");
    }

    #[test]
    fn test_access_token_does_not_verify_as_refresh() {
        // Different secrets per kind: an access token must not pass refresh
        // validation even though both are HS256 JWTs.
        let service = create_test_service();
        let user = test_user();

        let token = service.generate_access_token(&user).unwrap();
        assert!(service.validate_refresh_token(&token).is_err());
    }

    #[test]
    fn test_invalid_token() {
        let service = create_test_service();
        let result = service.validate_access_token("invalid.token.here");

        assert!(matches!(
            result,
            Err(JwtError::InvalidToken) | Err(JwtError::TokenValidation(_))
        ));
    }

    #[test]
    fn test_wrong_secret() {
        let service1 = JwtService::new("secret-one-32-chars-long!!!!!!!!", "r1", 3600, 864000);
        let service2 = JwtService::new("secret-two-32-chars-long!!!!!!!!", "r2", 3600, 864000);

        let token = service1.generate_access_token(&test_user()).unwrap();
        assert!(matches!(
            service2.validate_access_token(&token),
            Err(JwtError::InvalidToken)
        ));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_refresh_token_round_trips_user_id(
            user_id in "[a-zA-Z0-9_-]{1,50}",
        ) {
            let service = JwtService::new(
                "access-secret-32-chars-long!!!!!",
                "refresh-secret-32-chars-long!!!!",
                3600,
                864000,
            );

            let token = service
                .generate_refresh_token(&user_id)
                .expect("Token generation should succeed");
            let claims = service
                .validate_refresh_token(&token)
                .expect("Token validation should succeed");

            prop_assert_eq!(&claims.sub, &user_id);
            prop_assert!(claims.exp > claims.iat);
        }

        #[test]
        fn prop_tampered_token_rejected(
            user_id in "[a-zA-Z0-9_-]{1,50}",
            tamper_pos in 10usize..50usize,
        ) {
            let service = JwtService::new(
                "access-secret-32-chars-long!!!!!",
                "refresh-secret-32-chars-long!!!!",
                3600,
                864000,
            );

            let token = service.generate_refresh_token(&user_id).unwrap();
            let mut chars: Vec<char> = token.chars().collect();
            if tamper_pos < chars.len() {
                let replacement = if chars[tamper_pos] == 'X' { 'Y' } else { 'X' };
                chars[tamper_pos] = replacement;
            }
            let tampered: String = chars.into_iter().collect();

            if tampered != token {
                prop_assert!(service.validate_refresh_token(&tampered).is_err());
            }
        }
    }
}
