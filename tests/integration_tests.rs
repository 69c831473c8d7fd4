//! Integration tests for the mediahub persistence and service layers.
//!
//! These tests run against a real SQLite database (temp file) so the actual
//! schema, constraints, and aggregation queries are exercised.

use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use mediahub::Result;
use mediahub::api::account_service::{AccountError, AccountService, RegisterInput};
use mediahub::api::auth_service::{AuthConfig, AuthError, AuthService};
use mediahub::api::jwt::JwtService;
use mediahub::api::profile_service::{ProfileError, ProfileService};
use mediahub::database::models::VideoDbModel;
use mediahub::database::repositories::{
    SqlxSubscriptionRepository, SqlxUserRepository, SqlxVideoRepository, UserRepository,
    VideoRepository,
};
use mediahub::database::{DbPool, init_pool, run_migrations};
use mediahub::media::{MediaStore, UploadedFile};

/// Media store that records nothing on disk.
struct StubMediaStore;

#[async_trait]
impl MediaStore for StubMediaStore {
    async fn store(&self, file: &UploadedFile) -> Result<Option<String>> {
        if file.data.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!("/media/{}", file.filename)))
    }
}

/// Helper to create a test database pool with migrations applied.
///
/// The TempDir must be kept alive for the lifetime of the pool.
async fn setup_test_db() -> (TempDir, DbPool) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite:{}/test.db?mode=rwc", dir.path().display());

    let pool = init_pool(&url).await.expect("Failed to create test pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    (dir, pool)
}

struct TestApp {
    _dir: TempDir,
    pool: DbPool,
    user_repo: Arc<SqlxUserRepository>,
    auth_service: AuthService,
    account_service: AccountService,
    profile_service: ProfileService,
}

async fn setup_app() -> TestApp {
    let (dir, pool) = setup_test_db().await;

    let user_repo = Arc::new(SqlxUserRepository::new(pool.clone()));
    let subscription_repo = Arc::new(SqlxSubscriptionRepository::new(pool.clone()));
    let video_repo = Arc::new(SqlxVideoRepository::new(pool.clone()));

    let jwt_service = Arc::new(JwtService::new(
        "access-secret-32-chars-long!!!!!",
        "refresh-secret-32-chars-long!!!!",
        3600,
        864000,
    ));
    let auth_config = AuthConfig::default();

    TestApp {
        _dir: dir,
        pool: pool.clone(),
        user_repo: user_repo.clone(),
        auth_service: AuthService::new(user_repo.clone(), jwt_service, auth_config),
        account_service: AccountService::new(user_repo.clone(), Arc::new(StubMediaStore)),
        profile_service: ProfileService::new(user_repo, subscription_repo, video_repo),
    }
}

fn register_input(username: &str, email: &str) -> RegisterInput {
    RegisterInput {
        username: username.to_string(),
        email: email.to_string(),
        full_name: format!("{} Fullname", username),
        password: "password1".to_string(),
    }
}

fn avatar() -> Option<UploadedFile> {
    Some(UploadedFile {
        filename: "avatar.png".to_string(),
        data: vec![1, 2, 3],
    })
}

mod database_tests {
    use super::*;

    #[tokio::test]
    async fn test_database_migrations() {
        let (_dir, pool) = setup_test_db().await;

        let tables: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
                .fetch_all(&pool)
                .await
                .expect("Failed to query tables");

        let table_names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();

        assert!(table_names.contains(&"users"), "users table missing");
        assert!(
            table_names.contains(&"subscriptions"),
            "subscriptions table missing"
        );
        assert!(table_names.contains(&"videos"), "videos table missing");
        assert!(
            table_names.contains(&"watch_history"),
            "watch_history table missing"
        );
    }

    #[tokio::test]
    async fn test_wal_mode_enabled() {
        let (_dir, pool) = setup_test_db().await;

        let result: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .expect("Failed to query journal mode");

        assert_eq!(result.0, "wal");
    }
}

mod user_repository_tests {
    use super::*;

    #[tokio::test]
    async fn test_register_stores_lowercased_username() {
        let app = setup_app().await;

        let user = app
            .account_service
            .register(register_input("MiXeDCase", "mixed@example.com"), avatar(), None)
            .await
            .unwrap();

        assert_eq!(user.username, "mixedcase");
        assert_eq!(user.avatar_url, "/media/avatar.png");

        // Retrievable by any casing of the original input
        let found = app
            .user_repo
            .find_by_username_or_email(Some("MIXEDCASE"), None)
            .await
            .unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_find_by_username_or_email_either_field() {
        let app = setup_app().await;
        app.account_service
            .register(register_input("ada", "ada@example.com"), avatar(), None)
            .await
            .unwrap();

        let by_username = app
            .user_repo
            .find_by_username_or_email(Some("ada"), None)
            .await
            .unwrap();
        assert!(by_username.is_some());

        let by_email = app
            .user_repo
            .find_by_username_or_email(None, Some("ada@example.com"))
            .await
            .unwrap();
        assert!(by_email.is_some());

        // A blank identifier never matches anything
        let blank = app
            .user_repo
            .find_by_username_or_email(Some("  "), Some(""))
            .await
            .unwrap();
        assert!(blank.is_none());

        let neither = app
            .user_repo
            .find_by_username_or_email(Some("nobody"), Some("nobody@example.com"))
            .await
            .unwrap();
        assert!(neither.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let app = setup_app().await;
        app.account_service
            .register(register_input("ada", "ada@example.com"), avatar(), None)
            .await
            .unwrap();

        // Same username, different email
        let result = app
            .account_service
            .register(register_input("ADA", "other@example.com"), avatar(), None)
            .await;
        assert!(matches!(result, Err(AccountError::AlreadyExists)));

        // Same email, different username
        let result = app
            .account_service
            .register(register_input("grace", "ada@example.com"), avatar(), None)
            .await;
        assert!(matches!(result, Err(AccountError::AlreadyExists)));
    }
}

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_login_by_username_or_email() {
        let app = setup_app().await;
        app.account_service
            .register(register_input("ada", "ada@example.com"), avatar(), None)
            .await
            .unwrap();

        let (user, tokens) = app
            .auth_service
            .authenticate(Some("ada"), None, "password1")
            .await
            .unwrap();
        assert_eq!(user.username, "ada");
        assert!(!tokens.access_token.is_empty());

        let (user, _) = app
            .auth_service
            .authenticate(None, Some("ada@example.com"), "password1")
            .await
            .unwrap();
        assert_eq!(user.username, "ada");
    }

    #[tokio::test]
    async fn test_register_and_login_with_short_password() {
        // Passwords carry no strength policy; a four-character symbol
        // password registers and authenticates like any other.
        let app = setup_app().await;

        let mut input = register_input("Ada", "ada@example.com");
        input.password = "p@ss".to_string();
        let user = app
            .account_service
            .register(input, avatar(), None)
            .await
            .unwrap();
        assert_eq!(user.username, "ada");

        let (authed, _) = app
            .auth_service
            .authenticate(Some("ada"), None, "p@ss")
            .await
            .unwrap();
        assert_eq!(authed.id, user.id);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let app = setup_app().await;
        app.account_service
            .register(register_input("ada", "ada@example.com"), avatar(), None)
            .await
            .unwrap();

        let result = app
            .auth_service
            .authenticate(Some("ada"), None, "not-the-password")
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let app = setup_app().await;

        let result = app
            .auth_service
            .authenticate(Some("ghost"), None, "password1")
            .await;
        assert!(matches!(result, Err(AuthError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_refresh_rotation_and_reuse_detection() {
        let app = setup_app().await;
        let user = app
            .account_service
            .register(register_input("ada", "ada@example.com"), avatar(), None)
            .await
            .unwrap();

        let (_, first) = app
            .auth_service
            .authenticate(Some("ada"), None, "password1")
            .await
            .unwrap();

        // iat has second resolution; cross the boundary so the rotated
        // token differs from the first.
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

        let (_, second) = app
            .auth_service
            .refresh_tokens(&first.refresh_token)
            .await
            .unwrap();
        assert_ne!(second.refresh_token, first.refresh_token);

        // Replaying the rotated-away token revokes the stored one
        let result = app.auth_service.refresh_tokens(&first.refresh_token).await;
        assert!(matches!(result, Err(AuthError::TokenReused)));

        let stored = app.user_repo.find_by_id(&user.id).await.unwrap().unwrap();
        assert!(stored.refresh_token.is_none());

        // The second token was collateral damage of the revocation
        let result = app.auth_service.refresh_tokens(&second.refresh_token).await;
        assert!(matches!(result, Err(AuthError::TokenReused)));
    }

    #[tokio::test]
    async fn test_logout_then_refresh_fails() {
        let app = setup_app().await;
        let user = app
            .account_service
            .register(register_input("ada", "ada@example.com"), avatar(), None)
            .await
            .unwrap();

        let (_, tokens) = app
            .auth_service
            .authenticate(Some("ada"), None, "password1")
            .await
            .unwrap();
        app.auth_service.logout(&user.id).await.unwrap();

        let result = app.auth_service.refresh_tokens(&tokens.refresh_token).await;
        assert!(matches!(result, Err(AuthError::TokenReused)));
    }

    #[tokio::test]
    async fn test_change_password_end_to_end() {
        let app = setup_app().await;
        let user = app
            .account_service
            .register(register_input("ada", "ada@example.com"), avatar(), None)
            .await
            .unwrap();

        let result = app
            .auth_service
            .change_password(&user.id, "wrong", "newpassword1")
            .await;
        assert!(matches!(result, Err(AuthError::IncorrectCurrentPassword)));

        app.auth_service
            .change_password(&user.id, "password1", "newpassword1")
            .await
            .unwrap();

        assert!(
            app.auth_service
                .authenticate(Some("ada"), None, "password1")
                .await
                .is_err()
        );
        assert!(
            app.auth_service
                .authenticate(Some("ada"), None, "newpassword1")
                .await
                .is_ok()
        );
    }
}

mod profile_tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_profile_counts_and_subscription_flag() {
        let app = setup_app().await;
        let ada = app
            .account_service
            .register(register_input("ada", "ada@example.com"), avatar(), None)
            .await
            .unwrap();
        let grace = app
            .account_service
            .register(register_input("grace", "grace@example.com"), avatar(), None)
            .await
            .unwrap();
        let linus = app
            .account_service
            .register(register_input("linus", "linus@example.com"), avatar(), None)
            .await
            .unwrap();

        // grace and linus subscribe to ada; ada subscribes to grace
        app.profile_service.subscribe(&grace.id, "ada").await.unwrap();
        app.profile_service.subscribe(&linus.id, "ada").await.unwrap();
        app.profile_service.subscribe(&ada.id, "grace").await.unwrap();

        // Lookup is case-insensitive
        let profile = app
            .profile_service
            .channel_profile(&grace.id, "ADA")
            .await
            .unwrap();
        assert_eq!(profile.username, "ada");
        assert_eq!(profile.subscribers_count, 2);
        assert_eq!(profile.subscribed_to_count, 1);
        assert!(profile.is_subscribed);

        // A non-subscriber sees the same counts but is_subscribed = false
        let profile = app
            .profile_service
            .channel_profile(&ada.id, "ada")
            .await
            .unwrap();
        assert_eq!(profile.subscribers_count, 2);
        assert!(!profile.is_subscribed);

        // Zero-subscription channel
        let profile = app
            .profile_service
            .channel_profile(&ada.id, "linus")
            .await
            .unwrap();
        assert_eq!(profile.subscribers_count, 0);
        assert_eq!(profile.subscribed_to_count, 1);
    }

    #[tokio::test]
    async fn test_channel_profile_unknown_channel() {
        let app = setup_app().await;
        let ada = app
            .account_service
            .register(register_input("ada", "ada@example.com"), avatar(), None)
            .await
            .unwrap();

        let result = app.profile_service.channel_profile(&ada.id, "ghost").await;
        assert!(matches!(result, Err(ProfileError::ChannelNotFound)));

        let result = app.profile_service.channel_profile(&ada.id, "  ").await;
        assert!(matches!(result, Err(ProfileError::MissingUsername)));
    }

    #[tokio::test]
    async fn test_duplicate_subscribe_is_noop() {
        let app = setup_app().await;
        let ada = app
            .account_service
            .register(register_input("ada", "ada@example.com"), avatar(), None)
            .await
            .unwrap();
        let grace = app
            .account_service
            .register(register_input("grace", "grace@example.com"), avatar(), None)
            .await
            .unwrap();

        app.profile_service.subscribe(&grace.id, "ada").await.unwrap();
        app.profile_service.subscribe(&grace.id, "ada").await.unwrap();

        let profile = app
            .profile_service
            .channel_profile(&grace.id, "ada")
            .await
            .unwrap();
        assert_eq!(profile.subscribers_count, 1);

        // Unsubscribe removes the edge; a second unsubscribe is a no-op
        app.profile_service.unsubscribe(&grace.id, "ada").await.unwrap();
        app.profile_service.unsubscribe(&grace.id, "ada").await.unwrap();

        let profile = app
            .profile_service
            .channel_profile(&grace.id, "ada")
            .await
            .unwrap();
        assert_eq!(profile.subscribers_count, 0);
        assert!(!profile.is_subscribed);

        let _ = ada;
    }

    #[tokio::test]
    async fn test_self_subscription_rejected() {
        let app = setup_app().await;
        let ada = app
            .account_service
            .register(register_input("ada", "ada@example.com"), avatar(), None)
            .await
            .unwrap();

        let result = app.profile_service.subscribe(&ada.id, "ada").await;
        assert!(matches!(result, Err(ProfileError::SelfSubscription)));
    }
}

mod watch_history_tests {
    use super::*;

    async fn seed_video(pool: &DbPool, owner_id: &str, title: &str) -> VideoDbModel {
        let repo = SqlxVideoRepository::new(pool.clone());
        let video = VideoDbModel::new(
            owner_id,
            title,
            format!("https://videos.example.com/{}.mp4", title),
            None,
            120,
        );
        repo.create(&video).await.unwrap();
        video
    }

    #[tokio::test]
    async fn test_empty_history() {
        let app = setup_app().await;
        let ada = app
            .account_service
            .register(register_input("ada", "ada@example.com"), avatar(), None)
            .await
            .unwrap();

        let history = app.profile_service.watch_history(&ada.id).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_history_preserves_watch_order_with_owner_info() {
        let app = setup_app().await;
        let ada = app
            .account_service
            .register(register_input("ada", "ada@example.com"), avatar(), None)
            .await
            .unwrap();
        let grace = app
            .account_service
            .register(register_input("grace", "grace@example.com"), avatar(), None)
            .await
            .unwrap();

        let v1 = seed_video(&app.pool, &grace.id, "first").await;
        let v2 = seed_video(&app.pool, &grace.id, "second").await;
        let v3 = seed_video(&app.pool, &ada.id, "third").await;

        app.profile_service.record_watch(&ada.id, &v2.id).await.unwrap();
        app.profile_service.record_watch(&ada.id, &v1.id).await.unwrap();
        app.profile_service.record_watch(&ada.id, &v3.id).await.unwrap();

        let history = app.profile_service.watch_history(&ada.id).await.unwrap();
        assert_eq!(history.len(), 3);

        let ids: Vec<&str> = history.iter().map(|e| e.video_id.as_str()).collect();
        assert_eq!(ids, vec![v2.id.as_str(), v1.id.as_str(), v3.id.as_str()]);

        assert_eq!(history[0].owner_username, "grace");
        assert_eq!(history[0].owner_full_name, "grace Fullname");
        assert_eq!(history[0].owner_avatar_url, "/media/avatar.png");
        assert_eq!(history[2].owner_username, "ada");

        // Rewatching appends a second entry rather than reordering
        app.profile_service.record_watch(&ada.id, &v2.id).await.unwrap();
        let history = app.profile_service.watch_history(&ada.id).await.unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history[3].video_id, v2.id);
    }

    #[tokio::test]
    async fn test_record_watch_unknown_video() {
        let app = setup_app().await;
        let ada = app
            .account_service
            .register(register_input("ada", "ada@example.com"), avatar(), None)
            .await
            .unwrap();

        let result = app.profile_service.record_watch(&ada.id, "no-such-id").await;
        assert!(matches!(result, Err(ProfileError::VideoNotFound)));
    }

    #[tokio::test]
    async fn test_histories_are_per_user() {
        let app = setup_app().await;
        let ada = app
            .account_service
            .register(register_input("ada", "ada@example.com"), avatar(), None)
            .await
            .unwrap();
        let grace = app
            .account_service
            .register(register_input("grace", "grace@example.com"), avatar(), None)
            .await
            .unwrap();

        let video = seed_video(&app.pool, &grace.id, "solo").await;
        app.profile_service.record_watch(&ada.id, &video.id).await.unwrap();

        assert_eq!(app.profile_service.watch_history(&ada.id).await.unwrap().len(), 1);
        assert!(app.profile_service.watch_history(&grace.id).await.unwrap().is_empty());
    }
}

mod http_tests {
    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use mediahub::api::routes::create_router;
    use mediahub::api::server::AppState;
    use tower::ServiceExt;

    /// Build the full router over a fresh database with one seeded account
    /// ("ada" / "password1").
    async fn setup_router() -> (TempDir, Router) {
        let (dir, pool) = setup_test_db().await;

        let user_repo = Arc::new(SqlxUserRepository::new(pool.clone()));
        let subscription_repo = Arc::new(SqlxSubscriptionRepository::new(pool.clone()));
        let video_repo = Arc::new(SqlxVideoRepository::new(pool.clone()));

        let jwt_service = Arc::new(JwtService::new(
            "access-secret-32-chars-long!!!!!",
            "refresh-secret-32-chars-long!!!!",
            3600,
            864000,
        ));
        let auth_service = Arc::new(AuthService::new(
            user_repo.clone(),
            jwt_service.clone(),
            AuthConfig::default(),
        ));
        let account_service = Arc::new(AccountService::new(
            user_repo.clone(),
            Arc::new(StubMediaStore),
        ));
        let profile_service = Arc::new(ProfileService::new(
            user_repo,
            subscription_repo,
            video_repo,
        ));

        account_service
            .register(register_input("ada", "ada@example.com"), avatar(), None)
            .await
            .unwrap();

        let state = AppState::new(jwt_service, auth_service, account_service, profile_service);
        (dir, create_router(state))
    }

    fn login_request(password: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/users/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(format!(
                r#"{{"username":"ada","password":"{}"}}"#,
                password
            )))
            .unwrap()
    }

    fn set_cookies(response: &axum::http::Response<Body>) -> Vec<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    async fn body_json(response: axum::http::Response<Body>) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_login_sets_token_cookies() {
        let (_dir, router) = setup_router().await;

        let response = router.oneshot(login_request("password1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 2);

        let access = cookies
            .iter()
            .find(|c| c.starts_with("accessToken="))
            .expect("accessToken cookie missing");
        let refresh = cookies
            .iter()
            .find(|c| c.starts_with("refreshToken="))
            .expect("refreshToken cookie missing");
        for cookie in [access, refresh] {
            assert!(cookie.contains("HttpOnly"));
            assert!(cookie.contains("Secure"));
            assert!(cookie.contains("SameSite=Lax"));
            assert!(cookie.contains("Path=/"));
        }
        assert!(access.contains("Max-Age=86400"));
        assert!(refresh.contains("Max-Age=864000"));

        // The body carries the same tokens for non-browser clients
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert!(body["data"]["accessToken"].is_string());
        assert!(body["data"]["refreshToken"].is_string());
        assert_eq!(body["data"]["user"]["username"], "ada");
    }

    #[tokio::test]
    async fn test_failed_login_sets_no_cookies() {
        let (_dir, router) = setup_router().await;

        let response = router.oneshot(login_request("wrong-pass")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(set_cookies(&response).is_empty());

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_logout_expires_both_cookies() {
        let (_dir, router) = setup_router().await;

        let login = router
            .clone()
            .oneshot(login_request("password1"))
            .await
            .unwrap();
        let login_body = body_json(login).await;
        let access_token = login_body["data"]["accessToken"].as_str().unwrap();

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/users/logout")
                    .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().any(|c| c.starts_with("accessToken=;")));
        assert!(cookies.iter().any(|c| c.starts_with("refreshToken=;")));
        assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let (_dir, router) = setup_router().await;

        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/users/current-user")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_current_user_accepts_cookie_token() {
        let (_dir, router) = setup_router().await;

        let login = router
            .clone()
            .oneshot(login_request("password1"))
            .await
            .unwrap();
        let cookie = set_cookies(&login)
            .into_iter()
            .find(|c| c.starts_with("accessToken="))
            .unwrap();
        // Cookie header carries only the name=value pair
        let pair = cookie.split(';').next().unwrap().to_string();

        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/users/current-user")
                    .header(header::COOKIE, pair)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["data"]["username"], "ada");
    }
}

mod account_tests {
    use super::*;

    #[tokio::test]
    async fn test_update_account_and_avatar() {
        let app = setup_app().await;
        let ada = app
            .account_service
            .register(register_input("ada", "ada@example.com"), avatar(), None)
            .await
            .unwrap();

        let updated = app
            .account_service
            .update_account(&ada.id, "Ada Lovelace", "lovelace@example.com")
            .await
            .unwrap();
        assert_eq!(updated.full_name, "Ada Lovelace");
        assert_eq!(updated.email, "lovelace@example.com");

        let updated = app
            .account_service
            .update_avatar(
                &ada.id,
                Some(UploadedFile {
                    filename: "new-avatar.png".to_string(),
                    data: vec![9],
                }),
            )
            .await
            .unwrap();
        assert_eq!(updated.avatar_url, "/media/new-avatar.png");

        let updated = app
            .account_service
            .update_cover_image(
                &ada.id,
                Some(UploadedFile {
                    filename: "cover.png".to_string(),
                    data: vec![9],
                }),
            )
            .await
            .unwrap();
        assert_eq!(updated.cover_image_url.as_deref(), Some("/media/cover.png"));
    }

    #[tokio::test]
    async fn test_update_account_email_conflict() {
        let app = setup_app().await;
        app.account_service
            .register(register_input("ada", "ada@example.com"), avatar(), None)
            .await
            .unwrap();
        let grace = app
            .account_service
            .register(register_input("grace", "grace@example.com"), avatar(), None)
            .await
            .unwrap();

        let result = app
            .account_service
            .update_account(&grace.id, "Grace Hopper", "ada@example.com")
            .await;
        assert!(matches!(result, Err(AccountError::EmailInUse)));
    }
}
