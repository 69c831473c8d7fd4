//! User account routes.
//!
//! All endpoints hang under `/api/users`. Register, login, and refresh are
//! public; everything else requires a valid access token.

use axum::{
    Extension, Json, Router,
    extract::{Multipart, Path, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::{self, Next},
    response::{AppendHeaders, IntoResponse},
    routing::{get, patch, post},
};
use serde::Deserialize;
use std::collections::HashMap;

use crate::api::account_service::RegisterInput;
use crate::api::error::{ApiError, ApiResponse, ApiResult};
use crate::api::middleware::{
    ACCESS_TOKEN_COOKIE, CurrentUser, REFRESH_TOKEN_COOKIE, auth::cookie_value, auth_middleware,
};
use crate::api::models::{ChannelProfileView, UserView, WatchVideoView};
use crate::api::server::AppState;
use crate::media::UploadedFile;

/// Login request body. Either identifier is accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

/// Refresh request body. The token may also arrive via cookie.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Change password request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Update account request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub full_name: String,
    pub email: String,
}

/// Create the users router.
pub fn router(state: &AppState) -> Router<AppState> {
    let jwt_service = state.jwt_service.clone();

    let protected = Router::new()
        .route("/logout", post(logout))
        .route("/change-password", post(change_password))
        .route("/current-user", get(current_user))
        .route("/update-account", patch(update_account))
        .route("/avatar", patch(update_avatar))
        .route("/cover-image", patch(update_cover_image))
        .route("/c/{username}", get(channel_profile))
        .route("/history", get(watch_history))
        .route("/history/{video_id}", post(record_watch))
        .route("/subscribe/{username}", post(subscribe).delete(unsubscribe))
        .route_layer(middleware::from_fn(move |request: Request, next: Next| {
            auth_middleware(jwt_service.clone(), request, next)
        }));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .merge(protected)
}

/// Build the Set-Cookie headers carrying a fresh token pair.
fn auth_cookies(
    access_token: &str,
    refresh_token: &str,
    access_max_age: u64,
    refresh_max_age: u64,
) -> AppendHeaders<[(axum::http::HeaderName, String); 2]> {
    AppendHeaders([
        (
            SET_COOKIE,
            format!(
                "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
                ACCESS_TOKEN_COOKIE, access_token, access_max_age
            ),
        ),
        (
            SET_COOKIE,
            format!(
                "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
                REFRESH_TOKEN_COOKIE, refresh_token, refresh_max_age
            ),
        ),
    ])
}

/// Build the Set-Cookie headers clearing both token cookies.
fn clear_auth_cookies() -> AppendHeaders<[(axum::http::HeaderName, String); 2]> {
    AppendHeaders([
        (
            SET_COOKIE,
            format!(
                "{}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0",
                ACCESS_TOKEN_COOKIE
            ),
        ),
        (
            SET_COOKIE,
            format!(
                "{}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0",
                REFRESH_TOKEN_COOKIE
            ),
        ),
    ])
}

/// Drain a multipart form into its text fields and uploaded files.
async fn read_multipart(
    mut multipart: Multipart,
) -> ApiResult<(HashMap<String, String>, HashMap<String, UploadedFile>)> {
    let mut fields = HashMap::new();
    let mut files = HashMap::new();

    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
    {
        let Some(name) = part.name().map(str::to_string) else {
            continue;
        };

        if let Some(filename) = part.file_name().map(str::to_string) {
            let data = part
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
            files.insert(
                name,
                UploadedFile {
                    filename,
                    data: data.to_vec(),
                },
            );
        } else {
            let text = part
                .text()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read field: {}", e)))?;
            fields.insert(name, text);
        }
    }

    Ok((fields, files))
}

/// POST /api/users/register
///
/// Register a new account from a multipart form with text fields
/// (username, email, fullName, password) and file fields (avatar required,
/// coverImage optional).
async fn register(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let (mut fields, mut files) = read_multipart(multipart).await?;

    let input = RegisterInput {
        username: fields.remove("username").unwrap_or_default(),
        email: fields.remove("email").unwrap_or_default(),
        full_name: fields.remove("fullName").unwrap_or_default(),
        password: fields.remove("password").unwrap_or_default(),
    };
    let avatar = files.remove("avatar");
    let cover_image = files.remove("coverImage");

    let user = state
        .account_service
        .register(input, avatar, cover_image)
        .await?;

    Ok(ApiResponse::with_status(
        StatusCode::CREATED,
        UserView::from(&user),
        "User registered successfully",
    ))
}

/// POST /api/users/login
///
/// Authenticate by username or email plus password. Sets the token cookies
/// and also returns both tokens in the body for non-browser clients.
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let (user, tokens) = state
        .auth_service
        .authenticate(
            request.username.as_deref(),
            request.email.as_deref(),
            &request.password,
        )
        .await?;

    let cookies = auth_cookies(
        &tokens.access_token,
        &tokens.refresh_token,
        tokens.expires_in,
        tokens.refresh_expires_in,
    );
    let body = ApiResponse::ok(
        serde_json::json!({
            "user": UserView::from(&user),
            "accessToken": tokens.access_token,
            "refreshToken": tokens.refresh_token,
        }),
        "User logged in successfully",
    );

    Ok((cookies, body))
}

/// POST /api/users/logout
///
/// Clear the stored refresh token and expire both cookies.
async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    state.auth_service.logout(&user.id).await?;

    Ok((
        clear_auth_cookies(),
        ApiResponse::ok(serde_json::json!({}), "User logged out successfully"),
    ))
}

/// POST /api/users/refresh-token
///
/// Rotate the token pair. The refresh token comes from the request body or
/// the refreshToken cookie.
async fn refresh_token(State(state): State<AppState>, request: Request) -> ApiResult<impl IntoResponse> {
    let from_cookie = cookie_value(&request, REFRESH_TOKEN_COOKIE).map(str::to_string);

    // Body is optional; tolerate an empty or absent JSON body.
    let body_bytes = axum::body::to_bytes(request.into_body(), 64 * 1024)
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read body: {}", e)))?;
    let from_body = if body_bytes.is_empty() {
        None
    } else {
        serde_json::from_slice::<RefreshRequest>(&body_bytes)
            .map_err(|e| ApiError::bad_request(format!("Malformed request body: {}", e)))?
            .refresh_token
    };

    let presented = from_body
        .or(from_cookie)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::unauthorized("Refresh token is required"))?;

    let (_, tokens) = state.auth_service.refresh_tokens(&presented).await?;

    let cookies = auth_cookies(
        &tokens.access_token,
        &tokens.refresh_token,
        tokens.expires_in,
        tokens.refresh_expires_in,
    );
    let body = ApiResponse::ok(
        serde_json::json!({
            "accessToken": tokens.access_token,
            "refreshToken": tokens.refresh_token,
        }),
        "Access token refreshed",
    );

    Ok((cookies, body))
}

/// POST /api/users/change-password
async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<ChangePasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .auth_service
        .change_password(&user.id, &request.old_password, &request.new_password)
        .await?;

    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "Password changed successfully",
    ))
}

/// GET /api/users/current-user
async fn current_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    let user = state.account_service.current_user(&user.id).await?;
    Ok(ApiResponse::ok(
        UserView::from(&user),
        "Current user fetched successfully",
    ))
}

/// PATCH /api/users/update-account
async fn update_account(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<UpdateAccountRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .account_service
        .update_account(&user.id, &request.full_name, &request.email)
        .await?;
    Ok(ApiResponse::ok(
        UserView::from(&user),
        "Account details updated successfully",
    ))
}

/// PATCH /api/users/avatar
async fn update_avatar(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let (_, mut files) = read_multipart(multipart).await?;
    let user = state
        .account_service
        .update_avatar(&user.id, files.remove("avatar"))
        .await?;
    Ok(ApiResponse::ok(
        UserView::from(&user),
        "Avatar updated successfully",
    ))
}

/// PATCH /api/users/cover-image
async fn update_cover_image(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let (_, mut files) = read_multipart(multipart).await?;
    let user = state
        .account_service
        .update_cover_image(&user.id, files.remove("coverImage"))
        .await?;
    Ok(ApiResponse::ok(
        UserView::from(&user),
        "Cover image updated successfully",
    ))
}

/// GET /api/users/c/{username}
///
/// Channel profile with subscriber counts, as seen by the caller.
async fn channel_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(username): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let profile = state
        .profile_service
        .channel_profile(&user.id, &username)
        .await?;
    Ok(ApiResponse::ok(
        ChannelProfileView::from(profile),
        "Channel profile fetched successfully",
    ))
}

/// GET /api/users/history
async fn watch_history(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    let history = state.profile_service.watch_history(&user.id).await?;
    let views: Vec<WatchVideoView> = history.into_iter().map(WatchVideoView::from).collect();
    Ok(ApiResponse::ok(
        views,
        "Watch history fetched successfully",
    ))
}

/// POST /api/users/history/{video_id}
async fn record_watch(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(video_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.profile_service.record_watch(&user.id, &video_id).await?;
    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "Watch recorded successfully",
    ))
}

/// POST /api/users/subscribe/{username}
async fn subscribe(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(username): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.profile_service.subscribe(&user.id, &username).await?;
    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "Subscribed successfully",
    ))
}

/// DELETE /api/users/subscribe/{username}
async fn unsubscribe(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(username): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state
        .profile_service
        .unsubscribe(&user.id, &username)
        .await?;
    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "Unsubscribed successfully",
    ))
}
