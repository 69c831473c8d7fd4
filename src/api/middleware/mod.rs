//! API middleware.

pub mod auth;

pub use auth::{ACCESS_TOKEN_COOKIE, CurrentUser, REFRESH_TOKEN_COOKIE, auth_middleware};
