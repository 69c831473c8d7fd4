//! JWT authentication middleware.
//!
//! Accepts the access token either as an `Authorization: Bearer` header or
//! as the `accessToken` cookie, validates it, and injects the authenticated
//! user into request extensions.

use axum::{
    extract::Request,
    http::header::{AUTHORIZATION, COOKIE},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::jwt::{JwtError, JwtService};

/// Cookie name carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
/// Cookie name carrying the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// The authenticated user, injected into request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
}

/// Extract a Bearer token from the Authorization header.
fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Extract a named cookie value from the Cookie header(s).
pub fn cookie_value<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request
        .headers()
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|v| !v.is_empty())
}

/// JWT authentication middleware.
///
/// The Authorization header wins over the cookie when both are present.
pub async fn auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request)
        .or_else(|| cookie_value(&request, ACCESS_TOKEN_COOKIE))
        .ok_or_else(|| ApiError::unauthorized("Missing authorization token"))?
        .to_string();

    let claims = jwt_service
        .validate_access_token(&token)
        .map_err(|e| match e {
            JwtError::TokenExpired => ApiError::unauthorized("Token has expired"),
            _ => ApiError::unauthorized("Invalid token"),
        })?;

    request.extensions_mut().insert(CurrentUser {
        id: claims.sub,
        username: claims.username,
        email: claims.email,
        full_name: claims.full_name,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;

    fn request_with_headers(headers: &[(&str, &str)]) -> Request {
        let mut builder = HttpRequest::builder();
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_bearer_token_extraction() {
        let request = request_with_headers(&[("authorization", "Bearer abc.def.ghi")]);
        assert_eq!(bearer_token(&request), Some("abc.def.ghi"));

        let request = request_with_headers(&[("authorization", "Basic dXNlcjpwYXNz")]);
        assert_eq!(bearer_token(&request), None);

        let request = request_with_headers(&[]);
        assert_eq!(bearer_token(&request), None);
    }

    #[test]
    fn test_cookie_value_extraction() {
        let request = request_with_headers(&[(
            "cookie",
            "theme=dark; accessToken=abc.def.ghi; refreshToken=jkl",
        )]);
        assert_eq!(
            cookie_value(&request, ACCESS_TOKEN_COOKIE),
            Some("abc.def.ghi")
        );
        assert_eq!(cookie_value(&request, REFRESH_TOKEN_COOKIE), Some("jkl"));
        assert_eq!(cookie_value(&request, "missing"), None);
    }

    #[test]
    fn test_cookie_value_across_multiple_headers() {
        let request = request_with_headers(&[
            ("cookie", "theme=dark"),
            ("cookie", "accessToken=tok"),
        ]);
        assert_eq!(cookie_value(&request, ACCESS_TOKEN_COOKIE), Some("tok"));
    }
}
