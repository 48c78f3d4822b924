//! Authentication extractors.
//!
//! The session token is a JWT carried in the `access_token` cookie (set by
//! the login and sign-up views) or in an `Authorization: Bearer` header.

use std::fmt;
use std::future::{Ready, ready};

use actix_web::{
    FromRequest, HttpRequest, HttpResponse, ResponseError,
    dev::Payload,
    http::{StatusCode, header},
    web,
};
use uuid::Uuid;

use yatube_core::ports::{AuthError, TokenClaims};

use crate::state::AppState;

/// Name of the cookie holding the session token.
pub const AUTH_COOKIE: &str = "access_token";

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/auth/login/";

/// Authenticated user identity extractor.
///
/// Handlers taking an `Identity` are login-only: a visitor without a valid
/// token is redirected to the login page with `next` pointing back at the
/// requested path.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// Login URL that returns to `next` afterwards.
pub fn login_url(next: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    format!("{LOGIN_PATH}?{query}")
}

/// Error type for authentication failures.
#[derive(Debug)]
pub struct AuthenticationError {
    pub cause: AuthError,
    /// Path and query of the request that was refused.
    pub next: String,
}

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cause)
    }
}

impl ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, login_url(&self.next)))
            .finish()
    }
}

/// Token from an `Authorization: Bearer` header.
fn bearer_token(req: &HttpRequest) -> Result<&str, AuthError> {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return Err(AuthError::MissingAuth);
    };
    let value = value
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))
}

/// Resolve the caller from the session cookie, falling back to the Bearer
/// header when the cookie is absent or rejected.
fn authenticate(req: &HttpRequest) -> Result<Identity, AuthError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        tracing::error!("AppState not found in app data");
        return Err(AuthError::InvalidToken(
            "Server configuration error".to_string(),
        ));
    };

    let cookie_error = match req.cookie(AUTH_COOKIE) {
        Some(cookie) => match state.tokens.validate_token(cookie.value()) {
            Ok(claims) => return Ok(claims.into()),
            Err(e) => Some(e),
        },
        None => None,
    };

    match bearer_token(req) {
        Ok(token) => state.tokens.validate_token(token).map(Identity::from),
        Err(AuthError::MissingAuth) => Err(cookie_error.unwrap_or(AuthError::MissingAuth)),
        Err(e) => Err(e),
    }
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(|cause| {
            tracing::debug!(path = %req.path(), %cause, "Redirecting anonymous visitor to login");
            let next = req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| req.path().to_string());
            AuthenticationError { cause, next }
        }))
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalIdentity(authenticate(req).ok())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url_encodes_next() {
        assert_eq!(login_url("/create/"), "/auth/login/?next=%2Fcreate%2F");
        assert_eq!(
            login_url("/?page=2"),
            "/auth/login/?next=%2F%3Fpage%3D2"
        );
    }

    #[test]
    fn test_redirect_response() {
        let err = AuthenticationError {
            cause: AuthError::MissingAuth,
            next: "/posts/3/edit/".to_string(),
        };
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/auth/login/?next=%2Fposts%2F3%2Fedit%2F"
        );
    }
}
