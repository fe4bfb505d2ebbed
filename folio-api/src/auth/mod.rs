pub mod cognito;
pub mod verifier;

pub use cognito::{CognitoClient, TokenSet};
pub use verifier::{JwksVerifier, SharedSecretVerifier, TokenVerifier};

use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const ID_TOKEN_COOKIE: &str = "id_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Refresh tokens outlive the session cookies.
pub const REFRESH_TOKEN_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Not authenticated")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Failed to fetch signing keys: {0}")]
    KeyFetch(String),

    #[error("Token endpoint request failed: {0}")]
    TokenEndpoint(String),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AuthError::InvalidToken(err.to_string())
    }
}

/// The signed-in administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthUser {
    pub email: Option<String>,
    pub sub: String,
}

/// The claims read from access and ID tokens.
#[derive(Debug, Deserialize)]
pub(crate) struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        AuthUser {
            email: claims.email,
            sub: claims.sub,
        }
    }
}

/// An HttpOnly, SameSite=Lax cookie scoped to the whole site.
pub fn session_cookie(
    name: &'static str,
    value: String,
    max_age_secs: i64,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

pub fn cleared_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    session_cookie(name, String::new(), 0, secure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie(ACCESS_TOKEN_COOKIE, "abc".into(), 3600, true);
        let rendered = cookie.to_string();
        assert!(rendered.starts_with("access_token=abc"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Secure"));
        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("Max-Age=3600"));

        let cleared = cleared_cookie(REFRESH_TOKEN_COOKIE, false).to_string();
        assert!(cleared.contains("Max-Age=0"));
        assert!(!cleared.contains("Secure"));
    }
}
