//! Request extractors: credentials, the signed-in user, client IP, and JSON
//! bodies whose rejections use the API error envelope.

use crate::auth::{AuthUser, ACCESS_TOKEN_COOKIE};
use crate::error::{codes, ApiError};
use crate::metrics::record_auth_failure;
use crate::state::AppState;
use async_trait::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::Json;
use axum_extra::extract::CookieJar;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::convert::Infallible;
use tracing::debug;

const FALLBACK_IP: &str = "127.0.0.1";

/// The raw access token, if the request carries one.
pub struct Credentials(pub Option<String>);

impl Credentials {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let jar = CookieJar::from_headers(headers);
        if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) {
            if !cookie.value().is_empty() {
                return Credentials(Some(cookie.value().to_string()));
            }
        }
        let bearer = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());
        Credentials(bearer)
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Credentials {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Credentials::from_headers(&parts.headers))
    }
}

/// Resolve the request's user, failing with 401 when there is none.
pub async fn require_user(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let Credentials(token) = Credentials::from_headers(headers);
    let Some(token) = token else {
        record_auth_failure("missing");
        return Err(ApiError::unauthorized("Not authenticated"));
    };
    state.verifier.verify(&token).await.map_err(|e| {
        debug!("Rejected access token: {}", e);
        record_auth_failure("invalid");
        ApiError::unauthorized("Invalid or expired token")
    })
}

/// Resolve the request's user; any failure means anonymous.
pub async fn optional_user(state: &AppState, headers: &HeaderMap) -> Option<AuthUser> {
    let Credentials(token) = Credentials::from_headers(headers);
    state.verifier.verify(&token?).await.ok()
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require_user(state, &parts.headers).await
    }
}

/// Present when the request is authenticated; never rejects.
pub struct MaybeUser(pub Option<AuthUser>);

impl MaybeUser {
    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(optional_user(state, &parts.headers).await))
    }
}

/// First `x-forwarded-for` hop, or loopback.
pub struct ClientIp(pub String);

impl ClientIp {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let ip = headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .unwrap_or(FALLBACK_IP);
        ClientIp(ip.to_string())
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientIp::from_headers(&parts.headers))
    }
}

/// `Json<T>` whose rejection is a 400 `VALIDATION_ERROR`.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::bad_request(codes::VALIDATION_ERROR, "Invalid request body").with_details(json!({
        "formErrors": [rejection.body_text()],
        "fieldErrors": {},
    }))
}
