//! Hosted-login flow and session cookies.

use super::{ok, success, Data, JsonResult, Success};
use crate::auth::{
    cleared_cookie, session_cookie, AuthUser, CognitoClient, TokenSet, ACCESS_TOKEN_COOKIE,
    ID_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, REFRESH_TOKEN_MAX_AGE_SECS,
};
use crate::error::{codes, ApiError, ApiResult};
use crate::metrics::record_auth_failure;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Redirect;
use axum::Json;
use axum_extra::extract::CookieJar;
use reqwest::Url;
use serde::Deserialize;
use tracing::{error, info, warn};

const CALLBACK_PATH: &str = "/api/auth/callback";
const LOGIN_PAGE: &str = "/admin/login";
const ADMIN_HOME: &str = "/admin";

fn identity(state: &AppState) -> ApiResult<&CognitoClient> {
    state.identity.as_ref().ok_or_else(|| {
        ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::INTERNAL_ERROR,
            "Hosted login is not configured",
        )
    })
}

/// Public origin of the request as seen through the proxy.
pub fn request_base_url(headers: &HeaderMap, fallback: &str) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(',').next().unwrap_or(v).trim().to_string())
            .filter(|v| !v.is_empty())
    };
    let protocol = header("x-forwarded-proto").unwrap_or_else(|| "https".to_string());
    match header("x-forwarded-host").or_else(|| header("host")) {
        Some(host) => format!("{protocol}://{host}"),
        None => fallback.trim_end_matches('/').to_string(),
    }
}

fn login_error(base_url: &str, error: &str) -> Redirect {
    let target = Url::parse_with_params(&format!("{base_url}{LOGIN_PAGE}"), &[("error", error)])
        .map(String::from)
        .unwrap_or_else(|_| format!("{LOGIN_PAGE}?error=auth_failed"));
    Redirect::temporary(&target)
}

fn set_session(jar: CookieJar, tokens: &TokenSet, secure: bool) -> CookieJar {
    let jar = jar
        .add(session_cookie(
            ACCESS_TOKEN_COOKIE,
            tokens.access_token.clone(),
            tokens.expires_in,
            secure,
        ))
        .add(session_cookie(
            ID_TOKEN_COOKIE,
            tokens.id_token.clone(),
            tokens.expires_in,
            secure,
        ));
    match &tokens.refresh_token {
        Some(refresh) => jar.add(session_cookie(
            REFRESH_TOKEN_COOKIE,
            refresh.clone(),
            REFRESH_TOKEN_MAX_AGE_SECS,
            secure,
        )),
        None => jar,
    }
}

pub async fn login(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Redirect> {
    let client = identity(&state)?;
    let base_url = request_base_url(&headers, &state.config.server.public_base_url);
    let url = client
        .authorize_url(&format!("{base_url}{CALLBACK_PATH}"))
        .map_err(ApiError::internal)?;
    Ok(Redirect::temporary(url.as_str()))
}

#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> (CookieJar, Redirect) {
    let base_url = request_base_url(&headers, &state.config.server.public_base_url);

    if let Some(error) = query.error.as_deref().filter(|e| !e.is_empty()) {
        warn!("Identity provider returned error: {}", error);
        return (jar, login_error(&base_url, error));
    }
    let Some(code) = query.code.as_deref().filter(|c| !c.is_empty()) else {
        return (jar, login_error(&base_url, "no_code"));
    };
    let Some(client) = state.identity.as_ref() else {
        error!("Auth callback hit without a configured identity provider");
        return (jar, login_error(&base_url, "auth_failed"));
    };

    let redirect_uri = format!("{base_url}{CALLBACK_PATH}");
    let tokens = match client.exchange_code(code, &redirect_uri).await {
        Ok(tokens) => tokens,
        Err(e) => {
            error!("Auth callback error: {}", e);
            record_auth_failure("callback");
            return (jar, login_error(&base_url, "auth_failed"));
        }
    };
    let user = match state.verifier.verify(&tokens.id_token).await {
        Ok(user) => user,
        Err(e) => {
            error!("Auth callback received an invalid ID token: {}", e);
            record_auth_failure("callback");
            return (jar, login_error(&base_url, "auth_failed"));
        }
    };

    info!("Signed in {}", user.sub);
    let jar = set_session(jar, &tokens, state.config.server.secure_cookies);
    (jar, Redirect::temporary(&format!("{base_url}{ADMIN_HOME}")))
}

pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<Data<Success>>)> {
    let Some(refresh_token) = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
    else {
        return Err(ApiError::unauthorized("No refresh token"));
    };

    let client = identity(&state)?;
    let mut tokens = client.refresh(&refresh_token).await.map_err(|e| {
        warn!("Token refresh failed: {}", e);
        record_auth_failure("refresh");
        ApiError::unauthorized("Token refresh failed")
    })?;
    // Refresh responses only renew the session cookies.
    tokens.refresh_token = None;

    let jar = set_session(jar, &tokens, state.config.server.secure_cookies);
    Ok((jar, success()))
}

pub async fn signout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Data<Success>>) {
    let secure = state.config.server.secure_cookies;
    let jar = jar
        .add(cleared_cookie(ACCESS_TOKEN_COOKIE, secure))
        .add(cleared_cookie(ID_TOKEN_COOKIE, secure))
        .add(cleared_cookie(REFRESH_TOKEN_COOKIE, secure));
    (jar, success())
}

pub async fn me(user: AuthUser) -> JsonResult<AuthUser> {
    Ok(ok(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_base_url() {
        let mut headers = HeaderMap::new();
        assert_eq!(
            request_base_url(&headers, "http://localhost:3000/"),
            "http://localhost:3000"
        );

        headers.insert("host", HeaderValue::from_static("internal:3000"));
        assert_eq!(request_base_url(&headers, ""), "https://internal:3000");

        headers.insert("x-forwarded-host", HeaderValue::from_static("portfolio.example.com"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("http"));
        assert_eq!(request_base_url(&headers, ""), "http://portfolio.example.com");
    }

    #[test]
    fn test_login_error_redirect_is_encoded() {
        let response = axum::response::IntoResponse::into_response(login_error(
            "https://site.example.com",
            "access denied",
        ));
        assert_eq!(
            response.headers()["location"],
            "https://site.example.com/admin/login?error=access+denied"
        );
    }
}
