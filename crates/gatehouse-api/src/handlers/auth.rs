//! Session handlers: login, refresh, logout, me.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use tracing::debug;
use validator::Validate;

use gatehouse_auth::{Principal, TokenPair};
use gatehouse_core::error::AppError;

use crate::dto::request::{LoginRequest, RefreshRequest};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AUTH_COOKIE, AuthUser, REFRESH_COOKIE, token_carrier};
use crate::state::AppState;

fn session_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// An already-expired cookie, so the client drops `name` whether or not the
/// request carried it.
fn expired_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    let mut cookie = session_cookie(name, String::new(), secure);
    cookie.make_removal();
    cookie
}

fn with_session_cookies(jar: CookieJar, pair: &TokenPair, secure: bool) -> CookieJar {
    jar.add(session_cookie(AUTH_COOKIE, pair.access_token.clone(), secure))
        .add(session_cookie(REFRESH_COOKIE, pair.refresh_token.clone(), secure))
}

/// The refresh token carried in a JSON body. An empty body carries none.
fn token_in_body(body: &Bytes) -> Result<Option<String>, AppError> {
    if body.is_empty() {
        return Ok(None);
    }
    let req = serde_json::from_slice::<RefreshRequest>(body)
        .map_err(|_| AppError::validation("Invalid request body"))?;
    Ok(req.refresh_token.filter(|t| !t.trim().is_empty()))
}

fn token_in_cookie(jar: &CookieJar) -> Option<String> {
    jar.get(REFRESH_COOKIE).map(|c| c.value().to_string())
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<TokenPair>>), ApiError> {
    req.validate()?;
    let pair = state.authority.login(&req.username, &req.password).await?;
    let jar = with_session_cookies(jar, &pair, state.config.server.cookie_secure);
    Ok((jar, Json(ApiResponse::ok(pair))))
}

/// POST /api/refresh
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<ApiResponse<TokenPair>>), ApiError> {
    let token = token_in_body(&body)?
        .or_else(|| token_in_cookie(&jar))
        .ok_or_else(|| AppError::unauthorized("Missing token"))?;
    let pair = state.authority.refresh(&token).await?;
    let jar = with_session_cookies(jar, &pair, state.config.server.cookie_secure);
    Ok((jar, Json(ApiResponse::ok(pair))))
}

/// POST /api/logout
///
/// Revokes the refresh token and, when present, the access token. Always
/// clears the session cookies, even when the body does not parse.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<ApiResponse<MessageResponse>>), ApiError> {
    let from_body = token_in_body(&body).unwrap_or_else(|_| {
        debug!("Ignoring unreadable logout body");
        None
    });
    if let Some(token) = from_body.or_else(|| token_in_cookie(&jar)) {
        state.authority.logout(&token).await?;
    }
    let carrier = token_carrier(&headers);
    if let Some(access) = carrier.token() {
        state.authority.revoke_token(access).await?;
    }

    let secure = state.config.server.cookie_secure;
    let jar = jar
        .add(expired_cookie(AUTH_COOKIE, secure))
        .add(expired_cookie(REFRESH_COOKIE, secure));
    Ok((jar, Json(ApiResponse::ok(MessageResponse::new("Logged out")))))
}

/// GET /api/me
pub async fn me(auth: AuthUser) -> Json<ApiResponse<Principal>> {
    Json(ApiResponse::ok(auth.0))
}
