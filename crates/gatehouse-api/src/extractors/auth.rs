//! `AuthUser` extractor: finds the access token, verifies it, and exposes the caller.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};

use gatehouse_auth::{Principal, TokenCarrier};

use crate::error::ApiError;
use crate::state::AppState;

/// Cookie carrying the access token for browser clients.
pub const AUTH_COOKIE: &str = "auth_token";
/// Cookie carrying the refresh token for browser clients.
pub const REFRESH_COOKIE: &str = "refresh_token";

/// The authenticated caller, available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl std::ops::Deref for AuthUser {
    type Target = Principal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Collect the access token candidates from a request's headers.
pub fn token_carrier(headers: &HeaderMap) -> TokenCarrier {
    let bearer = headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string());
    let cookie = CookieJar::from_headers(headers)
        .get(AUTH_COOKIE)
        .map(|c| c.value().to_string());
    TokenCarrier::new(bearer, cookie)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let carrier = token_carrier(&parts.headers);
        let principal = state.guard.authenticate(&carrier).await?;
        Ok(AuthUser(principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum::http::header::{AUTHORIZATION, COOKIE};

    #[test]
    fn test_carrier_reads_header_and_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        headers.insert(COOKIE, HeaderValue::from_static("auth_token=jkl; theme=dark"));

        let carrier = token_carrier(&headers);
        assert_eq!(carrier.bearer.as_deref(), Some("abc.def.ghi"));
        assert_eq!(carrier.cookie.as_deref(), Some("jkl"));
        assert_eq!(carrier.token(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_non_bearer_scheme_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(token_carrier(&headers).token(), None);
    }
}
