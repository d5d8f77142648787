use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use super::role::Role;
use crate::constants::{ROLE_COOKIE, SESSION_TOKEN_COOKIE, UPSTREAM_SESSION_COOKIE};

/// Cookie holding the signed session token
pub fn session_token_cookie(token: String, ttl_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_TOKEN_COOKIE, token))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(ttl_secs))
        .build()
}

/// Cookie holding the upstream session value, used by cookie-authenticated routes
pub fn upstream_session_cookie(value: String, max_age: Option<i64>, secure: bool) -> Cookie<'static> {
    let mut builder = Cookie::build((UPSTREAM_SESSION_COOKIE, value))
        .http_only(true)
        .secure(secure)
        .path("/");
    if let Some(secs) = max_age {
        builder = builder.max_age(Duration::seconds(secs));
    }
    builder.build()
}

pub fn role_cookie(role: Role, secure: bool) -> Cookie<'static> {
    Cookie::build((ROLE_COOKIE, role.wire_value().to_string()))
        .http_only(true)
        .secure(secure)
        .path("/")
        .build()
}

/// Removal cookies for everything minted at login
pub fn clear_cookies() -> [Cookie<'static>; 3] {
    [SESSION_TOKEN_COOKIE, UPSTREAM_SESSION_COOKIE, ROLE_COOKIE].map(|name| {
        Cookie::build((name, ""))
            .path("/")
            .max_age(Duration::ZERO)
            .build()
    })
}

/// Value of the locally stored upstream session cookie
pub fn upstream_session_value(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(UPSTREAM_SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}
