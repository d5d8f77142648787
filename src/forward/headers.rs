//! Outbound header construction.

use axum::http::{HeaderMap, HeaderName, HeaderValue, header};

use super::route::AuthInjection;
use crate::constants::UPSTREAM_SESSION_COOKIE;
use crate::session::{SessionCodec, cookies::upstream_session_value};

/// Inbound headers that never reach the upstream.
///
/// Hop-by-hop headers belong to the browser connection. `host` must match the
/// upstream, `content-*` is recomputed from the body, and credentials come
/// only from the session.
static NOT_FORWARDED: [HeaderName; 14] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::HOST,
    header::COOKIE,
    header::AUTHORIZATION,
    header::CONTENT_LENGTH,
    header::CONTENT_TYPE,
    header::ACCEPT_ENCODING,
];

/// Merge inbound headers with the computed ones into a new map.
///
/// Computed headers replace any inbound header of the same name. `inbound` is
/// left untouched.
pub fn resolve_headers(inbound: &HeaderMap, computed: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(inbound.len() + computed.len());

    for (name, value) in inbound {
        if !NOT_FORWARDED.contains(name) && !computed.contains_key(name) {
            out.append(name.clone(), value.clone());
        }
    }
    for (name, value) in computed {
        out.append(name.clone(), value.clone());
    }
    out
}

/// Credential headers for one call, following the route's strategy.
///
/// A missing or unusable credential yields no header at all.
pub fn auth_headers(strategy: AuthInjection, inbound: &HeaderMap, sessions: &SessionCodec) -> HeaderMap {
    let mut headers = HeaderMap::new();

    match strategy {
        AuthInjection::None => {}
        AuthInjection::Bearer => {
            if let Some(value) = sessions
                .from_headers(inbound)
                .as_ref()
                .and_then(|claims| claims.bearer())
                .and_then(|token| HeaderValue::from_str(&format!("Bearer {token}")).ok())
            {
                headers.insert(header::AUTHORIZATION, value);
            }
        }
        AuthInjection::Cookie => {
            if let Some(value) = upstream_session_value(inbound)
                .and_then(|v| HeaderValue::from_str(&format!("{UPSTREAM_SESSION_COOKIE}={v}")).ok())
            {
                headers.insert(header::COOKIE, value);
            }
        }
    }
    headers
}
