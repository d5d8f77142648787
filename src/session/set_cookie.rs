//! Minimal `Set-Cookie` parsing for the upstream login response.

use axum::http::{HeaderMap, header};

/// One parsed `Set-Cookie` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub path: Option<String>,
    pub expires: Option<String>,
    pub max_age: Option<i64>,
}

/// Parse a single `Set-Cookie` header value.
///
/// The first fragment is the cookie pair; later fragments are attributes. Only
/// the first occurrence of each attribute counts. Returns `None` when there is
/// no `name=value` pair.
pub fn parse_set_cookie(raw: &str) -> Option<SetCookie> {
    let mut fragments = raw.split(';').map(str::trim);

    let (name, value) = fragments.next()?.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let mut cookie = SetCookie {
        name: name.to_string(),
        value: value.trim().to_string(),
        path: None,
        expires: None,
        max_age: None,
    };

    for fragment in fragments {
        let (key, val) = fragment
            .split_once('=')
            .map(|(k, v)| (k.trim(), v.trim()))
            .unwrap_or((fragment, ""));

        if key.eq_ignore_ascii_case("path") {
            cookie.path.get_or_insert_with(|| val.to_string());
        } else if key.eq_ignore_ascii_case("expires") {
            cookie.expires.get_or_insert_with(|| val.to_string());
        } else if key.eq_ignore_ascii_case("max-age") && cookie.max_age.is_none() {
            cookie.max_age = val.parse().ok();
        }
    }

    Some(cookie)
}

/// Find the cookie named exactly `name` among all `Set-Cookie` headers
pub fn find_cookie(headers: &HeaderMap, name: &str) -> Option<SetCookie> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(parse_set_cookie)
        .find(|c| c.name == name)
}
