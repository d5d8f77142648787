//! Upstream URL resolution.

use axum::http::Uri;
use url::{Url, form_urlencoded};

use super::route::RouteSpec;
use crate::error::BffError;

/// The segment after the last `/`, untouched
pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or_default()
}

/// Replace every `{name}` placeholder in `template` with the last segment of `inbound_path`
pub fn substitute_path_param(template: &str, inbound_path: &str) -> String {
    let value = last_segment(inbound_path);
    let mut out = String::with_capacity(template.len() + value.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        out.push_str(&rest[..open]);
        out.push_str(value);
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out
}

/// Build the absolute upstream URL for one inbound call.
///
/// Inbound query parameters are applied on top of any the template carries:
/// a key that already exists keeps its position and takes the new value,
/// so the last write wins.
pub fn resolve_upstream_url(
    upstream_url: &str,
    spec: &RouteSpec,
    inbound: &Uri,
) -> Result<Url, BffError> {
    let path = if spec.uses_path_params {
        substitute_path_param(spec.upstream_path_template, inbound.path())
    } else {
        spec.upstream_path_template.to_string()
    };

    let mut url = Url::parse(&format!("{}{}", upstream_url.trim_end_matches('/'), path))?;

    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    if let Some(query) = inbound.query() {
        for (key, value) in form_urlencoded::parse(query.as_bytes()).into_owned() {
            set_param(&mut pairs, key, value);
        }
    }

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(&pairs);
    }
    Ok(url)
}

fn set_param(pairs: &mut Vec<(String, String)>, key: String, value: String) {
    match pairs.iter().position(|(k, _)| *k == key) {
        Some(first) => {
            pairs[first].1 = value;
            let mut index = 0;
            pairs.retain(|(k, _)| {
                let keep = index <= first || *k != key;
                index += 1;
                keep
            });
        }
        None => pairs.push((key, value)),
    }
}
