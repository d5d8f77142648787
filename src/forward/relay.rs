use axum::{
    Json,
    http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde_json::{Value, json};
use tracing::{debug, error};

use super::headers::{auth_headers, resolve_headers};
use super::route::RouteSpec;
use super::target::resolve_upstream_url;
use crate::AppState;
use crate::error::BffError;

/// One buffered dashboard call
#[derive(Debug)]
pub struct Inbound {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Forward one inbound call to the upstream and relay the outcome.
///
/// Exactly one upstream attempt is made. Failures that prevent a usable
/// response become a local 500 with a stable envelope.
pub async fn forward(state: &AppState, spec: &RouteSpec, inbound: Inbound) -> Response {
    let method = inbound.method.clone();
    let path = inbound.uri.path().to_string();

    match try_forward(state, spec, inbound).await {
        Ok(response) => response,
        Err(e) => {
            if state.config.dev_mode {
                error!(%method, %path, upstream = spec.upstream_path_template, "Forwarding failed: {e}");
            }
            e.to_internal_response()
        }
    }
}

async fn try_forward(
    state: &AppState,
    spec: &RouteSpec,
    inbound: Inbound,
) -> Result<Response, BffError> {
    let Inbound {
        method,
        uri,
        headers,
        body,
    } = inbound;

    let url = resolve_upstream_url(&state.config.upstream_url, spec, &uri)?;
    let mut computed = auth_headers(spec.auth, &headers, &state.sessions);

    // HEAD lands on GET routes; the upstream sees a GET and axum drops the body on the way out
    let method = if method == Method::HEAD {
        Method::GET
    } else {
        method
    };

    let outbound_body = if method == Method::GET || body.is_empty() {
        None
    } else {
        let text = match String::from_utf8(body.into()) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        };
        computed.extend(content_headers(&headers, &text));
        Some(text)
    };

    let mut builder = state
        .http_client
        .request(method.clone(), url.clone())
        .headers(resolve_headers(&headers, &computed));
    if let Some(text) = outbound_body {
        builder = builder.body(text);
    }

    let response = builder.send().await?;
    debug!(
        %method,
        path = uri.path(),
        %url,
        status = response.status().as_u16(),
        "Forwarded"
    );
    relay(response).await
}

/// `Content-Type` from the caller (JSON by default) and the byte length of the body
fn content_headers(inbound: &HeaderMap, text: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        inbound
            .get(header::CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("application/json")),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(text.len()));
    headers
}

async fn relay(response: reqwest::Response) -> Result<Response, BffError> {
    let status = response.status();

    if status.is_success() {
        let value: Value = response
            .json()
            .await
            .map_err(|e| BffError::Parse(e.to_string()))?;
        return Ok((StatusCode::OK, Json(value)).into_response());
    }

    let text = response.text().await?;
    let error = serde_json::from_str::<Value>(&text).unwrap_or(Value::Null);
    Ok((
        status,
        Json(json!({
            "error": error,
            "status": status.as_u16(),
            "message": status.canonical_reason().unwrap_or_default(),
        })),
    )
        .into_response())
}
