use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, Method, Uri},
    routing::{MethodFilter, MethodRouter},
};
use std::sync::Arc;
use tracing::warn;

use crate::AppState;
use crate::constants::MAX_FORWARD_BODY_BYTES;
use crate::forward::{Inbound, RouteSpec, forward};

const READ_WRITE: &[Method] = &[Method::GET, Method::POST, Method::PUT];
const READ_DELETE: &[Method] = &[Method::GET, Method::DELETE];

/// Every upstream resource the dashboard may reach
pub fn route_table() -> Vec<RouteSpec> {
    vec![
        RouteSpec::new("/api/status", "/api/status").public(),
        // Channels
        RouteSpec::new("/api/channel", "/api/channel/").methods(READ_WRITE),
        RouteSpec::new("/api/channel/search", "/api/channel/search"),
        RouteSpec::new("/api/channel/{id}", "/api/channel/{id}")
            .methods(READ_DELETE)
            .with_path_param(),
        RouteSpec::new("/api/channel/copy/{id}", "/api/channel/copy/{id}")
            .methods(&[Method::POST])
            .with_path_param(),
        RouteSpec::new("/api/channel/test/{id}", "/api/channel/test/{id}").with_path_param(),
        // Users
        RouteSpec::new("/api/user", "/api/user/").methods(READ_WRITE),
        RouteSpec::new("/api/user/search", "/api/user/search"),
        RouteSpec::new("/api/user/manage", "/api/user/manage").methods(&[Method::POST]),
        RouteSpec::new("/api/user/self", "/api/user/self").methods(&[Method::GET, Method::PUT]),
        RouteSpec::new("/api/user/{id}", "/api/user/{id}")
            .methods(READ_DELETE)
            .with_path_param(),
        // Tokens. Single-token reads and deletes still authenticate with the upstream session cookie.
        RouteSpec::new("/api/token", "/api/token/").methods(READ_WRITE),
        RouteSpec::new("/api/token/search", "/api/token/search"),
        RouteSpec::new("/api/token/{id}", "/api/token/{id}")
            .methods(READ_DELETE)
            .with_path_param()
            .cookie_auth(),
        // Redemption codes
        RouteSpec::new("/api/redemption", "/api/redemption/").methods(READ_WRITE),
        RouteSpec::new("/api/redemption/{id}", "/api/redemption/{id}")
            .methods(READ_DELETE)
            .with_path_param(),
        // Logs
        RouteSpec::new("/api/log", "/api/log/").methods(&[Method::GET, Method::DELETE]),
        RouteSpec::new("/api/log/self", "/api/log/self"),
        RouteSpec::new("/api/log/stat", "/api/log/stat"),
        // Settings
        RouteSpec::new("/api/option", "/api/option/").methods(&[Method::GET, Method::PUT]),
        RouteSpec::new("/api/group", "/api/group/"),
        RouteSpec::new("/api/models", "/api/models"),
    ]
}

/// Register one forwarding handler per route. Unlisted methods get axum's 405,
/// bodies above the limit get 413 before anything is sent upstream.
pub fn proxy_routes(specs: Vec<RouteSpec>) -> Router<Arc<AppState>> {
    let router = specs.into_iter().fold(Router::new(), |router, spec| {
        let spec = Arc::new(spec);
        let mut method_router = MethodRouter::new();

        for method in &spec.methods {
            let Ok(filter) = MethodFilter::try_from(method.clone()) else {
                warn!("Skipping unsupported method {method} on {}", spec.local_path);
                continue;
            };
            let spec = spec.clone();
            method_router = method_router.on(
                filter,
                move |State(state): State<Arc<AppState>>,
                      method: Method,
                      uri: Uri,
                      headers: HeaderMap,
                      body: Bytes| {
                    let spec = spec.clone();
                    async move { forward(&state, &spec, Inbound { method, uri, headers, body }).await }
                },
            );
        }

        router.route(spec.local_path, method_router)
    });

    router.layer(DefaultBodyLimit::max(MAX_FORWARD_BODY_BYTES))
}
