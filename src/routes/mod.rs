pub mod auth;
pub mod health;
pub mod probe;
pub mod proxy;

use axum::{Router, routing::get};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::AppState;

// --- Shared response types ---

#[derive(Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// The complete local surface: session endpoints, forwarded routes and service endpoints
pub fn router(state: Arc<AppState>) -> Router {
    // Session endpoints with OpenAPI spec generation
    let (auth_routes, openapi) = OpenApiRouter::with_openapi(Default::default())
        .routes(routes!(auth::login))
        .routes(routes!(auth::logout))
        .routes(routes!(auth::session))
        .routes(routes!(auth::rotate_token))
        .split_for_parts();

    let swagger_routes = Router::new().merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger").url("/api-docs/openapi.json", openapi),
    );

    Router::new()
        .route("/health", get(health::health))
        .route("/version", get(health::version))
        .route("/api/test/timeout", get(probe::timeout_probe))
        .merge(swagger_routes)
        .merge(auth_routes)
        .merge(proxy::proxy_routes(proxy::route_table()))
        .with_state(state)
}
