//! Route for checking how the hosting platform treats long-running requests.

use axum::{
    Json,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::constants::TIMEOUT_PROBE_BUDGET_SECS;

#[derive(Debug, Deserialize)]
pub struct ProbeParams {
    #[serde(default)]
    pub seconds: u64,
}

/// Wait `seconds` before answering; anything above the budget is refused up front
pub async fn timeout_probe(Query(params): Query<ProbeParams>) -> Response {
    if params.seconds > TIMEOUT_PROBE_BUDGET_SECS {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": format!("seconds must be at most {TIMEOUT_PROBE_BUDGET_SECS}"),
            })),
        )
            .into_response();
    }

    tokio::time::sleep(Duration::from_secs(params.seconds)).await;
    Json(json!({ "message": format!("Waited {} seconds", params.seconds) })).into_response()
}
