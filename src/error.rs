use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum BffError {
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid session token: {0}")]
    Session(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid upstream route: {0}")]
    InvalidRoute(String),

    #[error("Not signed in")]
    Unauthenticated,
}

impl BffError {
    /// Stable local failure envelope: the cause only ever appears in `details`
    pub fn to_internal_response(&self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal Server Error",
                "details": self.to_string(),
            })),
        )
            .into_response()
    }
}

impl IntoResponse for BffError {
    fn into_response(self) -> Response {
        match self {
            BffError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
            _ => self.to_internal_response(),
        }
    }
}

impl From<url::ParseError> for BffError {
    fn from(e: url::ParseError) -> Self {
        BffError::InvalidRoute(e.to_string())
    }
}
