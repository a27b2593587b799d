//! Error types for the board API layer.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Engine
//! rejections keep their structured detail: a rate-limit response carries
//! `remainingSeconds` alongside the human-readable wait message so
//! clients can render a countdown without parsing prose.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tessera_core::EngineError;

/// Errors that can occur in the board API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A domain rejection or failure from the placement engine.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Missing or unusable identity on a request that requires one.
    #[error("unauthorized: {0}")]
    Auth(String),

    /// A UUID could not be parsed from the request path.
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    /// The request body failed validation.
    #[error("invalid request: {0}")]
    InvalidBody(String),

    /// The placement did not complete within the request's time budget.
    #[error("placement timed out")]
    Timeout,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Engine(engine) => return engine_response(engine),
            Self::Auth(msg) => (
                StatusCode::UNAUTHORIZED,
                serde_json::json!({ "error": msg }),
            ),
            Self::InvalidUuid(msg) | Self::InvalidBody(msg) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": msg }),
            ),
            Self::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                serde_json::json!({ "error": self.to_string() }),
            ),
        };
        respond(status, body)
    }
}

/// Map an engine rejection to its HTTP shape.
///
/// | Rejection | Status |
/// |-----------|--------|
/// | `Validation` | 400 |
/// | `NotFound` | 404 |
/// | `Conflict` | 409 |
/// | `Lifecycle` | 410 |
/// | `RateLimit` | 429 |
/// | `Contention` | 503 |
/// | `Persistence` | 500 |
fn engine_response(engine: &EngineError) -> Response {
    let (status, body) = match engine {
        EngineError::Validation(_) => (
            StatusCode::BAD_REQUEST,
            serde_json::json!({ "error": engine.to_string() }),
        ),
        EngineError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            serde_json::json!({ "error": engine.to_string() }),
        ),
        EngineError::Conflict { x, y } => (
            StatusCode::CONFLICT,
            serde_json::json!({ "error": engine.to_string(), "x": x, "y": y }),
        ),
        EngineError::RateLimit { remaining_seconds } => (
            StatusCode::TOO_MANY_REQUESTS,
            serde_json::json!({
                "error": engine.to_string(),
                "remainingSeconds": remaining_seconds,
            }),
        ),
        EngineError::Lifecycle(_) => (
            StatusCode::GONE,
            serde_json::json!({ "error": engine.to_string() }),
        ),
        EngineError::Contention { .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({ "error": engine.to_string() }),
        ),
        EngineError::Persistence(source) => {
            // Store detail stays in the logs, not on the wire.
            tracing::error!(error = %source, "persistence failure surfaced to client");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": "internal storage error" }),
            )
        }
    };
    respond(status, body)
}

/// Attach the numeric status into the JSON body and build the response.
fn respond(status: StatusCode, mut body: serde_json::Value) -> Response {
    if let Some(map) = body.as_object_mut() {
        map.insert(
            String::from("status"),
            serde_json::Value::from(status.as_u16()),
        );
    }
    (status, axum::Json(body)).into_response()
}
