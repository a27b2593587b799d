//! Axum router construction for the board API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the board server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `POST /api/pixelboards` -- create a board
/// - `GET /api/pixelboards` -- list board summaries
/// - `GET /api/pixelboards/{id}` -- full board entity
/// - `POST /api/pixelboards/{id}/pixels` -- place a pixel
/// - `GET /api/pixelboards/{id}/heatmap` -- modification heatmap
/// - `GET /api/pixelboards/{id}/history` -- replay history
/// - `GET /ws/boards/{id}` -- live placement stream
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/boards/{id}", get(ws::ws_board))
        // REST API
        .route(
            "/api/pixelboards",
            get(handlers::list_boards).post(handlers::create_board),
        )
        .route("/api/pixelboards/{id}", get(handlers::get_board))
        .route(
            "/api/pixelboards/{id}/pixels",
            axum::routing::post(handlers::place_pixel),
        )
        .route("/api/pixelboards/{id}/heatmap", get(handlers::get_heatmap))
        .route("/api/pixelboards/{id}/history", get(handlers::get_history))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
