//! REST endpoint handlers for the board API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `POST` | `/api/pixelboards` | Create a board |
//! | `GET` | `/api/pixelboards` | List board summaries |
//! | `GET` | `/api/pixelboards/{id}` | Full board entity |
//! | `POST` | `/api/pixelboards/{id}/pixels` | Place a pixel |
//! | `GET` | `/api/pixelboards/{id}/heatmap` | Modification heatmap |
//! | `GET` | `/api/pixelboards/{id}/history` | Replay history |

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::Json;
use chrono::Utc;
use tessera_core::{analytics, Placement};
use tessera_types::{BoardId, HexColor};
use uuid::Uuid;

use crate::auth::Identity;
use crate::dto::{CreateBoardRequest, HeatmapResponse, HistoryResponse, PlacePixelRequest};
use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing server status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let summaries = state.registry.list().await?;
    let board_count = summaries.len();
    let active_count = summaries
        .iter()
        .filter(|s| s.status == tessera_types::BoardStatus::Active)
        .count();
    let live_streams = state.hub.board_channels();

    Ok(Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Tessera</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        .status {{ color: #3fb950; font-weight: bold; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Tessera</h1>
    <p class="subtitle">Shared pixel canvas server</p>

    <p>Status: <span class="status">RUNNING</span></p>

    <div>
        <div class="metric">
            <div class="label">Boards</div>
            <div class="value">{board_count}</div>
        </div>
        <div class="metric">
            <div class="label">Active</div>
            <div class="value">{active_count}</div>
        </div>
        <div class="metric">
            <div class="label">Live streams</div>
            <div class="value">{live_streams}</div>
        </div>
    </div>

    <hr>

    <h2>API Endpoints</h2>
    <ul>
        <li>GET <a href="/api/pixelboards">/api/pixelboards</a> -- List boards</li>
        <li>POST /api/pixelboards -- Create a board</li>
        <li>GET /api/pixelboards/:id -- Full board</li>
        <li>POST /api/pixelboards/:id/pixels -- Place a pixel</li>
        <li>GET /api/pixelboards/:id/heatmap -- Modification heatmap</li>
        <li>GET /api/pixelboards/:id/history -- Replay history</li>
    </ul>

    <h2>WebSocket</h2>
    <ul>
        <li><code>ws://host:port/ws/boards/:id</code> -- Live placement stream</li>
    </ul>
</body>
</html>"#
    )))
}

// ---------------------------------------------------------------------------
// POST /api/pixelboards -- create a board
// ---------------------------------------------------------------------------

/// Create a board from an author-supplied spec.
///
/// Requires identity; the caller becomes the board's author and the
/// attributed user of any seed pixels.
pub async fn create_board(
    State(state): State<Arc<AppState>>,
    Identity(author): Identity,
    Json(body): Json<CreateBoardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let spec = body.into_spec()?;
    let board = state.registry.create(author, spec, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(board)))
}

// ---------------------------------------------------------------------------
// GET /api/pixelboards -- list board summaries
// ---------------------------------------------------------------------------

/// List all boards as lightweight summaries, in creation order.
pub async fn list_boards(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let summaries = state.registry.list().await?;
    Ok(Json(summaries))
}

// ---------------------------------------------------------------------------
// GET /api/pixelboards/{id} -- full board entity
// ---------------------------------------------------------------------------

/// Return a full board, pixel log included.
pub async fn get_board(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let board_id = parse_board_id(&id_str)?;
    let board = state.registry.get(board_id).await?;
    Ok(Json(board))
}

// ---------------------------------------------------------------------------
// POST /api/pixelboards/{id}/pixels -- place a pixel
// ---------------------------------------------------------------------------

/// Place one pixel on a board and return the updated board.
///
/// The engine call runs under the state's placement time budget; an
/// elapsed budget yields 504 with no partial state, because the only
/// durable effect is a single atomic save.
pub async fn place_pixel(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    Identity(user_id): Identity,
    Json(body): Json<PlacePixelRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let board_id = parse_board_id(&id_str)?;
    let color = HexColor::parse(&body.color)
        .map_err(|err| ApiError::InvalidBody(err.to_string()))?;
    let placement = Placement {
        x: body.x,
        y: body.y,
        color,
        user_id,
    };

    let board = tokio::time::timeout(
        state.placement_timeout,
        state.engine.place(board_id, placement, Utc::now()),
    )
    .await
    .map_err(|_elapsed| ApiError::Timeout)??;

    Ok(Json(board))
}

// ---------------------------------------------------------------------------
// GET /api/pixelboards/{id}/heatmap -- modification heatmap
// ---------------------------------------------------------------------------

/// Return per-cell placement counts for activity visualization.
pub async fn get_heatmap(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let board_id = parse_board_id(&id_str)?;
    let board = state.registry.get(board_id).await?;
    let heatmap = analytics::heatmap(&board);
    Ok(Json(HeatmapResponse::new(heatmap, board.size)))
}

// ---------------------------------------------------------------------------
// GET /api/pixelboards/{id}/history -- replay history
// ---------------------------------------------------------------------------

/// Return the time-ordered placement log for frame-by-frame replay.
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let board_id = parse_board_id(&id_str)?;
    let board = state.registry.get(board_id).await?;
    let pixels = analytics::history(&board);
    Ok(Json(HistoryResponse {
        pixels,
        board_size: board.size,
    }))
}

/// Parse a board id from its path segment.
fn parse_board_id(raw: &str) -> Result<BoardId, ApiError> {
    Uuid::parse_str(raw)
        .map(BoardId::from)
        .map_err(|_err| ApiError::InvalidUuid(raw.to_owned()))
}
