//! `WebSocket` handler for real-time placement streaming.
//!
//! Clients connect to `GET /ws/boards/{id}` and receive a JSON-encoded
//! [`BoardMessage`] frame for every placement accepted on that board.
//! The handler subscribes through the [`BroadcastHub`], so all viewers
//! of one board share the same ordered stream.
//!
//! A client that falls behind its bounded queue is disconnected rather
//! than silently skipped ahead: a viewer that missed frames is showing a
//! stale canvas, and the close (with a `resync` reason) tells it to
//! refetch the full board before re-subscribing.
//!
//! [`BroadcastHub`]: tessera_core::BroadcastHub

use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tessera_types::{BoardId, BoardMessage};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Close code sent when a lagged client must resynchronize.
///
/// 1012 is "service restart"; the dashboard treats any server-initiated
/// close as "refetch then reconnect", and the `resync` reason makes the
/// intent explicit in logs.
const CLOSE_RESYNC: u16 = 1012;

/// Upgrade an HTTP request to a `WebSocket` connection and stream the
/// board's accepted placements.
///
/// Unknown boards are rejected with 404 before the upgrade, so clients
/// don't hold dead sockets to boards that never existed.
///
/// # Route
///
/// `GET /ws/boards/{id}`
pub async fn ws_board(
    ws: WebSocketUpgrade,
    Path(id_str): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let board_id = Uuid::parse_str(&id_str)
        .map(BoardId::from)
        .map_err(|_err| ApiError::InvalidUuid(id_str.clone()))?;
    // Surfaces NotFound for unknown ids.
    state.registry.get(board_id).await?;

    Ok(ws.on_upgrade(move |socket| handle_ws(socket, state, board_id)))
}

/// Handle the `WebSocket` lifecycle: subscribe to the board's stream and
/// forward each accepted placement as a text frame.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>, board_id: BoardId) {
    debug!(%board_id, "WebSocket viewer connected");

    let mut rx = state.hub.subscribe(board_id);

    loop {
        tokio::select! {
            // Receive an accepted-placement message from the hub.
            result = rx.recv() => {
                match result {
                    Ok(message) => {
                        if !forward(&mut socket, &message).await {
                            return;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(%board_id, skipped, "viewer lagged, forcing resync");
                        let close = Message::Close(Some(CloseFrame {
                            code: CLOSE_RESYNC,
                            reason: "resync".into(),
                        }));
                        let _ = socket.send(close).await;
                        return;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        debug!(%board_id, "hub channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            // Check if the client sent a close frame or disconnected.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%board_id, "WebSocket viewer disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(%board_id, "WebSocket viewer disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(%board_id, "WebSocket error: {e}");
                        return;
                    }
                    _ => {
                        // Ignore other message types (text, binary from client).
                    }
                }
            }
        }
    }
}

/// Serialize and send one message; `false` means the viewer is gone.
async fn forward(socket: &mut WebSocket, message: &BoardMessage) -> bool {
    let json = match serde_json::to_string(message) {
        Ok(j) => j,
        Err(e) => {
            warn!("Failed to serialize board message: {e}");
            return true;
        }
    };
    if socket.send(Message::Text(json.into())).await.is_err() {
        debug!("WebSocket viewer disconnected (send failed)");
        return false;
    }
    true
}
