//! WebSocket handler: per-board relay of live previews and cursors.
//!
//! DESIGN
//! ======
//! On upgrade, generates a connection ID, joins the board in the registry,
//! sends the `init` snapshot, and enters a `select!` loop:
//! - Incoming client frames → decode, then relay to board peers
//! - Frames queued by peers or by saves → forward to this client
//!
//! The relay never touches the store: previews and cursors are ephemeral,
//! and committed strokes arrive only through the REST save path.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → join registry → send `init`
//! 2. Client sends `stroke-preview` / `cursor` → relayed to everyone else
//! 3. Malformed frames → logged and dropped; the connection stays open
//! 4. Close, socket error, or failed send → part registry

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use frames::{ClientFrame, ServerFrame};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::services;
use crate::state::AppState;

#[cfg(test)]
#[path = "ws_test.rs"]
mod ws_test;

const DEFAULT_BOARD: &str = "default";

#[derive(Debug, Deserialize)]
pub struct WsParams {
    board: Option<String>,
}

impl WsParams {
    /// The requested board, or `"default"` when missing or empty.
    fn board_id(self) -> String {
        self.board.filter(|b| !b.is_empty()).unwrap_or_else(|| DEFAULT_BOARD.to_owned())
    }
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, Query(params): Query<WsParams>, ws: WebSocketUpgrade) -> Response {
    let board_id = params.board_id();
    ws.on_upgrade(move |socket| run_ws(socket, state, board_id))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState, board_id: String) {
    let conn_id = Uuid::new_v4();

    // Join before loading so no save broadcast can slip between the
    // snapshot and the first queued frame.
    let (client_tx, mut client_rx) = mpsc::channel::<ServerFrame>(state.config.client_queue_capacity);
    let peers = state.registry.join(&board_id, conn_id, client_tx);
    info!(%board_id, %conn_id, peers, boards = state.registry.board_count(), "ws: client connected");

    let init = match services::board::load(&state, &board_id).await {
        Ok(board) => ServerFrame::Init { board },
        Err(e) => {
            error!(%board_id, %conn_id, error = %e, "ws: initial load failed");
            state.registry.part(&board_id, conn_id);
            return;
        }
    };
    if send_frame(&mut socket, &init).await.is_err() {
        state.registry.part(&board_id, conn_id);
        return;
    }

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(msg) = msg else { break };
                let Ok(msg) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        process_inbound_text(&state, &board_id, conn_id, text.as_str());
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(frame) = client_rx.recv() => {
                if send_frame(&mut socket, &frame).await.is_err() {
                    break;
                }
            }
        }
    }

    state.registry.part(&board_id, conn_id);
    info!(%board_id, %conn_id, peers = state.registry.peer_count(&board_id), "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Decode one inbound text frame and relay it to the sender's board peers.
/// Returns how many peers it was queued for.
///
/// Exclusion is by connection, not by `userId`: a second connection that
/// reuses the sender's id still receives the frame, and clients drop such
/// echoes themselves by comparing against their own session id.
///
/// Kept apart from the socket loop so tests can drive relay behavior
/// without a transport.
fn process_inbound_text(state: &AppState, board_id: &str, conn_id: Uuid, text: &str) -> usize {
    let frame = match frames::decode_client_frame(text) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(%board_id, %conn_id, error = %e, "ws: dropping malformed frame");
            return 0;
        }
    };

    if let ClientFrame::StrokePreview { stroke, .. } = &frame {
        debug!(%board_id, %conn_id, points = stroke.points.len(), "ws: relay preview");
    }
    state.registry.broadcast(board_id, &ServerFrame::from(frame), Some(conn_id))
}

async fn send_frame(socket: &mut WebSocket, frame: &ServerFrame) -> Result<(), axum::Error> {
    let text = match frames::encode(frame) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "ws: failed to encode outbound frame");
            return Ok(());
        }
    };
    socket.send(Message::Text(text.into())).await
}
