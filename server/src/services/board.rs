//! Board service: load and save snapshots, fan out updates.
//!
//! DESIGN
//! ======
//! Saves are whole-board, last-writer-wins. After a successful write the new
//! snapshot is broadcast as `board-updated` to every connection on the board,
//! the saver's own tabs included, so every viewer converges on what the
//! store holds.
//!
//! ERROR HANDLING
//! ==============
//! Strokes are validated before anything is written: one bad stroke rejects
//! the whole save and the stored board is left untouched.

use frames::{Board, ModelError, SaveRequest, SaveResponse, ServerFrame};
use tracing::{debug, info};

use crate::state::AppState;
use crate::store::StoreError;

#[cfg(test)]
#[path = "board_test.rs"]
mod board_test;

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("invalid stroke: {0}")]
    Invalid(#[from] ModelError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fetch a board snapshot, creating it on first access.
///
/// # Errors
///
/// Returns a store error if the backend is unavailable.
pub async fn load(state: &AppState, board_id: &str) -> Result<Board, BoardError> {
    let board = state.store.get(board_id).await?;
    debug!(%board_id, strokes = board.strokes.len(), "board loaded");
    Ok(board)
}

/// Persist the fields present in `request`, then broadcast the result.
///
/// # Errors
///
/// Returns `Invalid` if any stroke fails validation, or a store error.
pub async fn save(state: &AppState, board_id: &str, request: SaveRequest) -> Result<SaveResponse, BoardError> {
    request.validate()?;

    let board = state.store.put(board_id, request.strokes, request.viewport).await?;
    let last_modified = board.last_modified;
    let strokes = board.strokes.len();

    let peers = state.registry.broadcast(board_id, &ServerFrame::BoardUpdated { board }, None);
    info!(%board_id, strokes, last_modified, peers, "board saved");

    Ok(SaveResponse { success: true, last_modified })
}
