//! Board load/save routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use frames::{Board, SaveRequest, SaveResponse};
use tracing::{error, warn};

use crate::services::board::{self, BoardError};
use crate::state::AppState;

#[cfg(test)]
#[path = "boards_test.rs"]
mod boards_test;

/// `GET /api/board/{id}`: full board snapshot, created empty on first access.
pub async fn get_board(State(state): State<AppState>, Path(board_id): Path<String>) -> Result<Json<Board>, StatusCode> {
    let board = board::load(&state, &board_id).await.map_err(board_error_to_status)?;
    Ok(Json(board))
}

/// `POST /api/board/{id}/save`: overwrite strokes and/or viewport, then
/// broadcast `board-updated` to every viewer.
pub async fn save_board(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    Json(body): Json<SaveRequest>,
) -> Result<Json<SaveResponse>, StatusCode> {
    let response = board::save(&state, &board_id, body).await.map_err(board_error_to_status)?;
    Ok(Json(response))
}

pub(crate) fn board_error_to_status(err: BoardError) -> StatusCode {
    match err {
        BoardError::Invalid(e) => {
            warn!(error = %e, "rejected save");
            StatusCode::UNPROCESSABLE_ENTITY
        }
        BoardError::Store(e) => {
            error!(error = %e, "board store failure");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
