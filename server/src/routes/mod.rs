//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the REST load/save endpoints and the collaboration
//! websocket under a single Axum router. Static client assets are served by
//! whatever fronts this process, not here.

pub mod boards;
pub mod ws;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let body_limit = DefaultBodyLimit::max(state.config.max_body_bytes);

    Router::new()
        .route("/api/board/{id}", get(boards::get_board))
        .route("/api/board/{id}/save", post(boards::save_board))
        .route("/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
