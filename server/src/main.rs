mod config;
mod registry;
mod routes;
mod services;
mod state;
mod store;

use std::process::ExitCode;

use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    if let Ok(path) = &dotenv {
        info!(path = %path.display(), "loaded environment file");
    }

    let config = config::Config::from_env();
    let state = state::AppState::in_memory(config);
    let app = routes::app(state);

    let addr = config.socket_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    info!(%addr, queue = config.client_queue_capacity, "inkboard listening");
    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
