mod routes;
mod state;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("INVITE_LOG")
                .unwrap_or_else(|_| EnvFilter::new("invite_server=info,invite_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let state = AppState::load()?;
    let addr = state.config().server.address;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::invites::router())
        .with_state(state)
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("invite-server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
