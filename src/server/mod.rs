pub mod handlers;
pub mod types;

use crate::{Result, config::Config, model::ScoringContext};
use axum::{
    Router,
    routing::{get, post},
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn router(state: handlers::AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/predict", post(handlers::predict))
        .route("/api/score", post(handlers::score))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: Config, context: ScoringContext) -> Result<()> {
    let app_state = handlers::AppState {
        context: Arc::new(context),
        dashboard: Arc::new(config.dashboard.clone()),
    };

    let app = router(app_state);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
