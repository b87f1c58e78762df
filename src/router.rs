use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::shared::AppState;
use crate::websockets::websocket_handler;

/// Liveness text served at the root
pub const LIVENESS: &str = "Room relay is running";

/// Builds the HTTP router: liveness at `/`, WebSocket upgrade at `/ws`
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { LIVENESS }))
        .route("/ws", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
