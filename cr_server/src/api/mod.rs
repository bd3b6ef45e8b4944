//! HTTP surface: the WebSocket endpoint plus a health probe.

pub mod websocket;

use axum::{Router, routing::get};
use card_room::HubHandle;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub hub: HubHandle,
}

/// Build the router. One connection = one session = at most one seat.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(websocket::websocket_handler))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
