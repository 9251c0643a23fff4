mod game;
mod http;
pub mod words;

pub use game::messages;
pub use game::room::RoomConfig;

use axum::{
    Router,
    extract::{State, WebSocketUpgrade, ws::WebSocket},
    response::Response,
    routing::{get, post},
};
use game::registry::RoomRegistry;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use words::WordProvider;

async fn health() -> &'static str {
    "ok"
}

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RoomRegistry>,
    pub words: Arc<dyn WordProvider>,
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    game::ws::handle_connection(socket, state.registry).await;
}

pub fn app(words: Arc<dyn WordProvider>) -> Router {
    app_with_config(words, RoomConfig::default())
}

pub fn app_with_config(words: Arc<dyn WordProvider>, config: RoomConfig) -> Router {
    let registry = RoomRegistry::new(Arc::clone(&words), config);
    let state = AppState { registry, words };

    Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws_handler))
        .route("/create-room", post(http::create_room))
        .route("/join-room", post(http::join_room))
        .route("/rooms", get(http::list_rooms))
        .route("/languages", get(http::list_languages))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
