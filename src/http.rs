use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::game::room::RoomSummary;
use crate::words::LanguageInfo;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub player_name: String,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RoomCodeResponse {
    pub room_code: String,
}

#[derive(Debug, Deserialize)]
pub struct JoinRoomRequest {
    pub room_code: String,
    pub player_name: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// Create a room and hand back its code. The caller then connects to /ws and
/// sends join_room with the code to actually take a seat.
pub async fn create_room(
    State(state): State<AppState>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<Json<RoomCodeResponse>, (StatusCode, Json<ErrorResponse>)> {
    if request.player_name.trim().is_empty() {
        return Err(bad_request("player_name must not be empty"));
    }

    let language = request
        .language
        .as_deref()
        .unwrap_or(crate::words::DEFAULT_LANGUAGE);
    let handle = state.registry.create_room(language);
    info!(room_code = handle.code(), "Room created over HTTP");

    Ok(Json(RoomCodeResponse {
        room_code: handle.code().to_string(),
    }))
}

/// Resolve a room code before the client opens a socket. 404 when the room
/// does not exist, so the client can show "not found" without a ws round trip.
pub async fn join_room(
    State(state): State<AppState>,
    Json(request): Json<JoinRoomRequest>,
) -> Result<Json<RoomCodeResponse>, (StatusCode, Json<ErrorResponse>)> {
    if request.player_name.trim().is_empty() {
        return Err(bad_request("player_name must not be empty"));
    }

    let room_code = request.room_code.trim().to_uppercase();
    if state.registry.get(&room_code).is_none() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "room not found".to_string(),
            }),
        ));
    }

    Ok(Json(RoomCodeResponse { room_code }))
}

pub async fn list_rooms(State(state): State<AppState>) -> Json<Vec<RoomSummary>> {
    Json(state.registry.summaries().await)
}

pub async fn list_languages(State(state): State<AppState>) -> Json<Vec<LanguageInfo>> {
    Json(state.words.available_languages())
}
