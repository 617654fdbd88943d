//! HTTP surface of the room server: room creation and lookup, plus the
//! WebSocket endpoint clients use to take part in a room.

use axum::{
    extract::{
        rejection::JsonRejection,
        ws::{rejection::WebSocketUpgradeRejection, WebSocketUpgrade},
        Query, State,
    },
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::{error::RoomError, room_manager::RoomCode, session, AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    pub code: RoomCode,
}

#[derive(Debug, Deserialize)]
pub struct JoinRoomRequest {
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomResponse {
    pub code: RoomCode,
    pub users: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RoomSocketQuery {
    pub code: Option<String>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/rooms/create", post(create_room))
        .route("/api/rooms/join", post(join_room))
        .route("/api/health", get(health))
        .route("/ws/room", get(room_socket))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// POST /api/rooms/create
async fn create_room(State(state): State<AppState>) -> Json<CreateRoomResponse> {
    let room = state.room_manager.create_room().await;

    Json(CreateRoomResponse {
        code: room.code().clone(),
    })
}

/// POST /api/rooms/join
async fn join_room(
    State(state): State<AppState>,
    body: Result<Json<JoinRoomRequest>, JsonRejection>,
) -> Result<Json<JoinRoomResponse>, RoomError> {
    let Json(request) = body.map_err(|rejection| RoomError::BadRequest(rejection.body_text()))?;

    if request.code.is_empty() {
        return Err(RoomError::BadRequest(String::from("room code required")));
    }

    let room = state.room_manager.join_room(&request.code).await?;

    Ok(Json(JoinRoomResponse {
        code: room.code().clone(),
        users: room.user_count().await,
        created_at: room.created_at(),
    }))
}

/// GET /api/health
async fn health() -> &'static str {
    "OK"
}

/// GET /ws/room?code=XXXXXX
///
/// The code is checked before the upgrade: an unknown room answers 404 and the
/// connection is never upgraded.
async fn room_socket(
    State(state): State<AppState>,
    Query(query): Query<RoomSocketQuery>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, RoomError> {
    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| RoomError::BadRequest(String::from("room code required")))?;

    let room = state.room_manager.join_room(&code).await?;

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let room_manager = state.room_manager.clone();
    let outbound_capacity = state.outbound_capacity;
    let quit_rx = state.quit_tx.subscribe();

    Ok(ws.on_upgrade(move |socket| async move {
        if let Err(e) =
            session::handle_user_session(room_manager, room, outbound_capacity, quit_rx, socket)
                .await
        {
            debug!(room = %code, "session ended with an error: {:#}", e);
        }
    }))
}
