//! Errors surfaced to clients of the room server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No active room uses the code
    #[error("room '{0}' not found")]
    NotFound(String),

    /// The request is missing something required, e.g. the room code
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for RoomError {
    fn into_response(self) -> Response {
        let status = match self {
            RoomError::NotFound(_) => StatusCode::NOT_FOUND,
            RoomError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
