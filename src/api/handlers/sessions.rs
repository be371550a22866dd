use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use super::ApiResponse;
use crate::errors::AppError;
use crate::services::session_store::SessionHistory;
use crate::AppState;

pub async fn history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SessionHistory>>, AppError> {
    state
        .sessions
        .history(&id)
        .await
        .map(|h| Json(ApiResponse::ok(h)))
        .ok_or_else(|| AppError::NotFound(format!("session {id}")))
}
