//! Commission ledger handlers.

use axum::Json;
use axum::extract::{Path, State};

use orderhub_core::types::id::UserId;

use crate::dto::response::{ApiResponse, ProgressResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/volunteers/{id}/progress
pub async fn get_progress(
    State(state): State<AppState>,
    Path(volunteer_id): Path<UserId>,
) -> Result<Json<ApiResponse<ProgressResponse>>, ApiError> {
    let entry = state.ledger_service.get(volunteer_id).await?;
    Ok(Json(ApiResponse::ok(entry.into())))
}
