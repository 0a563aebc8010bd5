//! External cron trigger handlers.

use axum::Json;
use axum::extract::State;
use chrono::Utc;

use orderhub_service::ProcessSummary;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::CronCaller;
use crate::state::AppState;

/// POST /api/cron/scheduled-notifications
pub async fn process_scheduled_notifications(
    State(state): State<AppState>,
    _caller: CronCaller,
) -> Result<Json<ApiResponse<ProcessSummary>>, ApiError> {
    let summary = state.processor.process_due(Utc::now()).await?;
    Ok(Json(ApiResponse::ok(summary)))
}
