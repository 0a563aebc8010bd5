//! Order handlers.

use axum::Json;
use axum::extract::{Path, State};
use validator::Validate;

use orderhub_core::error::AppError;
use orderhub_core::types::id::OrderId;
use orderhub_entity::order::Order;

use crate::dto::request::UpdateOrderStatusRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::Actor;
use crate::state::AppState;

/// PATCH /api/orders/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    actor: Actor,
    Path(order_id): Path<OrderId>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<Json<ApiResponse<Order>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let order = state
        .reconciler
        .reconcile(&actor, req.into_reconcile(order_id))
        .await?;
    Ok(Json(ApiResponse::ok(order)))
}
