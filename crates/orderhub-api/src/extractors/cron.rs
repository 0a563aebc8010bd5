//! `CronCaller` extractor: admits the external scheduler.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use subtle::ConstantTimeEq;

use orderhub_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Proof that the caller presented the configured cron secret.
///
/// With no secret configured every caller is admitted.
#[derive(Debug, Clone, Copy)]
pub struct CronCaller;

impl FromRequestParts<AppState> for CronCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(secret) = state.config.cron.secret.as_deref() else {
            return Ok(CronCaller);
        };

        let token = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::unauthorized("Missing cron bearer token"))?;

        if !bool::from(token.as_bytes().ct_eq(secret.as_bytes())) {
            return Err(AppError::unauthorized("Invalid cron bearer token").into());
        }

        Ok(CronCaller)
    }
}
