//! `Actor` extractor: who is making the change, and from where.
//!
//! Authentication happens upstream; the gateway forwards the acting user
//! in `X-Actor-Id`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use orderhub_core::error::AppError;
use orderhub_core::types::id::UserId;
use orderhub_service::RequestContext;

use crate::error::ApiError;

/// Header carrying the acting user's id.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// Request context for the acting user.
#[derive(Debug, Clone)]
pub struct Actor(pub RequestContext);

impl std::ops::Deref for Actor {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor_id = match parts.headers.get(ACTOR_HEADER) {
            Some(value) => {
                let raw = value
                    .to_str()
                    .map_err(|_| AppError::validation("X-Actor-Id is not valid text"))?;
                Some(raw.trim().parse::<UserId>().map_err(|_| {
                    AppError::validation(format!("X-Actor-Id is not a valid id: {raw}"))
                })?)
            }
            None => None,
        };

        // First hop of X-Forwarded-For is the client.
        let ip_address = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(Actor(RequestContext::new(actor_id, ip_address)))
    }
}
