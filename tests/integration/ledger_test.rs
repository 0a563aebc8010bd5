//! Integration tests for ledger reads and health.

use axum::http::StatusCode;
use serde_json::json;

use orderhub_core::types::id::UserId;
use orderhub_entity::order::OrderStatus;
use orderhub_entity::user::UserRole;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_progress_after_confirmation() {
    let app = TestApp::new();
    let volunteer = app.create_user(UserRole::Volunteer, None).await;
    let order = app
        .create_order(Some(volunteer), 5, OrderStatus::CantReach)
        .await;

    app.request(
        "PATCH",
        &format!("/api/orders/{}/status", order.id),
        Some(json!({ "status": "confirmed" })),
        &[],
    )
    .await;

    let response = app
        .request("GET", &format!("/api/volunteers/{volunteer}/progress"), None, &[])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["confirmed_units"], 5);
    assert_eq!(response.body["data"]["goal"], 20);
    assert_eq!(response.body["data"]["remaining"], 15);
    assert_eq!(response.body["data"]["goal_reached"], false);
}

#[tokio::test]
async fn test_progress_without_entry_is_not_found() {
    let app = TestApp::new();

    let response = app
        .request(
            "GET",
            &format!("/api/volunteers/{}/progress", UserId::new()),
            None,
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_on_memory_backend() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/health", None, &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
}
