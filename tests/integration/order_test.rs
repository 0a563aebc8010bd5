//! Integration tests for the order status endpoint.

use axum::http::StatusCode;
use serde_json::json;

use orderhub_entity::order::OrderStatus;
use orderhub_entity::user::UserRole;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_confirm_then_cancel_moves_ledger() {
    let app = TestApp::new();
    let volunteer = app.create_user(UserRole::Volunteer, Some("north")).await;
    let order = app
        .create_order(Some(volunteer), 3, OrderStatus::Pending)
        .await;
    let path = format!("/api/orders/{}/status", order.id);

    let response = app
        .request("PATCH", &path, Some(json!({ "status": "confirmed" })), &[])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "confirmed");
    // pending and confirmed are both active, so no units move.
    assert_eq!(app.units(volunteer).await, 0);

    let response = app
        .request("PATCH", &path, Some(json!({ "status": "cancelled" })), &[])
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("PATCH", &path, Some(json!({ "status": "confirmed" })), &[])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.units(volunteer).await, 3);

    let response = app
        .request("PATCH", &path, Some(json!({ "status": "cant_reach" })), &[])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.units(volunteer).await, 0);
}

#[tokio::test]
async fn test_status_change_is_notified_and_audited() {
    let app = TestApp::new();
    let volunteer = app.create_user(UserRole::Volunteer, None).await;
    let actor = app.create_user(UserRole::Admin, None).await;
    let order = app.create_order(Some(volunteer), 2, OrderStatus::Cancelled).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/orders/{}/status", order.id),
            Some(json!({ "status": "delivered", "notes": "left at door" })),
            &[
                ("x-actor-id", actor.to_string()),
                ("x-forwarded-for", "198.51.100.4".to_string()),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["notes"], "left at door");
    assert_eq!(app.units(volunteer).await, 2);

    let audit = app.store.audit_entries().await;
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].actor_id, Some(actor));
    assert_eq!(audit[0].ip_address.as_deref(), Some("198.51.100.4"));
    assert_eq!(audit[0].action, "order.status_change");

    assert!(!app.store.notifications().await.is_empty());
}

#[tokio::test]
async fn test_unknown_status_is_bad_request() {
    let app = TestApp::new();
    let order = app.create_order(None, 1, OrderStatus::Pending).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/orders/{}/status", order.id),
            Some(json!({ "status": "shipped" })),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
    assert_eq!(
        app.store.order(order.id).await.unwrap().status,
        Some(OrderStatus::Pending)
    );
}

#[tokio::test]
async fn test_empty_body_is_bad_request() {
    let app = TestApp::new();
    let order = app.create_order(None, 1, OrderStatus::Pending).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/orders/{}/status", order.id),
            Some(json!({})),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_order_is_not_found() {
    let app = TestApp::new();

    let response = app
        .request(
            "PATCH",
            &format!("/api/orders/{}/status", uuid::Uuid::new_v4()),
            Some(json!({ "status": "confirmed" })),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_actor_header_is_bad_request() {
    let app = TestApp::new();
    let order = app.create_order(None, 1, OrderStatus::Pending).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/orders/{}/status", order.id),
            Some(json!({ "status": "confirmed" })),
            &[("x-actor-id", "admin".to_string())],
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
