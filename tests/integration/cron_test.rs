//! Integration tests for the cron trigger endpoint.

use axum::http::StatusCode;
use chrono::{Duration, Utc};

use orderhub_core::config::AppConfig;
use orderhub_entity::schedule::{Recurrence, ScheduleStatus, ScheduledNotification, TargetFilter};
use orderhub_entity::user::UserRole;

use crate::helpers::TestApp;

const PATH: &str = "/api/cron/scheduled-notifications";

fn secured() -> TestApp {
    let mut config = AppConfig::default();
    config.cron.secret = Some("tick-tock".to_string());
    TestApp::with_config(config)
}

#[tokio::test]
async fn test_processes_due_entries() {
    let app = TestApp::new();
    app.create_user(UserRole::Customer, None).await;
    app.create_user(UserRole::Volunteer, Some("east")).await;
    let schedule = ScheduledNotification::new(
        "Weekly reminder",
        "Check your deliveries",
        TargetFilter::All,
        Recurrence::Weekly,
        Utc::now() - Duration::minutes(5),
    );
    app.store.insert_schedule(schedule.clone()).await;

    let response = app.request("POST", PATH, None, &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["processedCount"], 1);
    assert_eq!(response.body["data"]["errorCount"], 0);
    assert_eq!(app.store.notifications().await.len(), 2);

    let stored = app.store.schedule(schedule.id).await.unwrap();
    assert_eq!(stored.status, ScheduleStatus::Pending);
    assert_eq!(stored.scheduled_for, schedule.scheduled_for + Duration::days(7));
}

#[tokio::test]
async fn test_nothing_due_is_empty_summary() {
    let app = TestApp::new();

    let response = app.request("POST", PATH, None, &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["processedCount"], 0);
}

#[tokio::test]
async fn test_secret_required_when_configured() {
    let app = secured();

    let response = app.request("POST", PATH, None, &[]).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request(
            "POST",
            PATH,
            None,
            &[("authorization", "Bearer wrong".to_string())],
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request(
            "POST",
            PATH,
            None,
            &[("authorization", "Bearer tick-tock".to_string())],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_same_length_wrong_secret_rejected() {
    let app = secured();

    let response = app
        .request(
            "POST",
            PATH,
            None,
            &[("authorization", "Bearer tick-tocK".to_string())],
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "UNAUTHORIZED");
}
