//! Shared test helpers for integration tests.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use orderhub_api::{AppState, build_app};
use orderhub_core::config::AppConfig;
use orderhub_core::types::id::UserId;
use orderhub_database::{MemoryStore, Stores};
use orderhub_entity::order::{Order, OrderStatus};
use orderhub_entity::user::{DirectoryUser, UserRole};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing store for direct setup and inspection
    pub store: MemoryStore,
}

impl TestApp {
    /// Create a new test application on the in-memory backend
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a test application with a custom configuration
    pub fn with_config(config: AppConfig) -> Self {
        let store = MemoryStore::new(config.ledger.default_goal);
        let state = AppState::new(config, Stores::memory(store.clone()));
        Self {
            router: build_app(state),
            store,
        }
    }

    /// Insert a user into the directory
    pub async fn create_user(&self, role: UserRole, zone: Option<&str>) -> UserId {
        let id = UserId::new();
        self.store
            .insert_user(DirectoryUser {
                id,
                role,
                zone: zone.map(str::to_string),
            })
            .await;
        id
    }

    /// Insert an order referred by `volunteer`
    pub async fn create_order(
        &self,
        volunteer: Option<UserId>,
        quantity: i32,
        status: OrderStatus,
    ) -> Order {
        let order = Order::new(UserId::new(), volunteer, quantity).with_status(status);
        self.store.insert_order(order.clone()).await;
        order
    }

    /// Confirmed units for `volunteer`, zero when there is no entry
    pub async fn units(&self, volunteer: UserId) -> i32 {
        self.store
            .ledger_entry(volunteer)
            .await
            .map_or(0, |e| e.confirmed_units)
    }

    /// Make a request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, String)],
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        for (name, value) in headers {
            req = req.header(*name, value);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Test response wrapper
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
