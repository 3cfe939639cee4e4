#![allow(dead_code)]

pub mod memory;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use secrecy::Secret;
use serde_json::Value;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use tower::ServiceExt;
use toy_service::config::{CorsConfig, MongoConfig, ToyConfig};
use toy_service::services::MongoDb;
use toy_service::startup::{build_router, AppState, Application};
use uuid::Uuid;

pub use memory::InMemoryStore;

pub fn test_config(db_name: &str) -> ToyConfig {
    ToyConfig {
        common: CoreConfig {
            port: 0, // Random port for testing
            log_level: "info".to_string(),
        },
        service_name: "toy-service-test".to_string(),
        mongodb: MongoConfig {
            uri: Secret::new(
                std::env::var("TEST_MONGODB_URI")
                    .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            ),
            database: db_name.to_string(),
            collection: "toys".to_string(),
        },
        cors: CorsConfig {
            allowed_origins: vec!["*".to_string()],
        },
        otlp_endpoint: None,
    }
}

/// Router backed by an in-memory store; no database needed.
pub fn memory_app(store: Arc<InMemoryStore>) -> Router {
    build_router(AppState {
        config: test_config("unused"),
        store,
    })
}

/// Sends one request through the router and decodes the JSON body
/// (`Value::Null` when the body is empty or not JSON).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Router failed to respond");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build request")
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build request")
}

/// Full application against a real MongoDB (`TEST_MONGODB_URI`).
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: MongoDb,
    pub db_name: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let db_name = format!("toy_test_{}", Uuid::new_v4().simple());
        let config = test_config(&db_name);

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let db = app.db().clone();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling the liveness endpoint
        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client.get(&address).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            db,
            db_name,
        }
    }

    /// Cleanup test database after test completes.
    pub async fn cleanup(&self) {
        let _ = self.db.client().database(&self.db_name).drop(None).await;
    }
}
