//! Common test utilities for integration tests.
//!
//! Builds the full router over the in-memory repository so the HTTP surface can
//! be driven with `tower::ServiceExt::oneshot` without a database.

// Not every helper is used by every test binary.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use domain::InMemoryReportRequestRepository;
use report_system_api::app::{create_app, Storage};
use report_system_api::config::{
    Config, DatabaseConfig, LoggingConfig, ServerConfig, StorageBackendKind, StorageConfig,
};
use serde_json::Value;
use tower::ServiceExt;

/// Test configuration using the in-memory backend.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            cors_origins: vec![],
        },
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 10,
            idle_timeout_secs: 60,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        storage: StorageConfig {
            backend: StorageBackendKind::Memory,
        },
    }
}

/// Router plus a handle on the repository behind it.
#[derive(Clone)]
pub struct TestApp {
    pub router: Router,
    pub repository: InMemoryReportRequestRepository,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_repository(InMemoryReportRequestRepository::new())
    }

    pub fn with_repository(repository: InMemoryReportRequestRepository) -> Self {
        let router = create_app(test_config(), Storage::Memory(repository.clone()));
        Self { router, repository }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            location,
            body,
        }
    }

    /// Submit a report request and return its id.
    pub async fn submit(&self, report_type: &str) -> String {
        let response = self
            .send(post_json(
                "/api/v1/report-requests",
                serde_json::json!({
                    "reportType": report_type,
                    "parameters": r#"{"month":10,"year":2024}"#,
                }),
            ))
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body["id"]
            .as_str()
            .expect("id in response")
            .to_string()
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Value,
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

pub fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}
