//! Report request endpoint integration tests.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{get, post_empty, post_json, TestApp};
use domain::models::ReportStatus;
use domain::{InMemoryReportRequestRepository, ReportRequestRepository};
use fake::faker::lorem::en::Word;
use fake::Fake;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_create_returns_created_with_location() {
    let app = TestApp::new();

    let response = app
        .send(post_json(
            "/api/v1/report-requests",
            json!({ "reportType": "MonthlySales", "parameters": "{\"month\":10,\"year\":2024}" }),
        ))
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let id = response.body["id"].as_str().unwrap();
    assert!(Uuid::parse_str(id).is_ok());
    assert_eq!(
        response.location.as_deref(),
        Some(format!("/api/v1/report-requests/{id}").as_str())
    );

    let stored = app
        .repository
        .get_by_id(Uuid::parse_str(id).unwrap())
        .await
        .unwrap();
    assert_eq!(stored.status(), ReportStatus::Pending);
    assert_eq!(stored.user_id(), "user-123");
    assert_eq!(stored.parameters(), "{\"month\":10,\"year\":2024}");
}

#[tokio::test]
async fn test_create_uses_user_id_header() {
    let app = TestApp::new();

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/report-requests")
        .header("content-type", "application/json")
        .header("X-User-Id", "alice")
        .body(Body::from(
            json!({ "reportType": "Inventory", "parameters": "{}" }).to_string(),
        ))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::CREATED);

    let id = response.body["id"].as_str().unwrap().to_string();
    let view = app.send(get(&format!("/api/v1/report-requests/{id}"))).await;
    assert_eq!(view.body["userId"], "alice");
}

#[tokio::test]
async fn test_create_rejects_invalid_report_type() {
    let app = TestApp::new();

    let too_long = "a".repeat(101);
    for report_type in ["", "   ", too_long.as_str()] {
        let response = app
            .send(post_json(
                "/api/v1/report-requests",
                json!({ "reportType": report_type, "parameters": "{}" }),
            ))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{report_type:?}");
        assert_eq!(response.body["error"], "validation_error");
    }

    assert!(app.repository.is_empty().await);
}

#[tokio::test]
async fn test_create_accepts_report_type_at_limit() {
    let app = TestApp::new();
    let response = app
        .send(post_json(
            "/api/v1/report-requests",
            json!({ "reportType": "a".repeat(100), "parameters": "{}" }),
        ))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_create_rejects_nul_characters() {
    let app = TestApp::new();

    for body in [
        json!({ "reportType": "MonthlySales", "parameters": "{\"note\":\"a\u{0}b\"}" }),
        json!({ "reportType": "Monthly\u{0}Sales", "parameters": "{}" }),
    ] {
        let response = app.send(post_json("/api/v1/report-requests", body)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body["error"], "validation_error");
    }

    assert!(app.repository.is_empty().await);
}

#[tokio::test]
async fn test_fail_with_nul_message_is_bad_request() {
    let app = TestApp::new();
    let id = app.submit("MonthlySales").await;
    app.send(post_empty(&format!("/api/v1/report-requests/{id}/processing")))
        .await;

    let response = app
        .send(post_json(
            &format!("/api/v1/report-requests/{id}/failure"),
            json!({ "errorMessage": "render\u{0}timeout" }),
        ))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "validation_error");

    let view = app.send(get(&format!("/api/v1/report-requests/{id}"))).await;
    assert_eq!(view.body["status"], "processing");
}

#[tokio::test]
async fn test_create_storage_failure_is_internal_error() {
    let app = TestApp::with_repository(InMemoryReportRequestRepository::failing());

    let response = app
        .send(post_json(
            "/api/v1/report-requests",
            json!({ "reportType": "MonthlySales", "parameters": "{}" }),
        ))
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "internal_error");
    assert_eq!(response.body["message"], "An internal error occurred");
}

#[tokio::test]
async fn test_get_returns_pending_view() {
    let app = TestApp::new();
    let id = app.submit("MonthlySales").await;

    let response = app.send(get(&format!("/api/v1/report-requests/{id}"))).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], id.as_str());
    assert_eq!(response.body["status"], "pending");
    assert_eq!(response.body["reportType"], "MonthlySales");
    assert!(response.body["processedAtUtc"].is_null());
    assert!(response.body["reportUrl"].is_null());
    assert!(response.body["errorMessage"].is_null());
}

#[tokio::test]
async fn test_get_unknown_is_not_found() {
    let app = TestApp::new();
    let response = app
        .send(get(&format!("/api/v1/report-requests/{}", Uuid::new_v4())))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "not_found");
}

#[tokio::test]
async fn test_successful_lifecycle() {
    let app = TestApp::new();
    let report_type: String = Word().fake();
    let id = app.submit(&report_type).await;

    let processing = app
        .send(post_empty(&format!("/api/v1/report-requests/{id}/processing")))
        .await;
    assert_eq!(processing.status, StatusCode::OK);
    assert_eq!(processing.body["status"], "processing");
    assert!(processing.body["processedAtUtc"].is_string());

    let completed = app
        .send(post_json(
            &format!("/api/v1/report-requests/{id}/completion"),
            json!({ "reportUrl": "https://example/report.pdf" }),
        ))
        .await;
    assert_eq!(completed.status, StatusCode::OK);
    assert_eq!(completed.body["status"], "completed");
    assert_eq!(completed.body["reportUrl"], "https://example/report.pdf");
    assert!(completed.body["errorMessage"].is_null());

    let view = app.send(get(&format!("/api/v1/report-requests/{id}"))).await;
    assert_eq!(view.body, completed.body);
}

#[tokio::test]
async fn test_failed_lifecycle() {
    let app = TestApp::new();
    let id = app.submit("MonthlySales").await;

    app.send(post_empty(&format!("/api/v1/report-requests/{id}/processing")))
        .await;
    let failed = app
        .send(post_json(
            &format!("/api/v1/report-requests/{id}/failure"),
            json!({ "errorMessage": "render timeout" }),
        ))
        .await;

    assert_eq!(failed.status, StatusCode::OK);
    assert_eq!(failed.body["status"], "failed");
    assert_eq!(failed.body["errorMessage"], "render timeout");
    assert!(failed.body["reportUrl"].is_null());
}

#[tokio::test]
async fn test_long_error_message_is_truncated() {
    let app = TestApp::new();
    let id = app.submit("MonthlySales").await;
    app.send(post_empty(&format!("/api/v1/report-requests/{id}/processing")))
        .await;

    let failed = app
        .send(post_json(
            &format!("/api/v1/report-requests/{id}/failure"),
            json!({ "errorMessage": "e".repeat(1500) }),
        ))
        .await;

    assert_eq!(failed.status, StatusCode::OK);
    assert_eq!(
        failed.body["errorMessage"].as_str().unwrap().chars().count(),
        1000
    );
}

#[tokio::test]
async fn test_complete_from_pending_is_conflict_and_state_unchanged() {
    let app = TestApp::new();
    let id = app.submit("MonthlySales").await;

    let response = app
        .send(post_json(
            &format!("/api/v1/report-requests/{id}/completion"),
            json!({ "reportUrl": "https://example/report.pdf" }),
        ))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "conflict");

    let view = app.send(get(&format!("/api/v1/report-requests/{id}"))).await;
    assert_eq!(view.body["status"], "pending");
    assert!(view.body["reportUrl"].is_null());
}

#[tokio::test]
async fn test_start_processing_twice_is_conflict() {
    let app = TestApp::new();
    let id = app.submit("MonthlySales").await;
    let uri = format!("/api/v1/report-requests/{id}/processing");

    assert_eq!(app.send(post_empty(&uri)).await.status, StatusCode::OK);
    assert_eq!(app.send(post_empty(&uri)).await.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_terminal_request_rejects_further_transitions() {
    let app = TestApp::new();
    let id = app.submit("MonthlySales").await;
    app.send(post_empty(&format!("/api/v1/report-requests/{id}/processing")))
        .await;
    app.send(post_json(
        &format!("/api/v1/report-requests/{id}/failure"),
        json!({ "errorMessage": "render timeout" }),
    ))
    .await;

    let response = app
        .send(post_json(
            &format!("/api/v1/report-requests/{id}/completion"),
            json!({ "reportUrl": "https://example/report.pdf" }),
        ))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let view = app.send(get(&format!("/api/v1/report-requests/{id}"))).await;
    assert_eq!(view.body["status"], "failed");
    assert_eq!(view.body["errorMessage"], "render timeout");
}

#[tokio::test]
async fn test_complete_with_blank_url_is_bad_request() {
    let app = TestApp::new();
    let id = app.submit("MonthlySales").await;
    app.send(post_empty(&format!("/api/v1/report-requests/{id}/processing")))
        .await;

    let response = app
        .send(post_json(
            &format!("/api/v1/report-requests/{id}/completion"),
            json!({ "reportUrl": "  " }),
        ))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let view = app.send(get(&format!("/api/v1/report-requests/{id}"))).await;
    assert_eq!(view.body["status"], "processing");
}

#[tokio::test]
async fn test_transition_on_unknown_id_is_not_found() {
    let app = TestApp::new();
    let response = app
        .send(post_empty(&format!(
            "/api/v1/report-requests/{}/processing",
            Uuid::new_v4()
        )))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_concurrent_submissions_get_distinct_ids() {
    let app = TestApp::new();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let app = app.clone();
        handles.push(tokio::spawn(
            async move { app.submit("MonthlySales").await },
        ));
    }

    let mut ids = std::collections::HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap());
    }

    assert_eq!(ids.len(), 20);
    assert_eq!(app.repository.len().await, 20);
}
