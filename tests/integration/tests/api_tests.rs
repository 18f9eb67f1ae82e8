//! API Integration Tests
//!
//! Each test spawns its own server on the memory backend, so no external
//! services are needed.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use futures::future::join_all;
use integration_tests::{assert_error, assert_json, fixtures::*, TestServer, STAFF};
use reqwest::StatusCode;
use serde_json::json;

async fn published_event(server: &TestServer, capacity: Option<i64>) -> EventBody {
    let response = server
        .post_staff("/api/v1/events", &CreateEventRequest::upcoming(capacity))
        .await
        .unwrap();
    let event: EventBody = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .post_staff_empty(&format!("/api/v1/events/{}/publish", event.id))
        .await
        .unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

async fn submit(server: &TestServer, event_id: &str) -> RegistrationBody {
    let response = server
        .post(
            &format!("/api/v1/events/{event_id}/registrations"),
            &RegistrantRequest::unique(),
        )
        .await
        .unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

async fn ledger(server: &TestServer, event_id: &str) -> LedgerBody {
    let response = server
        .get(&format!("/api/v1/events/{event_id}/ledger"))
        .await
        .unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/health").await.unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "healthy");

    let response = server.get("/health/ready").await.unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["checks"]["storage"], "healthy");
}

#[tokio::test]
async fn test_request_id_is_returned() {
    let server = TestServer::start().await.unwrap();
    let response = server.get("/api/v1/events").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

// ============================================================================
// Event Lifecycle Tests
// ============================================================================

#[tokio::test]
async fn test_event_lifecycle() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .post_staff("/api/v1/events", &CreateEventRequest::upcoming(Some(30)))
        .await
        .unwrap();
    let event: EventBody = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(event.status, "draft");
    assert_eq!(event.capacity, Some(30));
    assert_eq!(event.created_by, STAFF);

    let base = format!("/api/v1/events/{}", event.id);
    let response = server.post_staff_empty(&format!("{base}/publish")).await.unwrap();
    let event: EventBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(event.status, "published");

    let response = server.post_staff_empty(&format!("{base}/close")).await.unwrap();
    let event: EventBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(event.status, "closed");

    let response = server.post_staff_empty(&format!("{base}/publish")).await.unwrap();
    let code = assert_error(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(code, "INVALID_TRANSITION");

    let response = server.post_staff_empty(&format!("{base}/cancel")).await.unwrap();
    let event: EventBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(event.status, "canceled");
}

#[tokio::test]
async fn test_staff_routes_require_actor() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .post("/api/v1/events", &CreateEventRequest::upcoming(None))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "MISSING_ACTOR");
}

#[tokio::test]
async fn test_create_event_validation() {
    let server = TestServer::start().await.unwrap();

    let mut request = CreateEventRequest::upcoming(Some(0));
    let response = server.post_staff("/api/v1/events", &request).await.unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "VALIDATION_ERROR");

    request.capacity = Some(10);
    request.ends_at = request.starts_at;
    let response = server.post_staff("/api/v1/events", &request).await.unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_SCHEDULE");
}

#[tokio::test]
async fn test_published_event_structural_edit_refused() {
    let server = TestServer::start().await.unwrap();
    let event = published_event(&server, Some(10)).await;
    let path = format!("/api/v1/events/{}", event.id);

    let response = server
        .patch_staff(&path, &json!({ "title": "Renamed" }))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(code, "EVENT_NOT_EDITABLE");

    let response = server
        .patch_staff(&path, &json!({ "description": "Bring a lantern" }))
        .await
        .unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["description"], "Bring a lantern");
}

// ============================================================================
// Registration and Capacity Tests
// ============================================================================

#[tokio::test]
async fn test_waitlist_and_promotion() {
    let server = TestServer::start().await.unwrap();
    let event = published_event(&server, Some(2)).await;

    let first = submit(&server, &event.id).await;
    let second = submit(&server, &event.id).await;
    let third = submit(&server, &event.id).await;
    assert_eq!(first.status, "registered");
    assert_eq!(second.status, "registered");
    assert_eq!(third.status, "waitlist");
    assert_eq!(third.source, "self-service");

    let counters = ledger(&server, &event.id).await;
    assert_eq!(counters.confirmed_count, 2);
    assert_eq!(counters.waitlist_count, 1);
    assert_eq!(counters.remaining, Some(0));

    let response = server
        .post_empty(&format!("/api/v1/registrations/{}/cancel", first.id))
        .await
        .unwrap();
    let change: RegistrationChangeBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(change.registration.status, "canceled");
    let promoted = change.promoted.expect("waitlisted registrant promoted");
    assert_eq!(promoted.id, third.id);
    assert_eq!(promoted.status, "registered");

    let counters = ledger(&server, &event.id).await;
    assert_eq!(counters.confirmed_count, 2);
    assert_eq!(counters.waitlist_count, 0);

    let response = server
        .post_empty(&format!("/api/v1/registrations/{}/cancel", first.id))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(code, "ALREADY_CANCELED");
}

#[tokio::test]
async fn test_registration_refused_for_draft() {
    let server = TestServer::start().await.unwrap();
    let response = server
        .post_staff("/api/v1/events", &CreateEventRequest::upcoming(Some(5)))
        .await
        .unwrap();
    let event: EventBody = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .post(
            &format!("/api/v1/events/{}/registrations", event.id),
            &RegistrantRequest::unique(),
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(code, "EVENT_NOT_ACCEPTING_REGISTRATIONS");
    assert_eq!(ledger(&server, &event.id).await.confirmed_count, 0);
}

#[tokio::test]
async fn test_invalid_registrant_rejected() {
    let server = TestServer::start().await.unwrap();
    let event = published_event(&server, None).await;

    let response = server
        .post(
            &format!("/api/v1/events/{}/registrations", event.id),
            &json!({ "name": "", "phone": "0912345678", "email": "not-an-email" }),
        )
        .await
        .unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"].is_object());
}

#[tokio::test]
async fn test_manual_registration_and_status_override() {
    let server = TestServer::start().await.unwrap();
    let event = published_event(&server, Some(1)).await;

    let response = server
        .post_staff(
            &format!("/api/v1/events/{}/registrations/manual", event.id),
            &RegistrantRequest::unique(),
        )
        .await
        .unwrap();
    let seated: RegistrationBody = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(seated.source, "staff-manual");
    assert_eq!(seated.status, "registered");

    let waiting = submit(&server, &event.id).await;
    assert_eq!(waiting.status, "waitlist");

    let status_path = format!("/api/v1/registrations/{}/status", waiting.id);
    let response = server
        .put_staff(&status_path, &json!({ "status": "registered" }))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(code, "EVENT_FULL");

    let response = server
        .put_staff(
            &format!("/api/v1/registrations/{}/status", seated.id),
            &json!({ "status": "waitlist" }),
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(code, "INVALID_STATUS_CHANGE");

    let response = server
        .put_staff(
            &format!("/api/v1/registrations/{}/status", seated.id),
            &json!({ "status": "canceled" }),
        )
        .await
        .unwrap();
    let change: RegistrationChangeBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(change.promoted.map(|r| r.id), Some(waiting.id));
}

#[tokio::test]
async fn test_resize_capacity() {
    let server = TestServer::start().await.unwrap();
    let event = published_event(&server, Some(1)).await;
    submit(&server, &event.id).await;
    submit(&server, &event.id).await;
    submit(&server, &event.id).await;

    let path = format!("/api/v1/events/{}/capacity", event.id);
    let response = server
        .put_staff(&path, &json!({ "capacity": 0 }))
        .await
        .unwrap();
    assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();

    let response = server
        .put_staff(&path, &json!({ "capacity": 2 }))
        .await
        .unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["event"]["capacity"], 2);
    assert_eq!(body["ledger"]["confirmed_count"], 2);
    assert_eq!(body["promoted"].as_array().map(Vec::len), Some(1));

    let response = server
        .put_staff(&path, &json!({ "capacity": null }))
        .await
        .unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(body["event"]["capacity"].is_null());
    assert_eq!(body["ledger"]["waitlist_count"], 0);

    let counters = ledger(&server, &event.id).await;
    assert_eq!(counters.capacity, None);
    assert_eq!(counters.confirmed_count, 3);
}

#[tokio::test]
async fn test_concurrent_submissions_over_http() {
    let server = TestServer::start().await.unwrap();
    let event = published_event(&server, Some(5)).await;

    let results = join_all((0..20).map(|_| submit(&server, &event.id))).await;
    let confirmed = results.iter().filter(|r| r.status == "registered").count();
    assert_eq!(confirmed, 5);

    let counters = ledger(&server, &event.id).await;
    assert_eq!(counters.confirmed_count, 5);
    assert_eq!(counters.waitlist_count, 15);

    let response = server
        .get_staff(&format!("/api/v1/events/{}/ledger/verify", event.id))
        .await
        .unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["consistent"], true);
}

// ============================================================================
// Check-in Tests
// ============================================================================

#[tokio::test]
async fn test_check_in_and_undo() {
    let server = TestServer::start().await.unwrap();
    let event = published_event(&server, Some(3)).await;
    let registration = submit(&server, &event.id).await;
    let base = format!("/api/v1/registrations/{}", registration.id);

    let response = server.post_empty(&format!("{base}/check-in")).await.unwrap();
    let record: CheckInBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(record.action, "checked-in");
    assert_eq!(record.actor, "system");
    assert!(record.is_current);

    // Repeat is a no-op
    let response = server.post_staff_empty(&format!("{base}/check-in")).await.unwrap();
    let again: CheckInBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(again.actor, "system");
    assert_eq!(ledger(&server, &event.id).await.checked_in_count, 1);

    let response = server.post_staff_empty(&format!("{base}/check-in/undo")).await.unwrap();
    let undo: CheckInBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(undo.action, "undone");
    assert_eq!(undo.actor, STAFF);

    let response = server.get(&format!("{base}/check-in")).await.unwrap();
    let status: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(status["checked_in"], false);

    let response = server.get(&format!("{base}/check-ins")).await.unwrap();
    let history: Vec<CheckInBody> = assert_json(response, StatusCode::OK).await.unwrap();
    let actions: Vec<_> = history.iter().map(|r| r.action.as_str()).collect();
    assert_eq!(actions, ["checked-in", "undone"]);

    let response = server.post_staff_empty(&format!("{base}/check-in/undo")).await.unwrap();
    let code = assert_error(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(code, "NOT_CHECKED_IN");
}

#[tokio::test]
async fn test_waitlisted_cannot_check_in() {
    let server = TestServer::start().await.unwrap();
    let event = published_event(&server, Some(1)).await;
    submit(&server, &event.id).await;
    let waiting = submit(&server, &event.id).await;

    let response = server
        .post_staff_empty(&format!("/api/v1/registrations/{}/check-in", waiting.id))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(code, "INELIGIBLE_FOR_CHECK_IN");
}

// ============================================================================
// Listing and Lookup Tests
// ============================================================================

#[tokio::test]
async fn test_list_registrations_paginated() {
    let server = TestServer::start().await.unwrap();
    let event = published_event(&server, Some(2)).await;
    for _ in 0..5 {
        submit(&server, &event.id).await;
    }

    let path = format!("/api/v1/events/{}/registrations", event.id);
    let response = server
        .get_staff(&format!("{path}?page=2&page_size=2"))
        .await
        .unwrap();
    let page: PageBody<RegistrationBody> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.pagination.page, 2);
    assert_eq!(page.pagination.page_size, 2);
    assert_eq!(page.pagination.total, 5);
    assert_eq!(page.pagination.total_pages, 3);
    assert!(page.data.iter().all(|r| r.event_id == event.id));

    let response = server
        .get_staff(&format!("{path}?status=waitlist"))
        .await
        .unwrap();
    let page: PageBody<RegistrationBody> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(page.pagination.total, 3);

    let response = server.get(&path).await.unwrap();
    assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_list_events_with_counts() {
    let server = TestServer::start().await.unwrap();
    let event = published_event(&server, Some(4)).await;
    submit(&server, &event.id).await;

    let response = server
        .get("/api/v1/events?status=published&page_size=500")
        .await
        .unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["pagination"]["page_size"], 100);
    let row = &body["data"][0];
    assert_eq!(row["id"], event.id.as_str());
    assert_eq!(row["confirmed_count"], 1);
}

#[tokio::test]
async fn test_unknown_and_malformed_ids() {
    let server = TestServer::start().await.unwrap();

    let response = server.get("/api/v1/events/123456").await.unwrap();
    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "UNKNOWN_EVENT");

    let response = server.get("/api/v1/registrations/123456").await.unwrap();
    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "UNKNOWN_REGISTRATION");

    let response = server.get("/api/v1/events/not-a-number").await.unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_PATH_PARAMETER");
}
