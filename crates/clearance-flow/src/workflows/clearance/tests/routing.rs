use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::workflows::clearance::router::clearance_router;

async fn read_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    serde_json::from_slice(&body).expect("json body")
}

fn json_request(method: &str, uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&payload).expect("serialize")))
        .expect("request")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn post_round_returns_the_catalog_snapshot() {
    let world = world();
    let router = clearance_router(world.app.clone());

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/clearance-rounds",
            json!({ "semester": "1st Semester", "academic_year": "2025-2026" }),
        ))
        .await
        .expect("dispatch");
    assert_eq!(response.status(), StatusCode::CREATED);

    let payload = read_json(response).await;
    assert_eq!(payload["semester"], json!("1st Semester"));
    assert_eq!(
        payload["programs"].as_array().map(Vec::len),
        Some(2),
        "both catalog programs snapshotted"
    );

    let response = router
        .oneshot(get_request("/api/v1/clearance-rounds/latest"))
        .await
        .expect("dispatch");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn latest_round_is_404_before_any_exist() {
    let world = world();
    let router = clearance_router(world.app.clone());

    let response = router
        .oneshot(get_request("/api/v1/clearance-rounds/latest"))
        .await
        .expect("dispatch");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_enrollment_maps_to_conflict() {
    let world = world();
    open_round(&world);
    let router = clearance_router(world.app.clone());
    let payload = json!({ "student_id": world.maria.id.0 });

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/student-clearances",
            payload.clone(),
        ))
        .await
        .expect("dispatch");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json(response).await;
    let enrollment_id = created["id"].as_u64().expect("enrollment id");

    let response = router
        .clone()
        .oneshot(json_request("POST", "/api/v1/student-clearances", payload))
        .await
        .expect("dispatch");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = router
        .oneshot(json_request(
            "PATCH",
            &format!("/api/v1/student-clearances/{enrollment_id}"),
            json!({ "status": "Cleared" }),
        ))
        .await
        .expect("dispatch");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn lookup_reports_no_signature_yet() {
    let world = world();
    open_round(&world);
    enroll(&world, world.maria.id);
    let router = clearance_router(world.app.clone());

    let response = router
        .oneshot(get_request(&format!(
            "/api/v1/clearance-signatures/lookup/{}/{}",
            world.maria.id.0, world.iron_club.id.0
        )))
        .await
        .expect("dispatch");
    assert_eq!(response.status(), StatusCode::OK);

    let payload = read_json(response).await;
    assert_eq!(payload["message"], json!("No signature yet"));
}

#[tokio::test]
async fn approval_and_receipt_reset_over_http() {
    let world = world();
    open_round(&world);
    enroll(&world, world.maria.id);
    let record = record_for(&world, world.maria.id, world.iron_club.id);
    staff_signature_on_file(&world);
    let router = clearance_router(world.app.clone());

    let response = router
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/v1/clearance-signatures/{}", record.id.0),
            json!({ "status": "Approved", "staff_id": world.staff.id.0 }),
        ))
        .await
        .expect("dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let approved = read_json(response).await;
    assert_eq!(approved["status"], json!("Approved"));
    assert!(approved["signature"].is_object(), "signature view attached");

    let response = router
        .oneshot(json_request(
            "PATCH",
            &format!("/api/v1/clearance-signatures/{}/receipt", record.id.0),
            json!({ "receipt": { "filename": "gym-fee-v2.png", "content": [137, 80, 78, 71] } }),
        ))
        .await
        .expect("dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let reset = read_json(response).await;
    assert_eq!(reset["status"], json!("Pending"));
    assert_eq!(reset["feedback"], json!(""));
}

#[tokio::test]
async fn filter_query_narrows_over_http() {
    let world = world();
    open_round(&world);
    enroll(&world, world.maria.id);
    enroll(&world, world.juan.id);
    record_for(&world, world.maria.id, world.iron_club.id);
    record_for(&world, world.juan.id, world.fuel_club.id);
    let router = clearance_router(world.app.clone());

    let response = router
        .clone()
        .oneshot(get_request("/api/v1/clearance-signatures?program=iron"))
        .await
        .expect("dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    let records = payload.as_array().expect("array payload");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["program"]["name"], json!("Iron Club"));

    let response = router
        .oneshot(get_request(
            "/api/v1/clearance-signatures?program=none&last_name=none&year_level=none",
        ))
        .await
        .expect("dispatch");
    let payload = read_json(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn feedback_endpoint_is_404_when_nothing_qualifies() {
    let world = world();
    open_round(&world);
    enroll(&world, world.maria.id);
    record_for(&world, world.maria.id, world.iron_club.id);
    let router = clearance_router(world.app.clone());

    let response = router
        .oneshot(get_request(&format!(
            "/api/v1/feedback/{}/{}",
            world.iron_club.id.0, world.maria.id.0
        )))
        .await
        .expect("dispatch");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
