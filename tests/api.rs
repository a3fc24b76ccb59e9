use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Datelike, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use taetae_api::{build_router, config::Config, store::MemoryRecordStore, AppState};

const ADMIN_KEY: &str = "test-admin-key";

fn app() -> Router {
    let state = AppState::new(
        Arc::new(MemoryRecordStore::new()),
        Arc::new(Config::for_tests(ADMIN_KEY)),
    );
    build_router(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>, admin: bool) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if admin {
        builder = builder.header("x-admin-key", ADMIN_KEY);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn ten_years_ago() -> String {
    let today = Utc::now().date_naive();
    today
        .with_year(today.year() - 10)
        .unwrap_or_else(|| today - chrono::Duration::days(3652))
        .format("%Y-%m-%d")
        .to_string()
}

fn boy_body() -> Value {
    json!({
        "first_name": "Ade",
        "last_name": "Lagos",
        "date_of_birth": ten_years_ago(),
        "program_track": "sports",
        "guardian_name": "Mrs Lagos",
        "guardian_phone": "+2348012345678",
        "guardian_relationship": "mother",
        "guardian_signature": "data:image/png;base64,iVBORw0KGgo="
    })
}

#[tokio::test]
async fn enrolling_a_boy_derives_age_and_consent() {
    let app = app();
    let (status, boy) = send(&app, "POST", "/api/boys", Some(boy_body()), true).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(boy["age_at_enrolment"], 10);
    assert_eq!(boy["consent_form_signed"], true);
    assert_eq!(boy["full_name"], "Ade Lagos");
    assert!(boy["id"].as_str().is_some());
    assert!(boy["created_at"].as_str().is_some());
}

#[tokio::test]
async fn missing_required_field_is_a_bad_request() {
    let app = app();
    let mut body = boy_body();
    body.as_object_mut().unwrap().remove("guardian_phone");
    let (status, err) = send(&app, "POST", "/api/boys", Some(body), true).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "Missing required field: guardian_phone");

    let (status, err) = send(&app, "POST", "/api/donations", Some(json!({ "amount": 50 })), false).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "Missing required field: program");
}

#[tokio::test]
async fn admin_routes_require_the_admin_key() {
    let app = app();
    let (status, _) = send(&app, "GET", "/api/boys", None, false).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, "GET", "/api/admin/stats", None, false).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/api/donations")
        .header("x-admin-key", "wrong")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // public forms stay open
    let body = json!({ "name": "Ngozi", "email": "ngozi@example.org" });
    let (status, _) = send(&app, "POST", "/api/volunteers", Some(body), false).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn donations_flow_into_program_totals() {
    let app = app();
    let (_, before) = send(&app, "GET", "/api/admin/stats", None, true).await;
    assert_eq!(before["totals"]["totalDonations"], 0.0);

    let body = json!({ "donor_name": "Bola", "email": "bola@example.org", "program": "education", "amount": 100 });
    let (status, donation) = send(&app, "POST", "/api/donations", Some(body), false).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(donation["amount"], 100.0);

    let (status, stats) = send(&app, "GET", "/api/admin/stats", None, true).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["donationsByProgram"]["education"], 100.0);
    assert_eq!(stats["totals"]["totalDonations"], 100.0);
    assert_eq!(stats["totals"]["donationCount"], 1);
    assert_eq!(stats["topDonors"][0]["name"], "Bola");
}

#[tokio::test]
async fn approving_a_volunteer_keeps_their_identity() {
    let app = app();
    let body = json!({ "name": "Chidi Okafor", "email": "chidi@example.org", "category": "helper" });
    let (_, volunteer) = send(&app, "POST", "/api/volunteers", Some(body), false).await;
    assert_eq!(volunteer["status"], "pending");
    let id = volunteer["id"].as_str().unwrap();

    let uri = format!("/api/volunteers/{id}");
    let (status, _) = send(&app, "PATCH", &uri, Some(json!({ "status": "approved" })), true).await;
    assert_eq!(status, StatusCode::OK);

    let (status, fetched) = send(&app, "GET", &uri, None, true).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["status"], "approved");
    assert_eq!(fetched["name"], "Chidi Okafor");
    assert_eq!(fetched["email"], "chidi@example.org");
    assert!(fetched["updated_at"].as_str().is_some());

    let (status, _) = send(&app, "PATCH", &uri, Some(json!({ "status": "promoted" })), true).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn legacy_join_date_patch_keeps_stats_readable() {
    let app = app();
    let body = json!({ "name": "Tunde Ade", "email": "tunde@example.org" });
    let (_, volunteer) = send(&app, "POST", "/api/volunteers", Some(body), false).await;
    let uri = format!("/api/volunteers/{}", volunteer["id"].as_str().unwrap());

    let (status, _) = send(&app, "PATCH", &uri, Some(json!({ "status": "approved" })), true).await;
    assert_eq!(status, StatusCode::OK);
    let (status, updated) = send(&app, "PATCH", &uri, Some(json!({ "joinDate": "2020-01-01" })), true).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["joined_at"], "2020-01-01");
    assert!(updated.get("joinDate").is_none());

    let (status, stats) = send(&app, "GET", "/api/admin/stats", None, true).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["longestServingVolunteers"][0]["name"], "Tunde Ade");

    let (status, _) = send(&app, "GET", "/api/admin/donations/export", None, true).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn donations_to_unknown_programs_are_rejected() {
    let app = app();
    for program in ["junk-0", "junk-1"] {
        let body = json!({ "donor_name": "Bola", "program": program, "amount": 10 });
        let (status, err) = send(&app, "POST", "/api/donations", Some(body), false).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["error"], format!("Unknown program: {program}"));
    }
    let (_, all) = send(&app, "GET", "/api/donations", None, true).await;
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn sponsorship_with_both_name_keys_is_accepted() {
    let app = app();
    let body = json!({
        "sponsor_name": "Acme Ltd",
        "sponsorName": "Acme",
        "email": "giving@acme.example",
        "amount": 5000
    });
    let (status, doc) = send(&app, "POST", "/api/sponsorships", Some(body), false).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["sponsor_name"], "Acme Ltd");
    assert!(doc.get("sponsorName").is_none());
}

#[tokio::test]
async fn deleted_boy_is_not_found() {
    let app = app();
    let (_, boy) = send(&app, "POST", "/api/boys", Some(boy_body()), true).await;
    let id = boy["id"].as_str().unwrap().to_uppercase();

    let uri = format!("/api/boys/{id}");
    let (status, _) = send(&app, "DELETE", &uri, None, true).await;
    assert_eq!(status, StatusCode::OK);

    let (status, err) = send(&app, "GET", &uri, None, true).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error"], "Boy not found");

    let (status, _) = send(&app, "DELETE", &uri, None, true).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn assessments_are_appended_to_the_boy() {
    let app = app();
    let (_, boy) = send(&app, "POST", "/api/boys", Some(boy_body()), true).await;
    let id = boy["id"].as_str().unwrap();

    let body = json!({ "kind": "cognitive", "scores": { "reading": 7 } });
    let (status, updated) = send(&app, "POST", &format!("/api/boys/{id}/assessments"), Some(body), true).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["assessments"][0]["scores"]["reading"], 7);

    let (status, _) = send(
        &app,
        "POST",
        "/api/boys/unknown-boy/sessions",
        Some(json!({ "title": "Drills" })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_filters_by_program_track() {
    let app = app();
    send(&app, "POST", "/api/boys", Some(boy_body()), true).await;
    let mut other = boy_body();
    other["program_track"] = json!("education");
    send(&app, "POST", "/api/boys", Some(other), true).await;

    let (status, sports) = send(&app, "GET", "/api/boys?program_track=sports", None, true).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sports.as_array().unwrap().len(), 1);

    let (_, all) = send(&app, "GET", "/api/boys", None, true).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn media_file_upload_needs_storage() {
    let app = app();
    let body = json!({ "file": "data:image/png;base64,iVBORw0KGgo=", "category": "other" });
    let (status, _) = send(&app, "POST", "/api/media", Some(body), true).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let body = json!({ "url": "https://youtu.be/xyz", "category": "session" });
    let (status, media) = send(&app, "POST", "/api/media", Some(body), true).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(media["media_type"], "video");
}

#[tokio::test]
async fn donation_export_is_csv() {
    let app = app();
    let body = json!({ "donor_name": "Bola", "program": "sports", "amount": "2,500" });
    send(&app, "POST", "/api/donations", Some(body), false).await;

    let request = Request::builder()
        .uri("/api/admin/donations/export")
        .header("x-admin-key", ADMIN_KEY)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/csv; charset=utf-8"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("id,date,donor_name"));
    assert!(text.contains(",Bola,,false,sports,2500.00,NGN,,pending"));
}

#[tokio::test]
async fn health_reports_store_status() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None, false).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
