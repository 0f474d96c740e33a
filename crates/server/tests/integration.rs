use axum::http::StatusCode;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use shifttrack_core::WeekStart;
use shifttrack_server::{AppConfig, AppState, build_router, storage};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn app() -> (TempDir, axum::Router) {
    let dir = tempfile::tempdir().unwrap();
    let db = storage::init_db(dir.path()).unwrap();
    let state = AppState {
        db,
        config: AppConfig {
            base_url: "http://localhost:3000".into(),
            jwt_secret: "integration-secret".into(),
            registration_open: true,
            week_starts_on: WeekStart::Monday,
            join_code_length: 6,
        },
    };
    (dir, build_router(state, None))
}

/// Send one request via `oneshot` and return (status, parsed JSON body).
async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = axum::http::Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header("authorization", format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => req
            .header("content-type", "application/json")
            .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => req.body(axum::body::Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

/// Register a user and return (user_id, access_token).
async fn register(app: &axum::Router, name: &str) -> (String, String) {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": format!("{}@example.com", name.to_lowercase()),
            "password": "correct horse battery",
            "display_name": name,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register {name}: {body}");
    (
        body["user_id"].as_str().unwrap().to_string(),
        body["access_token"].as_str().unwrap().to_string(),
    )
}

/// Create a store and return (store_id, join_code).
async fn create_store(app: &axum::Router, token: &str, name: &str) -> (String, String) {
    let (status, body) = send(
        app,
        "POST",
        "/api/stores",
        Some(token),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    (
        body["id"].as_str().unwrap().to_string(),
        body["join_code"].as_str().unwrap().to_string(),
    )
}

async fn join(app: &axum::Router, token: &str, code: &str, role: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/stores/join",
        Some(token),
        Some(json!({ "join_code": code, "role": role })),
    )
    .await
}

// ---------------------------------------------------------------------------
// Health / auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_ok() {
    let (_dir, app) = app();
    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn protected_routes_need_a_token() {
    let (_dir, app) = app();
    let (status, body) = send(&app, "GET", "/api/stores", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, "GET", "/api/auth/me", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_email_and_bad_login() {
    let (_dir, app) = app();
    register(&app, "Ana").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": "ANA@example.com",
            "password": "another password",
            "display_name": "Imposter",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "ana@example.com", "password": "wrong password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Stores and onboarding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn onboarding_flow() {
    let (_dir, app) = app();
    let (owner_id, owner) = register(&app, "Owner").await;
    let (_, worker) = register(&app, "Worker").await;
    let (candidate_id, candidate) = register(&app, "Candidate").await;

    let (store_id, code) = create_store(&app, &owner, "Corner Cafe").await;

    // Employees are in immediately and never see the join code.
    let (status, body) = join(&app, &worker, &code.to_lowercase(), "employee").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "approved");
    let (status, body) = send(&app, "GET", &format!("/api/stores/{store_id}"), Some(&worker), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["your_role"], "employee");
    assert!(body["join_code"].is_null());
    assert!(body["pending_request_count"].is_null());

    let (status, _) = join(&app, &worker, &code, "employee").await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Manager requests wait for approval.
    let (status, body) = join(&app, &candidate, &code, "manager").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    let (status, _) = send(&app, "GET", &format!("/api/stores/{store_id}"), Some(&candidate), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let approve = format!("/api/stores/{store_id}/manager-requests/{candidate_id}/approve");
    let (status, _) = send(&app, "POST", &approve, Some(&worker), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "GET", &format!("/api/stores/{store_id}"), Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pending_request_count"], 1);
    assert_eq!(body["join_code"], code.as_str());

    let (status, body) = send(&app, "POST", &approve, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "approved");
    let (status, _) = send(&app, "POST", &approve, Some(&owner), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The primary cannot leave until the flag moves.
    let leave = format!("/api/stores/{store_id}/managers/{owner_id}");
    let (status, _) = send(&app, "DELETE", &leave, Some(&owner), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/stores/{store_id}/primary"),
        Some(&owner),
        Some(json!({ "user_id": candidate_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "DELETE", &leave, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/stores/{store_id}/members"),
        Some(&candidate),
        None,
    )
    .await;
    let managers = body["managers"].as_array().unwrap();
    assert_eq!(managers.len(), 1);
    assert_eq!(managers[0]["user_id"], candidate_id.as_str());
    assert_eq!(managers[0]["is_primary"], true);
    assert_eq!(body["employees"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_join_code_is_not_found() {
    let (_dir, app) = app();
    let (_, token) = register(&app, "Solo").await;
    let (status, _) = join(&app, &token, "ZZZZ99", "employee").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = join(&app, &token, "bad!", "employee").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Schedules, shifts and availability
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scheduling_flow() {
    let (_dir, app) = app();
    let (_, owner) = register(&app, "Owner").await;
    let (worker_id, worker) = register(&app, "Worker").await;
    let (outsider_id, _) = register(&app, "Outsider").await;
    let (store_id, code) = create_store(&app, &owner, "Bakery").await;
    join(&app, &worker, &code, "employee").await;

    // Wednesday snaps back to Monday.
    let schedules = format!("/api/stores/{store_id}/schedules");
    let (status, schedule) = send(
        &app,
        "POST",
        &schedules,
        Some(&owner),
        Some(json!({ "week_start": "2026-10-21" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{schedule}");
    assert_eq!(schedule["week_start"], "2026-10-19");
    assert_eq!(schedule["week_end"], "2026-10-25");
    let schedule_id = schedule["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        &schedules,
        Some(&owner),
        Some(json!({ "week_start": "2026-10-19" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "POST",
        &schedules,
        Some(&worker),
        Some(json!({ "week_start": "2026-10-26" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Shifts must fit the week and go to roster members.
    let shifts = format!("/api/schedules/{schedule_id}/shifts");
    let (status, _) = send(
        &app,
        "POST",
        &shifts,
        Some(&owner),
        Some(json!({ "user_id": worker_id, "date": "2026-10-27", "start_time": "09:00", "end_time": "17:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(
        &app,
        "POST",
        &shifts,
        Some(&owner),
        Some(json!({ "user_id": outsider_id, "date": "2026-10-20", "start_time": "09:00", "end_time": "17:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(
        &app,
        "POST",
        &shifts,
        Some(&owner),
        Some(json!({ "user_id": worker_id, "date": "2026-10-20", "start_time": "22:00", "end_time": "06:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Worker says they can only do mornings on Tuesday.
    let (status, _) = send(
        &app,
        "PUT",
        "/api/availability",
        Some(&worker),
        Some(json!({ "date": "2026-10-20", "status": "available", "start_time": "08:00", "end_time": "12:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, shift) = send(
        &app,
        "POST",
        &shifts,
        Some(&owner),
        Some(json!({ "user_id": worker_id, "date": "2026-10-20", "start_time": "09:00:00", "end_time": "17:00", "notes": "  open  " })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{shift}");
    assert_eq!(shift["start_time"], "09:00");
    assert_eq!(shift["notes"], "open");
    let shift_id = shift["id"].as_str().unwrap().to_string();

    // Drafts stay hidden from employees.
    let week = format!("/api/stores/{store_id}/weeks/2026-10-22");
    let (status, view) = send(&app, "GET", &week, Some(&worker), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(view["schedule"].is_null());
    assert_eq!(view["view"]["total_minutes"], 0);
    let (_, listed) = send(&app, "GET", &schedules, Some(&worker), None).await;
    assert!(listed["schedules"].as_array().unwrap().is_empty());
    let (status, _) = send(&app, "GET", &format!("/api/schedules/{schedule_id}"), Some(&worker), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Managers see the shift flagged against the availability window.
    let (_, view) = send(&app, "GET", &week, Some(&owner), None).await;
    let row = view["view"]["rows"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["user_id"] == worker_id.as_str())
        .unwrap()
        .clone();
    let tuesday = &row["days"][1];
    assert_eq!(tuesday["date"], "2026-10-20");
    assert_eq!(tuesday["shifts"][0]["outside_availability"], true);
    assert_eq!(row["total_minutes"], 480);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/shifts/{shift_id}"),
        Some(&owner),
        Some(json!({ "end_time": "12:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, published) = send(
        &app,
        "POST",
        &format!("/api/schedules/{schedule_id}/publish"),
        Some(&owner),
        Some(json!({ "published": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(published["published"], true);
    assert_eq!(published["shift_count"], 1);

    let (_, view) = send(&app, "GET", &week, Some(&worker), None).await;
    assert_eq!(view["schedule"]["id"], schedule_id.as_str());
    assert_eq!(view["view"]["total_minutes"], 180);

    let (status, mine) = send(
        &app,
        "GET",
        "/api/me/shifts?from=2026-10-19&to=2026-10-25",
        Some(&worker),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let mine = mine["shifts"].as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["store_name"], "Bakery");
    assert_eq!(mine[0]["end_time"], "12:00");

    let (status, _) = send(&app, "DELETE", &format!("/api/shifts/{shift_id}"), Some(&worker), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "DELETE", &format!("/api/schedules/{schedule_id}"), Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "DELETE", &format!("/api/shifts/{shift_id}"), Some(&owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn availability_is_one_record_per_day() {
    let (_dir, app) = app();
    let (_, token) = register(&app, "Worker").await;

    let (status, _) = send(
        &app,
        "PUT",
        "/api/availability",
        Some(&token),
        Some(json!({ "date": "2026-11-02", "status": "unavailable", "start_time": "09:00", "end_time": "10:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for status in ["available", "unavailable"] {
        let (code, body) = send(
            &app,
            "PUT",
            "/api/availability",
            Some(&token),
            Some(json!({ "date": "2026-11-02", "status": status })),
        )
        .await;
        assert_eq!(code, StatusCode::OK, "{body}");
        assert_eq!(body["status"], status);
    }

    let (_, body) = send(
        &app,
        "GET",
        "/api/availability?from=2026-11-01&to=2026-11-07",
        Some(&token),
        None,
    )
    .await;
    let records = body["availability"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["status"], "unavailable");

    let (status, _) = send(&app, "DELETE", "/api/availability/2026-11-02", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "DELETE", "/api/availability/2026-11-02", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sub_minute_times_are_validated_as_stored() {
    let (_dir, app) = app();
    let (_, owner) = register(&app, "Owner").await;
    let (worker_id, worker) = register(&app, "Worker").await;
    let (store_id, code) = create_store(&app, &owner, "Deli").await;
    join(&app, &worker, &code, "employee").await;

    // Same minute once the seconds go: an empty window.
    let (status, body) = send(
        &app,
        "PUT",
        "/api/availability",
        Some(&worker),
        Some(json!({ "date": "2026-11-03", "status": "available", "start_time": "09:00:10", "end_time": "09:00:50" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, body) = send(
        &app,
        "PUT",
        "/api/availability",
        Some(&worker),
        Some(json!({ "date": "2026-11-03", "status": "available", "start_time": "09:00:30", "end_time": "12:15:59" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["start_time"], "09:00");
    assert_eq!(body["end_time"], "12:15");

    let (status, schedule) = send(
        &app,
        "POST",
        &format!("/api/stores/{store_id}/schedules"),
        Some(&owner),
        Some(json!({ "week_start": "2026-11-02" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{schedule}");
    let shifts = format!("/api/schedules/{}/shifts", schedule["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        "POST",
        &shifts,
        Some(&owner),
        Some(json!({ "user_id": worker_id, "date": "2026-11-03", "start_time": "10:00:10", "end_time": "10:00:50" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, shift) = send(
        &app,
        "POST",
        &shifts,
        Some(&owner),
        Some(json!({ "user_id": worker_id, "date": "2026-11-03", "start_time": "10:00:45", "end_time": "11:30:05" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{shift}");
    assert_eq!(shift["start_time"], "10:00");
    assert_eq!(shift["end_time"], "11:30");

    let (status, view) = send(
        &app,
        "GET",
        &format!("/api/stores/{store_id}/weeks/2026-11-03"),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{view}");
    let row = view["view"]["rows"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["user_id"] == worker_id.as_str())
        .unwrap()
        .clone();
    assert_eq!(row["total_minutes"], 90);
    assert_eq!(row["days"][1]["shifts"][0]["outside_availability"], false);
}

#[tokio::test]
async fn employee_week_view_shows_only_own_availability() {
    let (_dir, app) = app();
    let (_, owner) = register(&app, "Owner").await;
    let (anna_id, anna) = register(&app, "Anna").await;
    let (ben_id, ben) = register(&app, "Ben").await;
    let (store_id, code) = create_store(&app, &owner, "Florist").await;
    join(&app, &anna, &code, "employee").await;
    join(&app, &ben, &code, "employee").await;

    for (token, date) in [(&anna, "2026-11-03"), (&ben, "2026-11-04")] {
        let (status, body) = send(
            &app,
            "PUT",
            "/api/availability",
            Some(token),
            Some(json!({ "date": date, "status": "unavailable" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    let week = format!("/api/stores/{store_id}/weeks/2026-11-02");
    let row_for = |view: &Value, user_id: &str| {
        view["view"]["rows"]
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["user_id"] == user_id)
            .unwrap()
            .clone()
    };

    let (status, view) = send(&app, "GET", &week, Some(&anna), None).await;
    assert_eq!(status, StatusCode::OK, "{view}");
    let own = row_for(&view, &anna_id);
    assert_eq!(own["days"][1]["availability"]["status"], "unavailable");
    let coworker = row_for(&view, &ben_id);
    for day in coworker["days"].as_array().unwrap() {
        assert!(day["availability"].is_null(), "{day}");
    }

    let (_, view) = send(&app, "GET", &week, Some(&owner), None).await;
    assert_eq!(row_for(&view, &ben_id)["days"][2]["availability"]["status"], "unavailable");
    assert_eq!(row_for(&view, &anna_id)["days"][1]["availability"]["status"], "unavailable");
}
