//! Session lifecycle: scoring, averages, cascades, and the cache contract.


use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use test_support::TestApp;

#[tokio::test]
async fn q1_review_average_is_eight() {
    let app = TestApp::new();
    let (subject, _) = app.register_user("subject").await;
    let (a, _) = app.register_user("rater-a").await;
    let (b, _) = app.register_user("rater-b").await;

    let session = app.create_session("Q1 Review", subject).await;
    let communication = app.create_competency("Communication").await;
    let delivery = app.create_competency("Delivery").await;

    app.attach_competency(session, communication).await;
    app.attach_competency(session, delivery).await;
    app.add_evaluator(session, a).await;
    app.add_evaluator(session, b).await;

    let (status, _) = app.add_assessment(session, communication, a, 8).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app.add_assessment(session, communication, b, 6).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app.add_assessment(session, delivery, a, 10).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.get("/api/v1/sessions/average_score").await;
    assert_eq!(status, StatusCode::OK);
    let entry = body
        .as_array()
        .unwrap()
        .iter()
        .find(|avg| avg["session_id"] == session.to_string())
        .unwrap();
    assert_eq!(entry["average_score"], json!(8.0));
}

#[tokio::test]
async fn session_without_assessments_reports_null_average() {
    let app = TestApp::new();
    let (subject, _) = app.register_user("subject").await;
    let session = app.create_session("Empty", subject).await;

    let (_, body) = app.get("/api/v1/sessions/average_score").await;
    let entry = body
        .as_array()
        .unwrap()
        .iter()
        .find(|avg| avg["session_id"] == session.to_string())
        .unwrap();
    assert!(entry["average_score"].is_null());
}

#[tokio::test]
async fn duplicate_assessment_rejected_and_first_unchanged() {
    let app = TestApp::new();
    let (subject, _) = app.register_user("subject").await;
    let (rater, _) = app.register_user("rater").await;
    let session = app.create_session("Review", subject).await;
    let competency = app.create_competency("Communication").await;

    let (status, first) = app.add_assessment(session, competency, rater, 9).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.add_assessment(session, competency, rater, 3).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, kept) = app
        .get(&format!(
            "/api/v1/assessments/{}",
            first["assessment_id"].as_str().unwrap()
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(kept["score"], 9);
}

#[tokio::test]
async fn invalid_score_rejected_before_persisting() {
    let app = TestApp::new();
    let (subject, _) = app.register_user("subject").await;
    let (rater, _) = app.register_user("rater").await;
    let session = app.create_session("Review", subject).await;
    let competency = app.create_competency("Communication").await;

    let (status, _) = app.add_assessment(session, competency, rater, 0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.add_assessment(session, competency, rater, 42).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.get("/api/v1/assessments").await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn cache_round_trip() {
    let app = TestApp::new();
    let (subject, _) = app.register_user("subject").await;
    let first = app.create_session("First", subject).await;

    // After a clear, the debug read reports empty and does not fill.
    let (status, _) = app.post("/api/v1/sessions/clear_cache", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get("/api/v1/sessions/debug_cache").await;
    assert_eq!(body["message"], "Cache is empty");
    let (_, body) = app.get("/api/v1/sessions/debug_cache").await;
    assert_eq!(body["message"], "Cache is empty");

    // A list-read fills the snapshot with the live identifier set.
    let (status, listed) = app.get("/api/v1/sessions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["total"], 1);
    let (_, body) = app.get("/api/v1/sessions/debug_cache").await;
    let cached: Vec<&str> = body["cached_sessions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["session_id"].as_str().unwrap())
        .collect();
    assert_eq!(cached, vec![first.to_string().as_str()]);

    // A session created inside the TTL is invisible to warm reads: the
    // candidate set is stale by design, up to the TTL.
    let second = app.create_session("Second", subject).await;
    let (_, listed) = app.get("/api/v1/sessions").await;
    assert_eq!(listed["total"], 1);

    // An explicit clear makes it visible.
    app.post("/api/v1/sessions/clear_cache", json!({})).await;
    let (_, listed) = app.get("/api/v1/sessions").await;
    assert_eq!(listed["total"], 2);
    let ids: Vec<String> = listed["sessions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["session_id"].as_str().unwrap().to_string())
        .collect();
    assert!(ids.contains(&first.to_string()));
    assert!(ids.contains(&second.to_string()));
}

#[tokio::test]
async fn cached_listing_applies_fresh_active_filter() {
    let app = TestApp::new();
    let (subject, _) = app.register_user("subject").await;
    let session = app.create_session("Review", subject).await;

    // Warm the cache while the session is active.
    let (_, listed) = app.get("/api/v1/sessions?status=active").await;
    assert_eq!(listed["total"], 1);

    // Deactivate without touching the cache: the filter must see the fresh
    // flag on the next read.
    let (status, _) = app
        .request(
            Method::PATCH,
            &format!("/api/v1/sessions/{}", session),
            Some(json!({ "is_active": false })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, active) = app.get("/api/v1/sessions?status=active").await;
    assert_eq!(active["total"], 0);
    let (_, inactive) = app.get("/api/v1/sessions?status=inactive").await;
    assert_eq!(inactive["total"], 1);
    let (_, all) = app.get("/api/v1/sessions").await;
    assert_eq!(all["total"], 1);
}

#[tokio::test]
async fn deleting_session_cascades() {
    let app = TestApp::new();
    let (subject, _) = app.register_user("subject").await;
    let (rater, token) = app.register_user("rater").await;
    let session = app.create_session("Doomed", subject).await;
    let keep = app.create_session("Kept", subject).await;
    let competency = app.create_competency("Communication").await;

    for s in [session, keep] {
        app.attach_competency(s, competency).await;
        app.add_evaluator(s, rater).await;
        let (status, _) = app.add_assessment(s, competency, rater, 5).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // Deleting a session requires an authenticated POST.
    let (status, _) = app
        .post(&format!("/sessions/delete/{}", session), json!({}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .request(
            Method::POST,
            &format!("/sessions/delete/{}", session),
            Some(json!({})),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Session deleted successfully");

    // Its assessments are gone; the other session's remain.
    let (_, doomed) = app
        .get(&format!("/api/v1/assessments?session={}", session))
        .await;
    assert_eq!(doomed["total"], 0);
    let (_, kept) = app
        .get(&format!("/api/v1/assessments?session={}", keep))
        .await;
    assert_eq!(kept["total"], 1);

    let (status, _) = app.get(&format!("/api/v1/sessions/{}", session)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_count_endpoint() {
    let app = TestApp::new();
    let (subject, _) = app.register_user("subject").await;
    app.create_session("One", subject).await;
    app.create_session("Two", subject).await;

    let (status, body) = app.get("/api/get_session_count").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_count"], 2);
}

#[tokio::test]
async fn duplicate_evaluator_rejected() {
    let app = TestApp::new();
    let (subject, _) = app.register_user("subject").await;
    let (rater, _) = app.register_user("rater").await;
    let session = app.create_session("Review", subject).await;

    app.add_evaluator(session, rater).await;
    let (status, _) = app
        .post(
            &format!("/api/v1/sessions/{}/evaluators", session),
            json!({ "user_id": rater }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_session_is_404_without_side_effects() {
    let app = TestApp::new();
    let missing = uuid::Uuid::now_v7();

    let (status, _) = app.get(&format!("/api/v1/sessions/{}", missing)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/v1/sessions/{}", missing),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body): (StatusCode, Value) = app.get("/api/get_session_count").await;
    assert_eq!(body["session_count"], 0);
}
