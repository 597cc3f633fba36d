//! Competency filters, updates, and cascades.


use axum::http::{Method, StatusCode};
use serde_json::json;
use test_support::TestApp;

#[tokio::test]
async fn icontains_and_contains_are_different_operations() {
    let app = TestApp::new();
    app.create_competency("Team Leadership").await;
    app.create_competency("Leading Change").await;
    app.create_competency("leadership").await;

    // Case-insensitive: all three match "lead".
    let (status, body) = app
        .get("/api/v1/competencies/filter_by_name?name=lead")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);

    // Case-sensitive "Lead" excludes the lowercase spelling.
    let (status, body) = app
        .get("/api/v1/competencies/filter_contains?name=Lead")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    let names: Vec<&str> = body["competencies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Team Leadership"));
    assert!(names.contains(&"Leading Change"));
    assert!(!names.contains(&"leadership"));
}

#[tokio::test]
async fn name_parameter_is_required() {
    let app = TestApp::new();

    for uri in [
        "/api/v1/competencies/filter_by_name",
        "/api/v1/competencies/filter_contains",
        "/api/v1/competencies/exists",
    ] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "no 400 for {}", uri);
        assert!(
            body["message"].as_str().unwrap().contains("name"),
            "message should name the parameter: {}",
            body
        );
    }
}

#[tokio::test]
async fn list_names_count_exists() {
    let app = TestApp::new();
    app.create_competency("Communication").await;
    app.create_competency("Delivery").await;

    let (_, names) = app.get("/api/v1/competencies/list_names").await;
    let names: Vec<&str> = names
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n.as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Communication"));

    let (_, count) = app.get("/api/v1/competencies/count").await;
    assert_eq!(count["competency_count"], 2);

    let (_, exists) = app.get("/api/v1/competencies/exists?name=Delivery").await;
    assert_eq!(exists["exists"], true);
    // Exact match is case-sensitive.
    let (_, exists) = app.get("/api/v1/competencies/exists?name=delivery").await;
    assert_eq!(exists["exists"], false);
}

#[tokio::test]
async fn update_by_id_with_partial_fields() {
    let app = TestApp::new();
    let id = app.create_competency("Communication").await;

    let (status, body) = app
        .post(
            &format!("/api/v1/competencies/{}/update", id),
            json!({ "description": "Listens well", "department": "People" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Competency updated successfully");

    let (_, competency) = app.get(&format!("/api/v1/competencies/{}", id)).await;
    assert_eq!(competency["name"], "Communication");
    assert_eq!(competency["description"], "Listens well");
    assert_eq!(competency["department"], "People");
}

#[tokio::test]
async fn update_requires_fields_and_existing_id() {
    let app = TestApp::new();
    let id = app.create_competency("Communication").await;

    let (status, _) = app
        .post(&format!("/api/v1/competencies/{}/update", id), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = uuid::Uuid::now_v7();
    let (status, _) = app
        .post(
            &format!("/api/v1/competencies/{}/update", missing),
            json!({ "name": "Anything" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn combined_filter_requires_both_parameters() {
    let app = TestApp::new();
    let id = app.create_competency("Team Leadership").await;
    app.post(
        &format!("/api/v1/competencies/{}/update", id),
        json!({ "department": "Engineering" }),
    )
    .await;
    app.create_competency("Leading Change").await;

    let (status, _) = app
        .get("/api/v1/competencies/filter_by_multiple?name=lead")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .get("/api/v1/competencies/filter_by_multiple?department=eng")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .get("/api/v1/competencies/filter_by_multiple?name=lead&department=eng")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["competencies"][0]["name"], "Team Leadership");
}

#[tokio::test]
async fn delete_competency_cascades_to_assessments() {
    let app = TestApp::new();
    let (subject, _) = app.register_user("subject").await;
    let (rater, _) = app.register_user("rater").await;
    let session = app.create_session("Review", subject).await;
    let competency = app.create_competency("Communication").await;

    app.attach_competency(session, competency).await;
    let (status, _) = app.add_assessment(session, competency, rater, 7).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/v1/competencies/{}", competency),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, assessments) = app.get("/api/v1/assessments").await;
    assert_eq!(assessments["total"], 0);

    // The session itself survives the competency cascade.
    let (status, _) = app.get(&format!("/api/v1/sessions/{}", session)).await;
    assert_eq!(status, StatusCode::OK);
}
