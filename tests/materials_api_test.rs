mod common;

use axum::http::Method;
use serde_json::json;

use common::{response_json, TestApp};

#[tokio::test]
async fn material_crud_lifecycle() {
    let app = TestApp::new().await;

    let created = app.create_material("Cashew milk", 0, 500).await;
    let id = created["id"].as_i64().expect("material id");
    assert_eq!(created["name"], "Cashew milk");
    assert_eq!(created["type"], "Nut milk");
    assert_eq!(created["unit"], "ml");
    assert_eq!(created["currentStock"], 0);
    assert_eq!(created["minStock"], 500);
    assert!(created["createdAt"].is_string());

    let response = app.get(&format!("/api/materials/{id}")).await;
    assert_eq!(response.status(), 200);
    assert_eq!(response_json(response).await, created);

    let response = app
        .request(
            Method::PUT,
            &format!("/api/materials/{id}"),
            Some(json!({ "minStock": 800, "description": "Unsweetened" })),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);
    let updated = response_json(response).await;
    assert_eq!(updated["minStock"], 800);
    assert_eq!(updated["description"], "Unsweetened");
    // untouched fields survive a partial update
    assert_eq!(updated["name"], "Cashew milk");
    assert_eq!(updated["unit"], "ml");

    let response = app
        .request(Method::DELETE, &format!("/api/materials/{id}"), None, None)
        .await;
    assert_eq!(response.status(), 204);

    let response = app.get(&format!("/api/materials/{id}")).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn unit_defaults_to_ml() {
    let app = TestApp::new().await;

    let response = app
        .post("/api/materials", json!({ "name": "Oat milk" }))
        .await;
    assert_eq!(response.status(), 201);
    let body = response_json(response).await;
    assert_eq!(body["unit"], "ml");
    assert_eq!(body["currentStock"], 0);
    assert_eq!(body["minStock"], 0);
}

#[tokio::test]
async fn list_is_ordered_by_id_and_stable() {
    let app = TestApp::new().await;
    app.create_material("Soy milk", 10, 5).await;
    app.create_material("Almond milk", 20, 5).await;

    let first = response_json(app.get("/api/materials").await).await;
    let second = response_json(app.get("/api/materials").await).await;
    assert_eq!(first, second);

    let names: Vec<&str> = first
        .as_array()
        .expect("array")
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Soy milk", "Almond milk"]);
}

#[tokio::test]
async fn missing_name_is_rejected_with_field() {
    let app = TestApp::new().await;

    let response = app
        .post("/api/materials", json!({ "name": "", "unit": "ml" }))
        .await;
    assert_eq!(response.status(), 400);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Bad Request");
    assert_eq!(body["field"], "name");

    let response = app.post("/api/materials", json!({ "unit": "ml" })).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::new().await;

    let response = app.post_raw("/api/materials", "{\"name\": ").await;
    assert_eq!(response.status(), 400);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Bad Request");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn non_numeric_and_unknown_ids() {
    let app = TestApp::new().await;

    let response = app.get("/api/materials/abc").await;
    assert_eq!(response.status(), 400);
    assert_eq!(response_json(response).await["field"], "id");

    let response = app.get("/api/materials/9999").await;
    assert_eq!(response.status(), 404);

    let response = app
        .request(Method::DELETE, "/api/materials/9999", None, None)
        .await;
    assert_eq!(response.status(), 404);

    let response = app
        .request(
            Method::PUT,
            "/api/materials/9999",
            Some(json!({ "name": "Ghost" })),
            None,
        )
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn errors_echo_the_request_id() {
    let app = TestApp::new().await;

    let request = axum::http::Request::builder()
        .uri("/api/materials/424242")
        .header("x-request-id", "test-req-1")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(
        stockroom_api::app_router(app.state.clone()),
        request,
    )
    .await
    .unwrap();

    assert_eq!(response.status(), 404);
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "test-req-1"
    );
    let body = response_json(response).await;
    assert_eq!(body["request_id"], "test-req-1");
}

#[tokio::test]
async fn supplier_round_trip() {
    let app = TestApp::new().await;

    let payload = json!({
        "name": "Hat Viet Co., Ltd",
        "phone": "0901234567",
        "email": "hatviet@example.com",
        "contact": "Nguyen Van A",
        "address": "Binh Phuoc",
        "note": "Cashew specialist",
        "rating": 4
    });
    let response = app.post("/api/suppliers", payload.clone()).await;
    assert_eq!(response.status(), 201);
    let created = response_json(response).await;

    let list = response_json(app.get("/api/suppliers").await).await;
    let listed = &list.as_array().expect("array")[0];
    assert_eq!(listed, &created);
    for key in ["name", "phone", "email", "contact", "address", "note", "rating"] {
        assert_eq!(listed[key], payload[key], "field {key}");
    }
}

#[tokio::test]
async fn supplier_rating_defaults_and_bounds() {
    let app = TestApp::new().await;

    let created = app.create_supplier("Green Farm").await;
    assert_eq!(created["rating"], 5);

    let response = app
        .post("/api/suppliers", json!({ "name": "Too good", "rating": 9 }))
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(response_json(response).await["field"], "rating");
}
