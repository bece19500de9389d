mod common;

use axum::http::Method;
use serde_json::json;

use common::{response_json, TestApp};

#[tokio::test]
async fn inbox_lifecycle() {
    let app = TestApp::new().await;

    let response = app
        .post(
            "/api/messages",
            json!({
                "fromName": "Hat Viet",
                "content": "200 ml of cashew milk available",
                "type": "supplier_offer",
                "metadata": { "materialId": 1, "quantity": 200, "price": 150000 }
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let offer = response_json(response).await;
    assert_eq!(offer["status"], "unread");
    assert_eq!(offer["metadata"]["quantity"], 200);

    let response = app
        .post(
            "/api/messages",
            json!({
                "fromName": "Green Agency",
                "content": "Need 100 packs",
                "type": "customer_request"
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let request = response_json(response).await;
    assert!(request["metadata"].is_null());

    let inbox = response_json(app.get("/api/messages").await).await;
    let inbox = inbox.as_array().unwrap();
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0]["id"], request["id"]);

    let response = app
        .request(
            Method::PATCH,
            &format!("/api/messages/{}", offer["id"]),
            Some(json!({ "status": "processed" })),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);
    let updated = response_json(response).await;
    assert_eq!(updated["status"], "processed");
    assert_eq!(updated["content"], offer["content"]);
}

#[tokio::test]
async fn message_updates_validate_input() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::PATCH,
            "/api/messages/77",
            Some(json!({ "status": "processed" })),
            None,
        )
        .await;
    assert_eq!(response.status(), 404);

    let response = app
        .post(
            "/api/messages",
            json!({ "fromName": "x", "content": "y", "type": "spam" }),
        )
        .await;
    assert_eq!(response.status(), 400);

    let response = app
        .post(
            "/api/messages",
            json!({ "fromName": "x", "content": "y", "type": "customer_request" }),
        )
        .await;
    let id = response_json(response).await["id"].as_i64().unwrap();
    let response = app
        .request(
            Method::PATCH,
            &format!("/api/messages/{id}"),
            Some(json!({ "status": "archived" })),
            None,
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn employees_are_linked_to_users() {
    let app = TestApp::new().await;
    let user_id = app.create_user("manh").await;

    let response = app
        .post(
            "/api/employees",
            json!({
                "userId": user_id,
                "salary": 20000000,
                "shift": "Office hours",
                "performance": "100%"
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let created = response_json(response).await;
    assert_eq!(created["userId"], user_id);
    assert_eq!(created["salary"], 20000000);
    assert_eq!(created["user"]["username"], "manh");

    let response = app
        .get(&format!("/api/employees/by-user/{user_id}"))
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response_json(response).await["id"], created["id"]);

    let list = response_json(app.get("/api/employees").await).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["user"]["fullName"], "manh tester");

    // one record per user
    let response = app
        .post("/api/employees", json!({ "userId": user_id }))
        .await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn employee_lookups_and_references() {
    let app = TestApp::new().await;
    let user_id = app.create_user("tri").await;

    let response = app
        .get(&format!("/api/employees/by-user/{user_id}"))
        .await;
    assert_eq!(response.status(), 404);

    let response = app.post("/api/employees", json!({ "userId": 4040 })).await;
    assert_eq!(response.status(), 400);
    assert_eq!(response_json(response).await["field"], "userId");

    let response = app.post("/api/employees", json!({ "userId": user_id })).await;
    assert_eq!(response.status(), 201);
    assert_eq!(response_json(response).await["salary"], 0);
}
