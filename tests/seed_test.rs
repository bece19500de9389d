mod common;

use chrono::Utc;
use serde_json::json;
use stockroom_api::seed::{self, DEMO_PASSWORD};

use common::{response_json, TestApp};

#[tokio::test]
async fn seeding_is_idempotent() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let today = Utc::now().date_naive();

    let first = seed::run(services, today, false).await.expect("seed");
    assert!(!first.skipped);
    assert_eq!(first.users, 5);
    assert_eq!(first.materials, 6);
    assert_eq!(first.suppliers, 2);
    assert_eq!(first.messages, 2);
    assert_eq!(first.employees, 2);
    assert_eq!(first.invoices, 10);

    let second = seed::run(services, today, false).await.expect("second seed");
    assert!(second.skipped);

    let materials = response_json(app.get("/api/materials").await).await;
    assert_eq!(materials.as_array().unwrap().len(), 6);
    let invoices = response_json(app.get("/api/invoices").await).await;
    assert_eq!(invoices.as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn seeded_accounts_can_sign_in() {
    let app = TestApp::new().await;
    seed::run(&app.state.services, Utc::now().date_naive(), false)
        .await
        .expect("seed");

    let response = app
        .post(
            "/api/login",
            json!({ "username": "manh", "password": DEMO_PASSWORD }),
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response_json(response).await["role"], "admin");

    let dashboard = response_json(app.get("/api/dashboard").await).await;
    assert_eq!(dashboard["totalMaterials"], 6);
    assert!(dashboard["financialReport"]["revenue"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn forced_seed_reuses_existing_accounts() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let today = Utc::now().date_naive();

    seed::run(services, today, false).await.expect("seed");
    let forced = seed::run(services, today, true).await.expect("forced seed");
    assert!(!forced.skipped);
    assert_eq!(forced.users, 0);
    assert_eq!(forced.employees, 0);
    assert_eq!(forced.materials, 6);
    assert_eq!(forced.invoices, 10);

    let users = response_json(app.get("/api/users").await).await;
    assert_eq!(users.as_array().unwrap().len(), 5);
    let employees = response_json(app.get("/api/employees").await).await;
    assert_eq!(employees.as_array().unwrap().len(), 2);
    let materials = response_json(app.get("/api/materials").await).await;
    assert_eq!(materials.as_array().unwrap().len(), 12);
}
