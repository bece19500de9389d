mod common;

use serde_json::json;

use common::{response_json, TestApp};

#[tokio::test]
async fn empty_dashboard_has_twelve_zero_months() {
    let app = TestApp::new().await;

    let response = app.get("/api/dashboard").await;
    assert_eq!(response.status(), 200);
    let dashboard = response_json(response).await;

    assert_eq!(dashboard["totalMaterials"], 0);
    assert_eq!(dashboard["totalValue"], 0);
    assert_eq!(dashboard["lowStockCount"], 0);
    assert!(dashboard["recentInvoices"].as_array().unwrap().is_empty());

    let report = &dashboard["financialReport"];
    assert_eq!(report["revenue"], 0);
    assert_eq!(report["cost"], 0);
    assert_eq!(report["profit"], 0);
    let months = report["monthlyData"].as_array().unwrap();
    assert_eq!(months.len(), 12);
    assert_eq!(months[0]["month"], "Jan");
    assert_eq!(months[11]["month"], "Dec");
    assert!(months.iter().all(|m| m["revenue"] == 0 && m["cost"] == 0));
    assert_eq!(report["weeklyData"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn dashboard_aggregates_invoices_and_stock() {
    let app = TestApp::new().await;
    let cashew = app.create_material("Cashew milk", 100, 500).await;
    app.create_material("Soy milk", 2000, 1000).await;

    let response = app
        .post(
            "/api/inventory",
            json!({ "materialId": cashew["id"], "quantity": 10, "price": 150 }),
        )
        .await;
    assert_eq!(response.status(), 201);

    for (kind, total, date) in [
        ("IMPORT", 15_000_000, "2024-01-15"),
        ("EXPORT", 500_000, "2024-01-20"),
        ("EXPORT", 12_000_000, "2024-02-10"),
        ("IMPORT", 8_000_000, "2024-02-15"),
        ("EXPORT", 25_000_000, "2024-03-05"),
        ("EXPORT", 1_000, "2023-03-01"),
    ] {
        let response = app
            .post(
                "/api/invoices",
                json!({ "type": kind, "total": total, "date": date, "items": [] }),
            )
            .await;
        assert_eq!(response.status(), 201);
    }

    let dashboard = response_json(app.get("/api/dashboard").await).await;

    assert_eq!(dashboard["totalMaterials"], 2);
    assert_eq!(dashboard["totalValue"], 1500);
    assert_eq!(dashboard["lowStockCount"], 1);

    let composition = dashboard["totalMaterialsByMaterial"].as_array().unwrap();
    assert_eq!(composition[0], json!({ "name": "Cashew milk", "value": 110 }));
    assert_eq!(composition[1], json!({ "name": "Soy milk", "value": 2000 }));

    let recent = dashboard["recentInvoices"].as_array().unwrap();
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0]["total"], 25_000_000);
    // the 2023 invoice is the oldest and falls off
    assert!(recent.iter().all(|inv| inv["total"] != 1_000));

    let report = &dashboard["financialReport"];
    assert_eq!(report["revenue"], 37_501_000);
    assert_eq!(report["cost"], 23_000_000);
    assert_eq!(report["profit"], 14_501_000);
    assert_eq!(report["inventoryValue"], 1500);

    let months = report["monthlyData"].as_array().unwrap();
    assert_eq!(months[0]["revenue"], 500_000);
    assert_eq!(months[0]["cost"], 15_000_000);
    assert_eq!(months[1]["revenue"], 12_000_000);
    assert_eq!(months[1]["cost"], 8_000_000);
    // March merges 2023 and 2024
    assert_eq!(months[2]["revenue"], 25_001_000);
    assert_eq!(months[2]["monthNumber"], 3);

    let weeks = report["weeklyData"].as_array().unwrap();
    assert_eq!(weeks[0]["name"], "Week 1");
    assert_eq!(weeks[3]["revenue"].as_f64().unwrap(), 37_501_000.0 * 0.30);
    assert_eq!(weeks[2]["cost"].as_f64().unwrap(), 23_000_000.0 * 0.30);
}

#[tokio::test]
async fn health_and_status_endpoints() {
    let app = TestApp::new().await;

    let response = app.get("/health").await;
    assert_eq!(response.status(), 200);
    assert_eq!(response_json(response).await["status"], "healthy");

    let response = app.get("/api/status").await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["service"], "stockroom-api");
    assert_eq!(body["environment"], "test");
}
