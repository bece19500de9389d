#![allow(dead_code)]

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use serde_json::Value;
use stockroom_api::{
    config::AppConfig,
    db,
    events::{self, EventSender},
    services::users::CreateUserInput,
    AppState,
};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "secret-pass";

/// Harness for driving the full router against a throwaway SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
    // dropped last so the database file outlives the pool
    _dir: TempDir,
}

impl TestApp {
    /// Fresh database, migrations applied, tokens optional.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Same as [`TestApp::new`] but every `/api` route except login needs a token.
    pub async fn with_auth_required() -> Self {
        Self::with_config(|cfg| cfg.auth_required = true).await
    }

    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("temp dir for test database");
        let db_path = dir.path().join("stockroom_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "test".to_string(),
        );
        cfg.db_max_connections = 4;
        cfg.db_min_connections = 1;
        adjust(&mut cfg);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), cfg, EventSender::new(event_tx));
        let router = stockroom_api::app_router(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
            _dir: dir,
        }
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Response {
        self.request(Method::POST, uri, Some(body), None).await
    }

    /// POST a raw, possibly malformed, JSON body.
    pub async fn post_raw(&self, uri: &str, raw: &str) -> Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(raw.to_string()))
            .expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Creates a material through the API and returns its JSON.
    pub async fn create_material(&self, name: &str, current_stock: i64, min_stock: i64) -> Value {
        let response = self
            .post(
                "/api/materials",
                serde_json::json!({
                    "name": name,
                    "type": "Nut milk",
                    "unit": "ml",
                    "currentStock": current_stock,
                    "minStock": min_stock,
                }),
            )
            .await;
        assert_eq!(response.status(), 201, "material creation failed");
        response_json(response).await
    }

    pub async fn create_supplier(&self, name: &str) -> Value {
        let response = self
            .post("/api/suppliers", serde_json::json!({ "name": name }))
            .await;
        assert_eq!(response.status(), 201, "supplier creation failed");
        response_json(response).await
    }

    pub async fn current_stock(&self, material_id: i64) -> i64 {
        let response = self.get(&format!("/api/materials/{material_id}")).await;
        assert_eq!(response.status(), 200);
        response_json(response).await["currentStock"]
            .as_i64()
            .expect("currentStock")
    }

    /// Registers a user directly through the service layer.
    pub async fn create_user(&self, username: &str) -> i32 {
        self.state
            .services
            .users
            .create_user(CreateUserInput {
                username: username.to_string(),
                password: TEST_PASSWORD.to_string(),
                full_name: format!("{username} tester"),
                role: None,
                email: None,
            })
            .await
            .expect("create user")
            .id
    }

    /// Logs in and returns the bearer token.
    pub async fn login(&self, username: &str) -> String {
        let response = self
            .post(
                "/api/login",
                serde_json::json!({ "username": username, "password": TEST_PASSWORD }),
            )
            .await;
        assert_eq!(response.status(), 200, "login failed");
        response_json(response).await["token"]
            .as_str()
            .expect("token")
            .to_string()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}
