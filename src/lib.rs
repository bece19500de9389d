//! Stockroom API Library
//!
//! Back-office inventory service: materials, suppliers, inventory batches, import/export
//! invoices with their stock movements, an inbox, employees and the dashboard figures.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod common;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod seed;
pub mod services;
pub mod tracing;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, patch, post},
    Router,
};
use serde_json::json;
use std::{sync::Arc, time::Duration};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};

use crate::auth::{AuthConfig, AuthService};
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: AppConfig,
    pub event_sender: EventSender,
    pub services: handlers::AppServices,
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Wires the services over one pool and event channel.
    pub fn new(db: Arc<DbPool>, config: AppConfig, event_sender: EventSender) -> Self {
        let auth = Arc::new(AuthService::new(AuthConfig::from(&config)));
        let services = handlers::AppServices::new(db.clone(), event_sender.clone(), auth.clone());
        Self {
            db,
            config,
            event_sender,
            services,
            auth,
        }
    }
}

/// Routes mounted under `/api`. Everything except login passes through `auth_middleware`.
pub fn api_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/login", post(handlers::users::login))
        .route("/status", get(api_status));

    let protected = Router::new()
        .route("/me", get(handlers::users::current_user))
        // Users
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route("/users/:id", get(handlers::users::get_user))
        // Materials
        .route(
            "/materials",
            get(handlers::materials::list_materials).post(handlers::materials::create_material),
        )
        .route(
            "/materials/:id",
            get(handlers::materials::get_material)
                .put(handlers::materials::update_material)
                .delete(handlers::materials::delete_material),
        )
        // Suppliers
        .route(
            "/suppliers",
            get(handlers::suppliers::list_suppliers).post(handlers::suppliers::create_supplier),
        )
        // Inventory
        .route(
            "/inventory",
            get(handlers::inventory::list_inventory).post(handlers::inventory::create_inventory),
        )
        .route(
            "/inventory/summary",
            get(handlers::inventory::inventory_summary),
        )
        // Invoices
        .route(
            "/invoices",
            get(handlers::invoices::list_invoices).post(handlers::invoices::create_invoice),
        )
        .route("/invoices/:id", get(handlers::invoices::get_invoice))
        // Dashboard
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
        // Messages
        .route(
            "/messages",
            get(handlers::messages::list_messages).post(handlers::messages::create_message),
        )
        .route(
            "/messages/:id",
            patch(handlers::messages::update_message_status),
        )
        // Employees
        .route(
            "/employees",
            get(handlers::employees::list_employees).post(handlers::employees::create_employee),
        )
        .route(
            "/employees/by-user/:userId",
            get(handlers::employees::get_employee_by_user),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            auth::auth_middleware,
        ));

    public.merge(protected)
}

/// Explicit origins when configured, otherwise permissive (config validation only allows
/// that in development or with the explicit override).
pub fn cors_layer(cfg: &AppConfig) -> CorsLayer {
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .filter_map(|origin| {
                    let trimmed = origin.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        HeaderValue::from_str(trimmed).ok()
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    match configured_origins {
        Some(origins) => CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    }
}

/// The complete HTTP application: `/api`, health, Swagger UI and the shared middleware stack.
pub fn app_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::<AppState>::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes(state.clone()))
        .merge(openapi::swagger_ui())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(timeout))
        .layer(cors)
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

async fn api_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "stockroom-api",
        "environment": state.config.environment,
        "authRequired": state.config.auth_required,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = db::check_connection(&state.db).await.is_ok();
    if !healthy {
        ::tracing::warn!("health check failed: database unreachable");
    }

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if healthy { "healthy" } else { "unhealthy" },
            "checks": { "database": if healthy { "healthy" } else { "unhealthy" } },
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}
