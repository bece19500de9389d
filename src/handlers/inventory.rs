use axum::{extract::State, response::IntoResponse};
use chrono::Utc;

use super::common::{created_response, success_response, JsonBody};
use crate::{
    entities::inventory_item,
    errors::ServiceError,
    services::{
        analytics::InventorySummary,
        inventory::{InventoryBatchView, RecordBatchInput},
    },
    AppState,
};

/// List batches with their derived expiry status
#[utoipa::path(
    get,
    path = "/api/inventory",
    responses(
        (status = 200, description = "Inventory batches ordered by id", body = [InventoryBatchView])
    ),
    tag = "inventory"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let today = Utc::now().date_naive();
    let batches = state.services.inventory.list_batches(today).await?;
    Ok(success_response(batches))
}

/// Record a received batch; the material's stock grows by its quantity
#[utoipa::path(
    post,
    path = "/api/inventory",
    request_body = RecordBatchInput,
    responses(
        (status = 201, description = "Batch recorded", body = inventory_item::Model),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn create_inventory(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RecordBatchInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let batch = state.services.inventory.record_batch(payload).await?;
    Ok(created_response(batch))
}

/// Per-material stock rollup
#[utoipa::path(
    get,
    path = "/api/inventory/summary",
    responses(
        (status = 200, description = "Inventory summary", body = InventorySummary)
    ),
    tag = "inventory"
)]
pub async fn inventory_summary(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let today = Utc::now().date_naive();
    let summary = state.services.analytics.inventory_summary(today).await?;
    Ok(success_response(summary))
}
