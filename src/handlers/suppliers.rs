use axum::{extract::State, response::IntoResponse};

use super::common::{created_response, success_response, JsonBody};
use crate::{
    entities::supplier, errors::ServiceError, services::suppliers::CreateSupplierInput, AppState,
};

#[utoipa::path(
    get,
    path = "/api/suppliers",
    responses(
        (status = 200, description = "Suppliers ordered by id", body = [supplier::Model])
    ),
    tag = "suppliers"
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let suppliers = state.services.suppliers.list_suppliers().await?;
    Ok(success_response(suppliers))
}

#[utoipa::path(
    post,
    path = "/api/suppliers",
    request_body = CreateSupplierInput,
    responses(
        (status = 201, description = "Supplier created", body = supplier::Model),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "suppliers"
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateSupplierInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.suppliers.create_supplier(payload).await?;
    Ok(created_response(created))
}
