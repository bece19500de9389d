use axum::{extract::State, response::IntoResponse};

use super::common::{created_response, success_response, JsonBody, PathId, QueryParams};
use crate::{
    common::LimitParams,
    entities::invoice,
    errors::ServiceError,
    services::invoices::{CreateInvoiceInput, InvoiceDetail},
    AppState,
};

/// List invoices, most recent first
#[utoipa::path(
    get,
    path = "/api/invoices",
    params(LimitParams),
    responses(
        (status = 200, description = "Invoices by date descending", body = [invoice::Model]),
        (status = 400, description = "Invalid query string", body = crate::errors::ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<LimitParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let invoices = state.services.invoices.list_invoices(params.limit).await?;
    Ok(success_response(invoices))
}

/// Fetch an invoice with its line items
#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    params(("id" = i32, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice with items", body = InvoiceDetail),
        (status = 400, description = "Invalid id", body = crate::errors::ErrorResponse),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<impl IntoResponse, ServiceError> {
    let invoice = state.services.invoices.get_invoice(id).await?;
    Ok(success_response(invoice))
}

/// Create an import or export invoice and apply its stock movements
#[utoipa::path(
    post,
    path = "/api/invoices",
    request_body = CreateInvoiceInput,
    responses(
        (status = 201, description = "Invoice created", body = InvoiceDetail),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn create_invoice(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateInvoiceInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let invoice = state.services.invoices.create_invoice(payload).await?;
    Ok(created_response(invoice))
}
