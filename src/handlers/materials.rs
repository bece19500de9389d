use axum::{extract::State, response::IntoResponse};

use super::common::{created_response, no_content_response, success_response, JsonBody, PathId};
use crate::{
    entities::material,
    errors::ServiceError,
    services::materials::{CreateMaterialInput, UpdateMaterialInput},
    AppState,
};

/// List all materials
#[utoipa::path(
    get,
    path = "/api/materials",
    responses(
        (status = 200, description = "Materials ordered by id", body = [material::Model])
    ),
    tag = "materials"
)]
pub async fn list_materials(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let materials = state.services.materials.list_materials().await?;
    Ok(success_response(materials))
}

/// Fetch one material
#[utoipa::path(
    get,
    path = "/api/materials/{id}",
    params(("id" = i32, Path, description = "Material id")),
    responses(
        (status = 200, description = "Material", body = material::Model),
        (status = 400, description = "Invalid id", body = crate::errors::ErrorResponse),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse)
    ),
    tag = "materials"
)]
pub async fn get_material(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<impl IntoResponse, ServiceError> {
    let material = state.services.materials.get_material(id).await?;
    Ok(success_response(material))
}

/// Create a material
#[utoipa::path(
    post,
    path = "/api/materials",
    request_body = CreateMaterialInput,
    responses(
        (status = 201, description = "Material created", body = material::Model),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "materials"
)]
pub async fn create_material(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateMaterialInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.materials.create_material(payload).await?;
    Ok(created_response(created))
}

/// Partially update a material
#[utoipa::path(
    put,
    path = "/api/materials/{id}",
    params(("id" = i32, Path, description = "Material id")),
    request_body = UpdateMaterialInput,
    responses(
        (status = 200, description = "Material updated", body = material::Model),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse)
    ),
    tag = "materials"
)]
pub async fn update_material(
    State(state): State<AppState>,
    PathId(id): PathId,
    JsonBody(payload): JsonBody<UpdateMaterialInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.materials.update_material(id, payload).await?;
    Ok(success_response(updated))
}

/// Delete a material
#[utoipa::path(
    delete,
    path = "/api/materials/{id}",
    params(("id" = i32, Path, description = "Material id")),
    responses(
        (status = 204, description = "Material deleted"),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse)
    ),
    tag = "materials"
)]
pub async fn delete_material(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.materials.delete_material(id).await?;
    Ok(no_content_response())
}
