use axum::{extract::State, response::IntoResponse};

use super::common::{created_response, success_response, JsonBody, PathId};
use crate::{
    errors::{ErrorResponse, ServiceError},
    services::employees::{CreateEmployeeInput, EmployeeWithUser},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "Employees with their accounts", body = [EmployeeWithUser])
    ),
    tag = "employees"
)]
pub async fn list_employees(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let employees = state.services.employees.list_employees().await?;
    Ok(success_response(employees))
}

#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployeeInput,
    responses(
        (status = 201, description = "Employee created", body = EmployeeWithUser),
        (status = 400, description = "Invalid request or unknown user", body = ErrorResponse),
        (status = 409, description = "User already has an employee record", body = ErrorResponse)
    ),
    tag = "employees"
)]
pub async fn create_employee(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateEmployeeInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.employees.create_employee(payload).await?;
    Ok(created_response(created))
}

#[utoipa::path(
    get,
    path = "/api/employees/by-user/{userId}",
    params(("userId" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "Employee record for the user", body = EmployeeWithUser),
        (status = 404, description = "No employee record", body = ErrorResponse)
    ),
    tag = "employees"
)]
pub async fn get_employee_by_user(
    State(state): State<AppState>,
    PathId(user_id): PathId,
) -> Result<impl IntoResponse, ServiceError> {
    let employee = state.services.employees.get_by_user(user_id).await?;
    Ok(success_response(employee))
}
