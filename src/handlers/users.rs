use axum::{extract::State, response::IntoResponse};

use super::common::{created_response, success_response, JsonBody, PathId};
use crate::{
    auth::AuthUser,
    errors::{ErrorResponse, ServiceError},
    services::users::{CreateUserInput, LoginInput, LoginResponse, UserProfile},
    AppState,
};

/// Exchange credentials for a session token
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginInput,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Malformed request", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let session = state.services.users.login(payload).await?;
    Ok(success_response(session))
}

/// The account behind the bearer token
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "auth"
)]
pub async fn current_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let profile = state
        .services
        .users
        .get_user(auth_user.user_id)
        .await
        .map_err(|e| match e {
            // token outlived its account
            ServiceError::NotFound(_) => ServiceError::Unauthorized("Unknown user".to_string()),
            other => other,
        })?;
    Ok(success_response(profile))
}

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users ordered by id", body = [UserProfile])
    ),
    tag = "users"
)]
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let users = state.services.users.list_users().await?;
    Ok(success_response(users))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserProfile),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<impl IntoResponse, ServiceError> {
    let user = state.services.users.get_user(id).await?;
    Ok(success_response(user))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserInput,
    responses(
        (status = 201, description = "User created", body = UserProfile),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Username taken", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateUserInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.users.create_user(payload).await?;
    Ok(created_response(created))
}
