use axum::{extract::State, response::IntoResponse};

use super::common::{created_response, success_response, JsonBody, PathId};
use crate::{
    entities::message,
    errors::ServiceError,
    services::messages::{CreateMessageInput, UpdateMessageStatusInput},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/messages",
    responses(
        (status = 200, description = "Messages, newest first", body = [message::Model])
    ),
    tag = "messages"
)]
pub async fn list_messages(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let messages = state.services.messages.list_messages().await?;
    Ok(success_response(messages))
}

#[utoipa::path(
    post,
    path = "/api/messages",
    request_body = CreateMessageInput,
    responses(
        (status = 201, description = "Message stored", body = message::Model),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "messages"
)]
pub async fn create_message(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateMessageInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.messages.create_message(payload).await?;
    Ok(created_response(created))
}

/// Mark a message as read or processed
#[utoipa::path(
    patch,
    path = "/api/messages/{id}",
    params(("id" = i32, Path, description = "Message id")),
    request_body = UpdateMessageStatusInput,
    responses(
        (status = 200, description = "Message updated", body = message::Model),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Message not found", body = crate::errors::ErrorResponse)
    ),
    tag = "messages"
)]
pub async fn update_message_status(
    State(state): State<AppState>,
    PathId(id): PathId,
    JsonBody(payload): JsonBody<UpdateMessageStatusInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .services
        .messages
        .update_status(id, payload.status)
        .await?;
    Ok(success_response(updated))
}
