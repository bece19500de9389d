use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::message::{self, MessageStatus, MessageType},
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Body of `POST /api/messages`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageInput {
    #[validate(length(min = 1, max = 255, message = "fromName must not be empty"))]
    pub from_name: String,
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: String,
    #[serde(rename = "type")]
    pub kind: MessageType,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
    pub status: Option<MessageStatus>,
}

/// Body of `PATCH /api/messages/:id`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateMessageStatusInput {
    pub status: MessageStatus,
}

/// Supplier offers and customer requests inbox
#[derive(Clone)]
pub struct MessageService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl MessageService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Newest first
    #[instrument(skip(self))]
    pub async fn list_messages(&self) -> Result<Vec<message::Model>, ServiceError> {
        let db = &*self.db_pool;
        message::Entity::find()
            .order_by_desc(message::Column::CreatedAt)
            .order_by_desc(message::Column::Id)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn create_message(
        &self,
        input: CreateMessageInput,
    ) -> Result<message::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db_pool;

        let mut model = message::ActiveModel {
            from_name: Set(input.from_name),
            content: Set(input.content),
            kind: Set(input.kind),
            metadata: Set(input.metadata),
            ..Default::default()
        };
        if let Some(status) = input.status {
            model.status = Set(status);
        }

        let created = model.insert(db).await.map_err(ServiceError::DatabaseError)?;
        info!(message_id = created.id, kind = ?created.kind, "message received");
        self.event_sender
            .send_or_log(Event::MessageReceived(created.id))
            .await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: i32,
        status: MessageStatus,
    ) -> Result<message::Model, ServiceError> {
        let db = &*self.db_pool;
        let existing = message::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Message {} not found", id)))?;

        let mut model: message::ActiveModel = existing.into();
        model.status = Set(status);
        let updated = model.update(db).await.map_err(ServiceError::DatabaseError)?;

        info!(message_id = id, status = ?status, "message status changed");
        self.event_sender
            .send_or_log(Event::MessageStatusChanged {
                message_id: id,
                status,
            })
            .await;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_input_uses_snake_case_kinds() {
        let input: CreateMessageInput = serde_json::from_str(
            r#"{"fromName": "Dairy Co", "content": "New offer", "type": "supplier_offer",
                "metadata": {"materialId": 1, "quantity": 50, "price": 20000}}"#,
        )
        .unwrap();
        assert_eq!(input.kind, MessageType::SupplierOffer);
        assert_eq!(input.metadata.unwrap()["quantity"], 50);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let parsed = serde_json::from_str::<UpdateMessageStatusInput>(r#"{"status": "archived"}"#);
        assert!(parsed.is_err());
    }
}
