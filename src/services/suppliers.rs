use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::supplier,
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Body of `POST /api/suppliers`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierInput {
    #[validate(length(min = 1, max = 255, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(max = 64))]
    pub phone: Option<String>,
    #[validate(length(max = 255))]
    pub email: Option<String>,
    #[validate(length(max = 255))]
    pub contact: Option<String>,
    pub address: Option<String>,
    pub note: Option<String>,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: Option<i32>,
}

/// Service for managing suppliers
#[derive(Clone)]
pub struct SupplierService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl SupplierService {
    /// Creates a new supplier service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Lists all suppliers ordered by id
    #[instrument(skip(self))]
    pub async fn list_suppliers(&self) -> Result<Vec<supplier::Model>, ServiceError> {
        let db = &*self.db_pool;
        supplier::Entity::find()
            .order_by_asc(supplier::Column::Id)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Creates a new supplier
    #[instrument(skip(self))]
    pub async fn create_supplier(
        &self,
        input: CreateSupplierInput,
    ) -> Result<supplier::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db_pool;

        let model = supplier::ActiveModel {
            name: Set(input.name),
            phone: Set(input.phone),
            email: Set(input.email),
            contact: Set(input.contact),
            address: Set(input.address),
            note: Set(input.note),
            rating: Set(input.rating.unwrap_or(supplier::DEFAULT_RATING)),
            ..Default::default()
        };

        let created = model.insert(db).await.map_err(ServiceError::DatabaseError)?;
        info!(supplier_id = created.id, name = %created.name, "supplier created");
        self.event_sender
            .send_or_log(Event::SupplierCreated(created.id))
            .await;
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_outside_one_to_five_is_rejected() {
        let mut input: CreateSupplierInput =
            serde_json::from_str(r#"{"name": "Dairy Co", "rating": 6}"#).unwrap();
        assert!(input.validate().is_err());

        input.rating = Some(1);
        assert!(input.validate().is_ok());
    }
}
