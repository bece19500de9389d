use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::material,
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Body of `POST /api/materials`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaterialInput {
    #[validate(length(min = 1, max = 255, message = "name must not be empty"))]
    pub name: String,
    #[serde(rename = "type")]
    #[validate(length(max = 100))]
    pub kind: Option<String>,
    #[validate(length(min = 1, max = 32, message = "unit must not be empty"))]
    pub unit: Option<String>,
    #[validate(range(min = 0, message = "minStock must not be negative"))]
    pub min_stock: Option<i64>,
    #[validate(range(min = 0, message = "currentStock must not be negative"))]
    pub current_stock: Option<i64>,
    pub description: Option<String>,
    #[validate(length(max = 2048))]
    pub image_url: Option<String>,
}

/// Body of `PUT /api/materials/:id`; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMaterialInput {
    #[validate(length(min = 1, max = 255, message = "name must not be empty"))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    #[validate(length(max = 100))]
    pub kind: Option<String>,
    #[validate(length(min = 1, max = 32, message = "unit must not be empty"))]
    pub unit: Option<String>,
    #[validate(range(min = 0, message = "minStock must not be negative"))]
    pub min_stock: Option<i64>,
    pub current_stock: Option<i64>,
    pub description: Option<String>,
    #[validate(length(max = 2048))]
    pub image_url: Option<String>,
}

/// Service for managing materials
#[derive(Clone)]
pub struct MaterialService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl MaterialService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Lists all materials ordered by id
    #[instrument(skip(self))]
    pub async fn list_materials(&self) -> Result<Vec<material::Model>, ServiceError> {
        let db = &*self.db_pool;
        material::Entity::find()
            .order_by_asc(material::Column::Id)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn get_material(&self, id: i32) -> Result<material::Model, ServiceError> {
        let db = &*self.db_pool;
        material::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Material {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn create_material(
        &self,
        input: CreateMaterialInput,
    ) -> Result<material::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db_pool;

        let mut model = material::ActiveModel {
            name: Set(input.name),
            kind: Set(input.kind),
            description: Set(input.description),
            image_url: Set(input.image_url),
            ..Default::default()
        };
        if let Some(unit) = input.unit {
            model.unit = Set(unit);
        }
        if let Some(min_stock) = input.min_stock {
            model.min_stock = Set(min_stock);
        }
        if let Some(current_stock) = input.current_stock {
            model.current_stock = Set(current_stock);
        }

        let created = model.insert(db).await.map_err(ServiceError::DatabaseError)?;
        info!(material_id = created.id, name = %created.name, "material created");
        self.event_sender
            .send_or_log(Event::MaterialCreated(created.id))
            .await;
        Ok(created)
    }

    /// Merges the supplied fields into the stored material and stamps `updatedAt`
    #[instrument(skip(self))]
    pub async fn update_material(
        &self,
        id: i32,
        input: UpdateMaterialInput,
    ) -> Result<material::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db_pool;

        let existing = self.get_material(id).await?;
        let mut model: material::ActiveModel = existing.into();

        if let Some(name) = input.name {
            model.name = Set(name);
        }
        if let Some(kind) = input.kind {
            model.kind = Set(Some(kind));
        }
        if let Some(unit) = input.unit {
            model.unit = Set(unit);
        }
        if let Some(min_stock) = input.min_stock {
            model.min_stock = Set(min_stock);
        }
        if let Some(current_stock) = input.current_stock {
            model.current_stock = Set(current_stock);
        }
        if let Some(description) = input.description {
            model.description = Set(Some(description));
        }
        if let Some(image_url) = input.image_url {
            model.image_url = Set(Some(image_url));
        }

        let updated = model.update(db).await.map_err(ServiceError::DatabaseError)?;
        info!(material_id = id, "material updated");
        self.event_sender
            .send_or_log(Event::MaterialUpdated(id))
            .await;
        Ok(updated)
    }

    /// Hard delete. Batches and invoice lines keep their rows with `materialId` cleared.
    #[instrument(skip(self))]
    pub async fn delete_material(&self, id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = material::Entity::delete_by_id(id)
            .exec(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Material {} not found", id)));
        }

        info!(material_id = id, "material deleted");
        self.event_sender
            .send_or_log(Event::MaterialDeleted(id))
            .await;
        Ok(())
    }
}
