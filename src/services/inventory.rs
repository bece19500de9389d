use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::deserialize_optional_date,
    db::DbPool,
    entities::{
        inventory_item::{self, BatchStatus},
        supplier,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::stock,
};

/// Body of `POST /api/inventory`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordBatchInput {
    pub material_id: Option<i32>,
    pub supplier_id: Option<i32>,
    #[validate(range(min = 1, message = "quantity must be positive"))]
    pub quantity: i64,
    #[validate(range(min = 0, message = "price must not be negative"))]
    pub price: i64,
    /// Receipt date, `YYYY-MM-DD` or RFC 3339; defaults to now
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    #[schema(value_type = Option<String>)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    #[schema(value_type = Option<String>)]
    pub expiry: Option<DateTime<Utc>>,
    pub status: Option<BatchStatus>,
    #[validate(length(max = 64))]
    pub batch_code: Option<String>,
    pub note: Option<String>,
}

/// A stored batch together with the freshness derived from its expiry date
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryBatchView {
    #[serde(flatten)]
    pub batch: inventory_item::Model,
    pub expiry_status: BatchStatus,
}

impl InventoryBatchView {
    pub fn new(batch: inventory_item::Model, today: NaiveDate) -> Self {
        let expiry_status = BatchStatus::from_expiry(batch.expiry, today);
        Self {
            batch,
            expiry_status,
        }
    }
}

/// Service for recording and listing inventory batches
#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Lists every batch ordered by id, classified against `today`
    #[instrument(skip(self))]
    pub async fn list_batches(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<InventoryBatchView>, ServiceError> {
        let db = &*self.db_pool;
        let batches = inventory_item::Entity::find()
            .order_by_asc(inventory_item::Column::Id)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(batches
            .into_iter()
            .map(|batch| InventoryBatchView::new(batch, today))
            .collect())
    }

    /// Inserts the batch and moves the material's stock by its quantity, atomically
    #[instrument(skip(self))]
    pub async fn record_batch(
        &self,
        input: RecordBatchInput,
    ) -> Result<inventory_item::Model, ServiceError> {
        input.validate()?;

        let db = &*self.db_pool;

        // Reference checks run outside the transaction so its first statement is a write;
        // SQLite makes concurrent writers wait on the busy timeout only in that case.
        if let Some(material_id) = input.material_id {
            if !stock::missing_materials(db, &[material_id]).await?.is_empty() {
                return Err(ServiceError::invalid_field(
                    "materialId",
                    format!("Material {} does not exist", material_id),
                ));
            }
        }
        if let Some(supplier_id) = input.supplier_id {
            let exists = supplier::Entity::find_by_id(supplier_id)
                .one(db)
                .await
                .map_err(ServiceError::DatabaseError)?
                .is_some();
            if !exists {
                return Err(ServiceError::invalid_field(
                    "supplierId",
                    format!("Supplier {} does not exist", supplier_id),
                ));
            }
        }

        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let mut model = inventory_item::ActiveModel {
            material_id: Set(input.material_id),
            supplier_id: Set(input.supplier_id),
            quantity: Set(input.quantity),
            price: Set(input.price),
            expiry: Set(input.expiry),
            batch_code: Set(input.batch_code),
            note: Set(input.note),
            ..Default::default()
        };
        if let Some(date) = input.date {
            model.date = Set(date);
        }
        if let Some(status) = input.status {
            model.status = Set(status);
        }

        let batch = model.insert(&txn).await.map_err(ServiceError::DatabaseError)?;

        let adjusted = match batch.material_id {
            Some(material_id) => stock::apply_stock_delta(&txn, material_id, batch.quantity).await?,
            None => false,
        };

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(
            batch_id = batch.id,
            material_id = ?batch.material_id,
            quantity = batch.quantity,
            "inventory batch recorded"
        );

        self.event_sender
            .send_or_log(Event::BatchRecorded {
                batch_id: batch.id,
                material_id: batch.material_id,
                quantity: batch.quantity,
            })
            .await;
        if let (true, Some(material_id)) = (adjusted, batch.material_id) {
            self.event_sender
                .send_or_log(Event::StockAdjusted {
                    material_id,
                    delta: batch.quantity,
                })
                .await;
        }

        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn input_accepts_plain_dates() {
        let input: RecordBatchInput = serde_json::from_str(
            r#"{"materialId": 1, "quantity": 4, "price": 25000, "expiry": "2024-07-01"}"#,
        )
        .unwrap();
        assert!(input.date.is_none());
        assert_eq!(
            input.expiry.map(|e| e.date_naive()),
            NaiveDate::from_ymd_opt(2024, 7, 1)
        );
    }

    #[test]
    fn zero_quantity_is_invalid() {
        let input: RecordBatchInput =
            serde_json::from_str(r#"{"materialId": 1, "quantity": 0, "price": 1}"#).unwrap();
        let err = ServiceError::from(input.validate().unwrap_err());
        assert_matches!(err, ServiceError::InvalidField { ref field, .. } if field == "quantity");
    }

    #[test]
    fn view_flattens_batch_fields() {
        let now = Utc::now();
        let batch = inventory_item::Model {
            id: 3,
            material_id: Some(1),
            supplier_id: None,
            quantity: 2,
            price: 10,
            date: now,
            expiry: None,
            status: BatchStatus::Fresh,
            batch_code: Some("B-1".into()),
            note: None,
            created_at: now,
        };
        let json = serde_json::to_value(InventoryBatchView::new(batch, now.date_naive())).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["batchCode"], "B-1");
        assert_eq!(json["expiryStatus"], "fresh");
    }
}
