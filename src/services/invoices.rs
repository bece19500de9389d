use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::deserialize_optional_date,
    db::DbPool,
    entities::{
        inventory_item::{self, BatchStatus},
        invoice::{self, InvoiceStatus, InvoiceType},
        invoice_item, material,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::stock,
};

/// One line of an invoice request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLineInput {
    pub material_id: Option<i32>,
    pub quantity: i64,
    pub price: i64,
}

impl InvoiceLineInput {
    pub fn line_total(&self) -> i64 {
        self.quantity.saturating_mul(self.price)
    }
}

/// Body of `POST /api/invoices`. `items` is required but may be empty.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceInput {
    #[serde(rename = "type")]
    pub kind: InvoiceType,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    #[schema(value_type = Option<String>)]
    pub date: Option<DateTime<Utc>>,
    #[validate(length(max = 255))]
    pub partner_name: Option<String>,
    /// Used only when `items` is empty; otherwise recomputed from the lines
    #[validate(range(min = 0, message = "total must not be negative"))]
    pub total: Option<i64>,
    pub status: Option<InvoiceStatus>,
    pub note: Option<String>,
    #[validate(length(max = 64))]
    pub invoice_number: Option<String>,
    pub items: Vec<InvoiceLineInput>,
}

impl CreateInvoiceInput {
    fn validate_lines(&self) -> Result<(), ServiceError> {
        for (index, line) in self.items.iter().enumerate() {
            if line.quantity <= 0 {
                return Err(ServiceError::invalid_field(
                    "items",
                    format!("items[{}].quantity must be positive", index),
                ));
            }
            if line.price < 0 {
                return Err(ServiceError::invalid_field(
                    "items",
                    format!("items[{}].price must not be negative", index),
                ));
            }
        }
        Ok(())
    }

    /// Sum of quantity x price over the lines, or the caller's figure for a header-only invoice.
    pub fn effective_total(&self) -> i64 {
        if self.items.is_empty() {
            return self.total.unwrap_or(0);
        }
        self.items
            .iter()
            .fold(0i64, |acc, line| acc.saturating_add(line.line_total()))
    }
}

/// Line item with the material it references, `null` once the material is deleted
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLineView {
    #[serde(flatten)]
    pub item: invoice_item::Model,
    pub material: Option<material::Model>,
}

/// Invoice header plus its lines
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: invoice::Model,
    pub items: Vec<InvoiceLineView>,
}

/// Fallback batch code for imports without an invoice number
fn fallback_batch_code(now: DateTime<Utc>) -> String {
    format!("BATCH-{}", now.timestamp_millis())
}

/// Service for import/export invoices and their stock effects
#[derive(Clone)]
pub struct InvoiceService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl InvoiceService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Most recent first: date descending, then id descending
    #[instrument(skip(self))]
    pub async fn list_invoices(
        &self,
        limit: Option<u64>,
    ) -> Result<Vec<invoice::Model>, ServiceError> {
        let db = &*self.db_pool;
        invoice::Entity::find()
            .order_by_desc(invoice::Column::Date)
            .order_by_desc(invoice::Column::Id)
            .limit(limit)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn get_invoice(&self, id: i32) -> Result<InvoiceDetail, ServiceError> {
        let db = &*self.db_pool;
        let invoice = invoice::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Invoice {} not found", id)))?;

        let items = invoice_item::Entity::find()
            .filter(invoice_item::Column::InvoiceId.eq(id))
            .order_by_asc(invoice_item::Column::Id)
            .find_also_related(material::Entity)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .map(|(item, material)| InvoiceLineView { item, material })
            .collect();

        Ok(InvoiceDetail { invoice, items })
    }

    /// Persists the invoice, its lines, the signed stock movement of every line and, for
    /// imports, one generated batch per line. All of it commits or none of it does.
    #[instrument(skip(self, input), fields(kind = input.kind.as_str(), items = input.items.len()))]
    pub async fn create_invoice(
        &self,
        input: CreateInvoiceInput,
    ) -> Result<InvoiceDetail, ServiceError> {
        input.validate()?;
        input.validate_lines()?;

        let total = input.effective_total();
        if let Some(submitted) = input.total {
            if !input.items.is_empty() && submitted != total {
                warn!(submitted, computed = total, "invoice total replaced by line sum");
            }
        }

        let db = &*self.db_pool;

        // Checked before the transaction opens; its first statement must be the header insert.
        let referenced: Vec<i32> = input.items.iter().filter_map(|l| l.material_id).collect();
        let missing = stock::missing_materials(db, &referenced).await?;
        if let Some(first) = missing.first() {
            return Err(ServiceError::invalid_field(
                "items",
                format!("Material {} does not exist", first),
            ));
        }

        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let mut header = invoice::ActiveModel {
            kind: Set(input.kind),
            partner_name: Set(input.partner_name),
            total: Set(total),
            note: Set(input.note),
            invoice_number: Set(input.invoice_number.clone()),
            ..Default::default()
        };
        if let Some(date) = input.date {
            header.date = Set(date);
        }
        if let Some(status) = input.status {
            header.status = Set(status);
        }
        let invoice = header.insert(&txn).await.map_err(ServiceError::DatabaseError)?;

        let batch_code = input
            .invoice_number
            .clone()
            .unwrap_or_else(|| fallback_batch_code(Utc::now()));

        let mut adjustments = Vec::new();
        let mut batches = Vec::new();
        for line in &input.items {
            invoice_item::ActiveModel {
                invoice_id: Set(invoice.id),
                material_id: Set(line.material_id),
                quantity: Set(line.quantity),
                price: Set(line.price),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

            let Some(material_id) = line.material_id else {
                continue;
            };

            let delta = invoice.kind.stock_delta(line.quantity);
            if stock::apply_stock_delta(&txn, material_id, delta).await? {
                adjustments.push((material_id, delta));
            }

            // The stock movement above already covers the generated batch.
            if invoice.kind == InvoiceType::Import {
                let batch = inventory_item::ActiveModel {
                    material_id: Set(Some(material_id)),
                    quantity: Set(line.quantity),
                    price: Set(line.price),
                    date: Set(invoice.date),
                    status: Set(BatchStatus::Fresh),
                    batch_code: Set(Some(batch_code.clone())),
                    ..Default::default()
                }
                .insert(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?;
                batches.push(batch);
            }
        }

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(
            invoice_id = invoice.id,
            kind = invoice.kind.as_str(),
            total = invoice.total,
            batches = batches.len(),
            "invoice created"
        );

        self.event_sender
            .send_or_log(Event::InvoiceCreated {
                invoice_id: invoice.id,
                kind: invoice.kind,
                total: invoice.total,
                item_count: input.items.len(),
            })
            .await;
        for (material_id, delta) in adjustments {
            self.event_sender
                .send_or_log(Event::StockAdjusted { material_id, delta })
                .await;
        }
        for batch in batches {
            self.event_sender
                .send_or_log(Event::BatchRecorded {
                    batch_id: batch.id,
                    material_id: batch.material_id,
                    quantity: batch.quantity,
                })
                .await;
        }

        self.get_invoice(invoice.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(items: Vec<InvoiceLineInput>, total: Option<i64>) -> CreateInvoiceInput {
        CreateInvoiceInput {
            kind: InvoiceType::Import,
            date: None,
            partner_name: None,
            total,
            status: None,
            note: None,
            invoice_number: None,
            items,
        }
    }

    fn line(quantity: i64, price: i64) -> InvoiceLineInput {
        InvoiceLineInput {
            material_id: Some(1),
            quantity,
            price,
        }
    }

    #[test]
    fn total_is_recomputed_from_lines() {
        let req = input(vec![line(5, 100_000), line(2, 50)], Some(1));
        assert_eq!(req.effective_total(), 500_100);
    }

    #[test]
    fn header_only_invoice_keeps_submitted_total() {
        assert_eq!(input(vec![], Some(750)).effective_total(), 750);
        assert_eq!(input(vec![], None).effective_total(), 0);
    }

    #[test]
    fn non_positive_quantity_is_reported_on_items() {
        let err = input(vec![line(1, 1), line(0, 1)], None)
            .validate_lines()
            .unwrap_err();
        match err {
            ServiceError::InvalidField { field, message } => {
                assert_eq!(field, "items");
                assert!(message.contains("items[1]"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_items_fails_to_deserialize() {
        let parsed = serde_json::from_str::<CreateInvoiceInput>(r#"{"type": "IMPORT"}"#);
        assert!(parsed.is_err());
        let parsed =
            serde_json::from_str::<CreateInvoiceInput>(r#"{"type": "IMPORT", "items": 3}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn fallback_batch_code_uses_unix_millis() {
        let now = DateTime::from_timestamp_millis(1_717_200_000_123).unwrap();
        assert_eq!(fallback_batch_code(now), "BATCH-1717200000123");
    }
}
