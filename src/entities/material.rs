use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_UNIT: &str = "ml";

/// A stock-keeping unit. `current_stock` is a running total moved by batches and invoices.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "materials")]
#[serde(rename_all = "camelCase")]
#[schema(as = Material)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// Free-text category
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub unit: String,
    /// Reorder threshold
    pub min_stock: i64,
    pub current_stock: i64,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Strictly below the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.current_stock < self.min_stock
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inventory_item::Entity")]
    InventoryItems,
    #[sea_orm(has_many = "super::invoice_item::Entity")]
    InvoiceItems,
}

impl Related<super::inventory_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryItems.def()
    }
}

impl Related<super::invoice_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceItems.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            if let ActiveValue::NotSet = active_model.unit {
                active_model.unit = Set(DEFAULT_UNIT.to_string());
            }
            if let ActiveValue::NotSet = active_model.min_stock {
                active_model.min_stock = Set(0);
            }
            if let ActiveValue::NotSet = active_model.current_stock {
                active_model.current_stock = Set(0);
            }
            active_model.created_at = Set(now);
        }

        active_model.updated_at = Set(now);
        Ok(active_model)
    }
}
