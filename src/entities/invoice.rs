use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum InvoiceType {
    /// Stock in
    #[sea_orm(string_value = "IMPORT")]
    Import,
    /// Stock out
    #[sea_orm(string_value = "EXPORT")]
    Export,
}

impl InvoiceType {
    /// Sign applied to line item quantities when moving stock.
    pub fn stock_delta(&self, quantity: i64) -> i64 {
        match self {
            InvoiceType::Import => quantity,
            InvoiceType::Export => -quantity,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceType::Import => "IMPORT",
            InvoiceType::Export => "EXPORT",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[sea_orm(string_value = "completed")]
    Completed,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "invoices")]
#[serde(rename_all = "camelCase")]
#[schema(as = Invoice)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub kind: InvoiceType,
    pub date: DateTime<Utc>,
    pub partner_name: Option<String>,
    pub total: i64,
    pub status: InvoiceStatus,
    pub note: Option<String>,
    pub invoice_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::invoice_item::Entity")]
    InvoiceItems,
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
        if insert {
            let now = Utc::now();
            if let ActiveValue::NotSet = active_model.date {
                active_model.date = Set(now);
            }
            if let ActiveValue::NotSet = active_model.total {
                active_model.total = Set(0);
            }
            if let ActiveValue::NotSet = active_model.status {
                active_model.status = Set(InvoiceStatus::Completed);
            }
            active_model.created_at = Set(now);
        }
        Ok(active_model)
    }
}
