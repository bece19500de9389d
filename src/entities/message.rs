use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    #[sea_orm(string_value = "supplier_offer")]
    SupplierOffer,
    #[sea_orm(string_value = "customer_request")]
    CustomerRequest,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    #[sea_orm(string_value = "unread")]
    Unread,
    #[sea_orm(string_value = "processed")]
    Processed,
}

/// Inbox entry from a supplier or customer. `metadata` is opaque and typically carries
/// `{materialId, quantity, price}` for prefilling an invoice.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "messages")]
#[serde(rename_all = "camelCase")]
#[schema(as = Message)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub from_name: String,
    pub content: String,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub kind: MessageType,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Json>,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if insert {
            if let ActiveValue::NotSet = active_model.status {
                active_model.status = Set(MessageStatus::Unread);
            }
            active_model.created_at = Set(Utc::now());
        }
        Ok(active_model)
    }
}
