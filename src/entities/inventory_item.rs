use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Days ahead of expiry during which a batch is flagged.
pub const EXPIRY_WARNING_DAYS: i64 = 30;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    #[sea_orm(string_value = "fresh")]
    Fresh,
    #[sea_orm(string_value = "warning")]
    Warning,
    #[sea_orm(string_value = "expired")]
    Expired,
}

impl Default for BatchStatus {
    fn default() -> Self {
        BatchStatus::Fresh
    }
}

impl BatchStatus {
    /// Classifies an expiry date relative to `today`, counted in whole UTC calendar days.
    pub fn from_expiry(expiry: Option<DateTime<Utc>>, today: NaiveDate) -> Self {
        let Some(expiry) = expiry else {
            return BatchStatus::Fresh;
        };

        let days_until_expiry = expiry
            .date_naive()
            .signed_duration_since(today)
            .num_days();

        if days_until_expiry < 0 {
            BatchStatus::Expired
        } else if days_until_expiry <= EXPIRY_WARNING_DAYS {
            BatchStatus::Warning
        } else {
            BatchStatus::Fresh
        }
    }
}

/// A received lot of a material.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "inventory")]
#[serde(rename_all = "camelCase")]
#[schema(as = InventoryItem)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub material_id: Option<i32>,
    pub supplier_id: Option<i32>,
    pub quantity: i64,
    /// Unit price
    pub price: i64,
    pub date: DateTime<Utc>,
    pub expiry: Option<DateTime<Utc>>,
    pub status: BatchStatus,
    pub batch_code: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// quantity x unit price
    pub fn value(&self) -> i64 {
        self.quantity.saturating_mul(self.price)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::material::Entity",
        from = "Column::MaterialId",
        to = "super::material::Column::Id",
        on_delete = "SetNull"
    )]
    Material,
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id",
        on_delete = "SetNull"
    )]
    Supplier,
}

impl Related<super::material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Material.def()
    }
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
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
            if let ActiveValue::NotSet = active_model.status {
                active_model.status = Set(BatchStatus::default());
            }
            active_model.created_at = Set(now);
        }
        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn at_noon(days_from_today: i64) -> Option<DateTime<Utc>> {
        let date = today() + Duration::days(days_from_today);
        Some(Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap()))
    }

    #[test]
    fn classifies_expiry_windows() {
        assert_eq!(BatchStatus::from_expiry(at_noon(10), today()), BatchStatus::Warning);
        assert_eq!(BatchStatus::from_expiry(at_noon(-1), today()), BatchStatus::Expired);
        assert_eq!(BatchStatus::from_expiry(at_noon(40), today()), BatchStatus::Fresh);
        assert_eq!(BatchStatus::from_expiry(None, today()), BatchStatus::Fresh);
    }

    #[test]
    fn warning_window_is_inclusive_at_both_ends() {
        assert_eq!(BatchStatus::from_expiry(at_noon(0), today()), BatchStatus::Warning);
        assert_eq!(BatchStatus::from_expiry(at_noon(30), today()), BatchStatus::Warning);
        assert_eq!(BatchStatus::from_expiry(at_noon(31), today()), BatchStatus::Fresh);
    }
}
