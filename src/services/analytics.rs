//! Dashboard and report figures.
//!
//! Everything here is read-only. The free functions are pure over loaded rows and take
//! `today` explicitly; [`AnalyticsService`] loads the rows and calls them.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sea_orm::{EntityTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::{
    db::DbPool,
    entities::{
        inventory_item::{self, BatchStatus},
        invoice::{self, InvoiceType},
        material,
    },
    errors::ServiceError,
};

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Placeholder split of the aggregate figures; not derived from invoice dates.
pub const WEEKLY_REVENUE_SHARES: [f64; 4] = [0.20, 0.25, 0.15, 0.30];
pub const WEEKLY_COST_SHARES: [f64; 4] = [0.15, 0.20, 0.30, 0.25];

pub const RECENT_INVOICE_COUNT: usize = 5;

/// Per-material line of the inventory summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialStockRow {
    pub material_id: i32,
    /// `MAT-001` style display code
    pub material_code: String,
    pub name: String,
    pub unit: String,
    pub total_quantity: i64,
    pub average_price: i64,
    pub total_value: i64,
    pub batch_count: u64,
    pub earliest_expiry: Option<DateTime<Utc>>,
    pub status: BatchStatus,
    pub required_stock: i64,
    pub low_stock: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub items: Vec<MaterialStockRow>,
    pub total_inventory_value: i64,
    pub material_count: u64,
    pub low_stock_count: u64,
    pub expired_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FinancialTotals {
    pub revenue: i64,
    pub cost: i64,
    pub profit: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyFigures {
    pub month: String,
    pub month_number: u32,
    pub revenue: i64,
    pub cost: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeeklyFigures {
    pub name: String,
    pub revenue: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CompositionEntry {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialReport {
    pub revenue: i64,
    pub cost: i64,
    pub profit: i64,
    pub inventory_value: i64,
    pub monthly_data: Vec<MonthlyFigures>,
    pub weekly_data: Vec<WeeklyFigures>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub total_materials: u64,
    pub total_value: i64,
    pub low_stock_count: u64,
    pub recent_invoices: Vec<invoice::Model>,
    pub total_materials_by_material: Vec<CompositionEntry>,
    pub financial_report: FinancialReport,
}

/// Σ quantity × price over every batch, including batches whose material was deleted.
pub fn inventory_valuation(batches: &[inventory_item::Model]) -> i64 {
    batches
        .iter()
        .fold(0i64, |acc, batch| acc.saturating_add(batch.value()))
}

pub fn low_stock_count(materials: &[material::Model]) -> u64 {
    materials.iter().filter(|m| m.is_low_stock()).count() as u64
}

pub fn earliest_expiry<'a, I>(batches: I) -> Option<DateTime<Utc>>
where
    I: IntoIterator<Item = &'a inventory_item::Model>,
{
    batches.into_iter().filter_map(|b| b.expiry).min()
}

/// round(Σ / n), 0 for no values
fn rounded_average(sum: i64, count: u64) -> i64 {
    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64).round() as i64
}

/// Rolls the batches belonging to `material` into one summary line.
pub fn material_rollup(
    material: &material::Model,
    batches: &[inventory_item::Model],
    today: NaiveDate,
) -> MaterialStockRow {
    let own: Vec<&inventory_item::Model> = batches
        .iter()
        .filter(|b| b.material_id == Some(material.id))
        .collect();

    let batch_count = own.len() as u64;
    let total_quantity = own.iter().map(|b| b.quantity).sum::<i64>();
    let price_sum = own.iter().map(|b| b.price).sum::<i64>();
    let average_price = rounded_average(price_sum, batch_count);
    let expiry = earliest_expiry(own.iter().copied());

    MaterialStockRow {
        material_id: material.id,
        material_code: format!("MAT-{:03}", material.id),
        name: material.name.clone(),
        unit: material.unit.clone(),
        total_quantity,
        average_price,
        total_value: total_quantity.saturating_mul(average_price),
        batch_count,
        earliest_expiry: expiry,
        status: BatchStatus::from_expiry(expiry, today),
        required_stock: material.min_stock,
        low_stock: total_quantity < material.min_stock,
    }
}

pub fn inventory_summary(
    materials: &[material::Model],
    batches: &[inventory_item::Model],
    today: NaiveDate,
) -> InventorySummary {
    let items: Vec<MaterialStockRow> = materials
        .iter()
        .map(|m| material_rollup(m, batches, today))
        .collect();

    InventorySummary {
        total_inventory_value: items
            .iter()
            .fold(0i64, |acc, row| acc.saturating_add(row.total_value)),
        material_count: items.len() as u64,
        low_stock_count: items.iter().filter(|row| row.low_stock).count() as u64,
        expired_count: items
            .iter()
            .filter(|row| row.status == BatchStatus::Expired)
            .count() as u64,
        items,
    }
}

/// Revenue is what went out (EXPORT), cost is what came in (IMPORT).
pub fn financial_totals(invoices: &[invoice::Model]) -> FinancialTotals {
    let (revenue, cost) = invoices.iter().fold((0i64, 0i64), |(rev, cost), inv| {
        match inv.kind {
            InvoiceType::Export => (rev.saturating_add(inv.total), cost),
            InvoiceType::Import => (rev, cost.saturating_add(inv.total)),
        }
    });
    FinancialTotals {
        revenue,
        cost,
        profit: revenue - cost,
    }
}

/// Twelve calendar-month buckets keyed by the invoice's UTC month. Years are merged.
pub fn monthly_rollup(invoices: &[invoice::Model]) -> Vec<MonthlyFigures> {
    let mut buckets: Vec<MonthlyFigures> = MONTH_LABELS
        .iter()
        .zip(1u32..)
        .map(|(label, number)| MonthlyFigures {
            month: (*label).to_string(),
            month_number: number,
            revenue: 0,
            cost: 0,
        })
        .collect();

    for inv in invoices {
        let bucket = &mut buckets[inv.date.month0() as usize];
        match inv.kind {
            InvoiceType::Export => bucket.revenue = bucket.revenue.saturating_add(inv.total),
            InvoiceType::Import => bucket.cost = bucket.cost.saturating_add(inv.total),
        }
    }

    buckets
}

pub fn weekly_split(revenue: i64, cost: i64) -> Vec<WeeklyFigures> {
    WEEKLY_REVENUE_SHARES
        .iter()
        .zip(WEEKLY_COST_SHARES.iter())
        .enumerate()
        .map(|(index, (rev_share, cost_share))| WeeklyFigures {
            name: format!("Week {}", index + 1),
            revenue: revenue as f64 * rev_share,
            cost: cost as f64 * cost_share,
        })
        .collect()
}

/// The latest invoices, date descending with id as tiebreak.
pub fn recent_invoices(invoices: &[invoice::Model], count: usize) -> Vec<invoice::Model> {
    let mut sorted = invoices.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    sorted.truncate(count);
    sorted
}

pub fn material_composition(materials: &[material::Model]) -> Vec<CompositionEntry> {
    materials
        .iter()
        .map(|m| CompositionEntry {
            name: m.name.clone(),
            value: m.current_stock,
        })
        .collect()
}

pub fn build_dashboard(
    materials: &[material::Model],
    batches: &[inventory_item::Model],
    invoices: &[invoice::Model],
) -> Dashboard {
    let total_value = inventory_valuation(batches);
    let totals = financial_totals(invoices);

    Dashboard {
        total_materials: materials.len() as u64,
        total_value,
        low_stock_count: low_stock_count(materials),
        recent_invoices: recent_invoices(invoices, RECENT_INVOICE_COUNT),
        total_materials_by_material: material_composition(materials),
        financial_report: FinancialReport {
            revenue: totals.revenue,
            cost: totals.cost,
            profit: totals.profit,
            inventory_value: total_value,
            monthly_data: monthly_rollup(invoices),
            weekly_data: weekly_split(totals.revenue, totals.cost),
        },
    }
}

/// Loads the rows behind the dashboard and inventory summary
#[derive(Clone)]
pub struct AnalyticsService {
    db_pool: Arc<DbPool>,
}

impl AnalyticsService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    async fn load_materials(&self) -> Result<Vec<material::Model>, ServiceError> {
        material::Entity::find()
            .order_by_asc(material::Column::Id)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn load_batches(&self) -> Result<Vec<inventory_item::Model>, ServiceError> {
        inventory_item::Entity::find()
            .order_by_asc(inventory_item::Column::Id)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Result<Dashboard, ServiceError> {
        let materials = self.load_materials().await?;
        let batches = self.load_batches().await?;
        let invoices = invoice::Entity::find()
            .order_by_desc(invoice::Column::Date)
            .order_by_desc(invoice::Column::Id)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let dashboard = build_dashboard(&materials, &batches, &invoices);
        info!(
            materials = dashboard.total_materials,
            invoices = invoices.len(),
            "dashboard computed"
        );
        Ok(dashboard)
    }

    #[instrument(skip(self))]
    pub async fn inventory_summary(
        &self,
        today: NaiveDate,
    ) -> Result<InventorySummary, ServiceError> {
        let materials = self.load_materials().await?;
        let batches = self.load_batches().await?;
        Ok(inventory_summary(&materials, &batches, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn material(id: i32, current: i64, min: i64) -> material::Model {
        material::Model {
            id,
            name: format!("Material {}", id),
            kind: None,
            unit: "ml".into(),
            min_stock: min,
            current_stock: current,
            description: None,
            image_url: None,
            created_at: ts(2024, 1, 1),
            updated_at: ts(2024, 1, 1),
        }
    }

    fn batch(
        id: i32,
        material_id: Option<i32>,
        qty: i64,
        price: i64,
        expiry: Option<DateTime<Utc>>,
    ) -> inventory_item::Model {
        inventory_item::Model {
            id,
            material_id,
            supplier_id: None,
            quantity: qty,
            price,
            date: ts(2024, 5, 1),
            expiry,
            status: BatchStatus::Fresh,
            batch_code: None,
            note: None,
            created_at: ts(2024, 5, 1),
        }
    }

    fn invoice(id: i32, kind: InvoiceType, date: DateTime<Utc>, total: i64) -> invoice::Model {
        invoice::Model {
            id,
            kind,
            date,
            partner_name: None,
            total,
            status: invoice::InvoiceStatus::Completed,
            note: None,
            invoice_number: None,
            created_at: date,
        }
    }

    #[test]
    fn valuation_counts_every_batch() {
        let batches = vec![
            batch(1, Some(1), 2, 100, None),
            batch(2, Some(1), 3, 50, None),
            batch(3, None, 1, 7, None),
        ];
        assert_eq!(inventory_valuation(&batches), 357);
    }

    #[test]
    fn low_stock_is_strict() {
        let materials = vec![material(1, 5, 10), material(2, 10, 10), material(3, 0, 0)];
        assert_eq!(low_stock_count(&materials), 1);
    }

    #[test]
    fn rollup_uses_earliest_expiry_and_rounded_average() {
        let at_midnight = |days| {
            Utc.from_utc_datetime(&(today() + Duration::days(days)).and_hms_opt(0, 0, 0).unwrap())
        };
        let soon = at_midnight(10);
        let later = at_midnight(90);
        let batches = vec![
            batch(1, Some(1), 4, 10, Some(later)),
            batch(2, Some(1), 6, 15, Some(soon)),
            batch(3, Some(2), 100, 1, None),
        ];

        let row = material_rollup(&material(1, 10, 20), &batches, today());
        assert_eq!(row.material_code, "MAT-001");
        assert_eq!(row.total_quantity, 10);
        assert_eq!(row.batch_count, 2);
        // (10 + 15) / 2 = 12.5 rounds away from zero
        assert_eq!(row.average_price, 13);
        assert_eq!(row.total_value, 130);
        assert_eq!(row.earliest_expiry, Some(soon));
        assert_eq!(row.status, BatchStatus::Warning);
        assert!(row.low_stock);
    }

    #[test]
    fn rollup_without_batches_is_zeroed() {
        let row = material_rollup(&material(7, 0, 0), &[], today());
        assert_eq!(row.average_price, 0);
        assert_eq!(row.total_value, 0);
        assert_eq!(row.status, BatchStatus::Fresh);
        assert!(!row.low_stock);
        assert_eq!(row.material_code, "MAT-007");
    }

    #[test]
    fn summary_totals() {
        let expired = Some(ts(2024, 5, 1));
        let materials = vec![material(1, 0, 5), material(2, 0, 0)];
        let batches = vec![batch(1, Some(1), 2, 10, expired), batch(2, Some(2), 3, 10, None)];

        let summary = inventory_summary(&materials, &batches, today());
        assert_eq!(summary.material_count, 2);
        assert_eq!(summary.total_inventory_value, 50);
        assert_eq!(summary.low_stock_count, 1);
        assert_eq!(summary.expired_count, 1);
    }

    #[test]
    fn monthly_rollup_merges_years() {
        let invoices = vec![
            invoice(1, InvoiceType::Export, ts(2023, 3, 1), 1000),
            invoice(2, InvoiceType::Import, ts(2024, 3, 15), 2000),
        ];
        let months = monthly_rollup(&invoices);
        assert_eq!(months.len(), 12);
        assert_eq!(months[2].month, "Mar");
        assert_eq!(months[2].month_number, 3);
        assert_eq!((months[2].revenue, months[2].cost), (1000, 2000));
        assert!(months
            .iter()
            .filter(|m| m.month_number != 3)
            .all(|m| m.revenue == 0 && m.cost == 0));
    }

    #[test]
    fn weekly_split_applies_fixed_shares() {
        let weeks = weekly_split(1000, 2000);
        let names: Vec<&str> = weeks.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, ["Week 1", "Week 2", "Week 3", "Week 4"]);
        assert_eq!(weeks[0].revenue, 200.0);
        assert_eq!(weeks[2].cost, 600.0);
        assert_eq!(weeks[3].revenue, 300.0);
    }

    #[test]
    fn dashboard_payload() {
        let materials = vec![material(1, 5, 10), material(2, 40, 10)];
        let batches = vec![batch(1, Some(1), 5, 100, None)];
        let invoices: Vec<_> = (1..=7)
            .map(|i| {
                let kind = if i % 2 == 0 {
                    InvoiceType::Export
                } else {
                    InvoiceType::Import
                };
                invoice(i, kind, ts(2024, 1, i as u32), 100)
            })
            .collect();

        let dashboard = build_dashboard(&materials, &batches, &invoices);
        assert_eq!(dashboard.total_materials, 2);
        assert_eq!(dashboard.total_value, 500);
        assert_eq!(dashboard.low_stock_count, 1);
        let recent: Vec<i32> = dashboard.recent_invoices.iter().map(|i| i.id).collect();
        assert_eq!(recent, vec![7, 6, 5, 4, 3]);
        assert_eq!(dashboard.financial_report.revenue, 300);
        assert_eq!(dashboard.financial_report.cost, 400);
        assert_eq!(dashboard.financial_report.profit, -100);
        assert_eq!(dashboard.financial_report.inventory_value, 500);
        assert_eq!(
            dashboard.total_materials_by_material[1],
            CompositionEntry { name: "Material 2".into(), value: 40 }
        );

        let json = serde_json::to_value(&dashboard).unwrap();
        assert!(json["financialReport"]["monthlyData"].is_array());
        assert!(json["totalMaterialsByMaterial"].is_array());
    }
}
