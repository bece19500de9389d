use chrono::Utc;
use metrics::counter;
use sea_orm::{sea_query::Expr, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use tracing::{info, warn};

use crate::{entities::material, errors::ServiceError};

/// Moves a material's on-hand counter by `delta` in a single UPDATE, so concurrent writers
/// never read-modify-write the same row. Runs on whatever connection it is given, normally
/// the caller's open transaction.
///
/// Returns `false` when the material row does not exist; that case is logged and skipped.
pub async fn apply_stock_delta<C>(
    conn: &C,
    material_id: i32,
    delta: i64,
) -> Result<bool, ServiceError>
where
    C: ConnectionTrait,
{
    let result = material::Entity::update_many()
        .col_expr(
            material::Column::CurrentStock,
            Expr::col(material::Column::CurrentStock).add(delta),
        )
        .col_expr(material::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(material::Column::Id.eq(material_id))
        .exec(conn)
        .await
        .map_err(ServiceError::DatabaseError)?;

    if result.rows_affected == 0 {
        warn!(material_id, delta, "stock update skipped, material not found");
        counter!("stockroom.stock.skipped", 1);
        return Ok(false);
    }

    info!(material_id, delta, "stock adjusted");
    Ok(true)
}

/// Checks that every id in `ids` names an existing material.
pub async fn missing_materials<C>(conn: &C, ids: &[i32]) -> Result<Vec<i32>, ServiceError>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut wanted: Vec<i32> = ids.to_vec();
    wanted.sort_unstable();
    wanted.dedup();

    let found: Vec<i32> = material::Entity::find()
        .filter(material::Column::Id.is_in(wanted.clone()))
        .all(conn)
        .await
        .map_err(ServiceError::DatabaseError)?
        .into_iter()
        .map(|m| m.id)
        .collect();

    Ok(wanted.into_iter().filter(|id| !found.contains(id)).collect())
}
