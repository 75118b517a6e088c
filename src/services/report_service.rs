use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    dto::reports::{
        InventoryReport, LowStockIngredient, ProductSales, RevenuePoint, RevenueQuery,
        RevenueSeries, SalesQuery, SalesReport,
    },
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(FromRow)]
struct RevenueRow {
    bucket: DateTime<Utc>,
    order_count: i64,
    total: i64,
}

#[derive(FromRow)]
struct SalesRow {
    product_id: Uuid,
    name: String,
    quantity: i64,
    subtotal: i64,
}

#[derive(FromRow)]
struct LowStockRow {
    ingredient_id: Uuid,
    name: String,
    unit: String,
    current_stock: i64,
    min_stock_level: i64,
}

/// Paid revenue bucketed by day, week or month. An empty range is a valid
/// answer: the series is just empty.
pub async fn revenue(
    state: &AppState,
    query: RevenueQuery,
) -> AppResult<ApiResponse<RevenueSeries>> {
    validate_range(query.start, query.end)?;
    let group_by = query
        .group_by
        .unwrap_or(crate::dto::reports::RevenueGroupBy::Day);

    // group_by comes from a closed enum, never from raw input.
    let sql = format!(
        r#"
        SELECT date_trunc('{}', paid_at) AS bucket,
               COUNT(*) AS order_count,
               COALESCE(SUM(total_amount), 0)::BIGINT AS total
        FROM orders
        WHERE status = 'paid' AND paid_at >= $1 AND paid_at <= $2
        GROUP BY bucket
        ORDER BY bucket
        "#,
        group_by.as_sql()
    );

    let rows = sqlx::query_as::<_, RevenueRow>(&sql)
        .bind(query.start)
        .bind(query.end)
        .fetch_all(&state.pool)
        .await?;

    let points = rows
        .into_iter()
        .map(|row| RevenuePoint {
            bucket: row.bucket,
            order_count: row.order_count,
            total: row.total,
        })
        .collect();

    Ok(ApiResponse::success(
        "Revenue",
        RevenueSeries { points },
        Some(Meta::empty()),
    ))
}

/// Per-product sales over paid orders in the range, best sellers first.
pub async fn sales(state: &AppState, query: SalesQuery) -> AppResult<ApiResponse<SalesReport>> {
    validate_range(query.start, query.end)?;

    let rows = sqlx::query_as::<_, SalesRow>(
        r#"
        SELECT oi.product_id, oi.name,
               SUM(oi.quantity)::BIGINT AS quantity,
               SUM(oi.subtotal)::BIGINT AS subtotal
        FROM order_items oi
        JOIN orders o ON o.id = oi.order_id
        WHERE o.status = 'paid' AND o.paid_at >= $1 AND o.paid_at <= $2
        GROUP BY oi.product_id, oi.name
        ORDER BY subtotal DESC
        "#,
    )
    .bind(query.start)
    .bind(query.end)
    .fetch_all(&state.pool)
    .await?;

    let items = rows
        .into_iter()
        .map(|row| ProductSales {
            product_id: row.product_id,
            name: row.name,
            quantity: row.quantity,
            subtotal: row.subtotal,
        })
        .collect();

    Ok(ApiResponse::success(
        "Sales",
        SalesReport { items },
        Some(Meta::empty()),
    ))
}

/// Ingredients at or below their minimum level plus total stock valuation.
pub async fn inventory_report(state: &AppState) -> AppResult<ApiResponse<InventoryReport>> {
    let rows = sqlx::query_as::<_, LowStockRow>(
        r#"
        SELECT id AS ingredient_id, name, unit, current_stock, min_stock_level
        FROM ingredients
        WHERE current_stock <= min_stock_level
        ORDER BY current_stock ASC, name ASC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let valuation: (i64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(current_stock * unit_cost), 0)::BIGINT FROM ingredients",
    )
    .fetch_one(&state.pool)
    .await?;

    let low_stock = rows
        .into_iter()
        .map(|row| LowStockIngredient {
            ingredient_id: row.ingredient_id,
            name: row.name,
            unit: row.unit,
            current_stock: row.current_stock,
            min_stock_level: row.min_stock_level,
        })
        .collect();

    Ok(ApiResponse::success(
        "Inventory",
        InventoryReport {
            low_stock,
            total_valuation: valuation.0,
        },
        Some(Meta::empty()),
    ))
}

fn validate_range(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<()> {
    if end < start {
        return Err(AppError::Validation("end must not be before start".into()));
    }
    Ok(())
}
