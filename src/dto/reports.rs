use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RevenueGroupBy {
    Day,
    Week,
    Month,
}

impl RevenueGroupBy {
    /// `date_trunc` field name. Values are fixed by the enum, never
    /// interpolated from user input.
    pub fn as_sql(&self) -> &'static str {
        match self {
            RevenueGroupBy::Day => "day",
            RevenueGroupBy::Week => "week",
            RevenueGroupBy::Month => "month",
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RevenueQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub group_by: Option<RevenueGroupBy>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RevenuePoint {
    pub bucket: DateTime<Utc>,
    pub order_count: i64,
    pub total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RevenueSeries {
    pub points: Vec<RevenuePoint>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SalesQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductSales {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i64,
    pub subtotal: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalesReport {
    pub items: Vec<ProductSales>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LowStockIngredient {
    pub ingredient_id: Uuid,
    pub name: String,
    pub unit: String,
    pub current_stock: i64,
    pub min_stock_level: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryReport {
    pub low_stock: Vec<LowStockIngredient>,
    /// Σ current_stock × unit_cost over all ingredients.
    pub total_valuation: i64,
}
