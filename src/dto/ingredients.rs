use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Ingredient;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateIngredientRequest {
    pub name: String,
    /// Display unit of the stock quantity, e.g. `g`, `ml`, `pcs`.
    pub unit: String,
    pub min_stock_level: Option<i64>,
    pub unit_cost: Option<i64>,
    /// Optional opening balance, recorded as an `in` ledger transaction.
    pub opening_stock: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateIngredientRequest {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub min_stock_level: Option<i64>,
    pub unit_cost: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IngredientList {
    pub items: Vec<Ingredient>,
}
