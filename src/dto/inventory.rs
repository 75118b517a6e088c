use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Ingredient, InventoryTransaction, TransactionType};

#[derive(Debug, Deserialize, ToSchema)]
pub struct StockMovementRequest {
    pub ingredient_id: Uuid,
    /// Manual movements are `in` or `out`; `auto_deduct` rows are written
    /// only by payment capture.
    pub transaction_type: TransactionType,
    pub quantity: i64,
    pub note: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockMovementResponse {
    pub transaction: InventoryTransaction,
    pub ingredient: Ingredient,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionList {
    pub items: Vec<InventoryTransaction>,
}
