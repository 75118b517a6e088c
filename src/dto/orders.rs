use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, OrderItem, OrderType};

#[derive(Debug, Deserialize, ToSchema)]
pub struct OpenOrderRequest {
    pub order_type: OrderType,
    /// Required for dine-in orders; the table is marked occupied.
    pub table_id: Option<Uuid>,
    pub note: Option<String>,
    pub discount_amount: Option<i64>,
    pub delivery_fee: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdvanceStatusRequest {
    /// Target status; must be the direct successor of the current one.
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CancelOrderRequest {
    pub reason: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
