use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Area, DiningTable, Reservation, TableStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAreaRequest {
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AreaList {
    pub items: Vec<Area>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTableRequest {
    pub area_id: Uuid,
    pub name: String,
    pub seats: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTableRequest {
    pub name: Option<String>,
    pub seats: Option<i32>,
    pub status: Option<TableStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TableList {
    pub items: Vec<DiningTable>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReservationRequest {
    pub table_id: Uuid,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub party_size: i32,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReservationList {
    pub items: Vec<Reservation>,
}
