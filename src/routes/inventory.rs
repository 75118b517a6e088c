use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::inventory::{StockMovementRequest, StockMovementResponse, TransactionList},
    error::AppResult,
    middleware::auth::AuthEmployee,
    response::ApiResponse,
    routes::params::LedgerQuery,
    services::inventory_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/transactions", post(record_movement))
        .route("/transactions", get(list_transactions))
}

#[utoipa::path(
    post,
    path = "/api/inventory/transactions",
    request_body = StockMovementRequest,
    responses(
        (status = 201, description = "Record a manual stock movement (manager)", body = ApiResponse<StockMovementResponse>),
        (status = 400, description = "Invalid movement"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Insufficient stock"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn record_movement(
    State(state): State<AppState>,
    user: AuthEmployee,
    Json(payload): Json<StockMovementRequest>,
) -> AppResult<Json<ApiResponse<StockMovementResponse>>> {
    let resp = inventory_service::record_movement(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/inventory/transactions",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("ingredient_id" = Option<Uuid>, Query, description = "Filter by ingredient"),
        ("transaction_type" = Option<String>, Query, description = "in, out, auto_deduct"),
    ),
    responses(
        (status = 200, description = "Inventory ledger", body = ApiResponse<TransactionList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    user: AuthEmployee,
    Query(query): Query<LedgerQuery>,
) -> AppResult<Json<ApiResponse<TransactionList>>> {
    let resp = inventory_service::list_transactions(&state, &user, query).await?;
    Ok(Json(resp))
}
