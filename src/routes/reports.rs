use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::reports::{InventoryReport, RevenueQuery, RevenueSeries, SalesQuery, SalesReport},
    error::AppResult,
    middleware::auth::AuthEmployee,
    response::ApiResponse,
    services::report_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/revenue", get(revenue))
        .route("/sales", get(sales))
        .route("/inventory", get(inventory))
}

#[utoipa::path(
    get,
    path = "/api/reports/revenue",
    params(
        ("start" = String, Query, description = "Range start (RFC 3339)"),
        ("end" = String, Query, description = "Range end (RFC 3339)"),
        ("group_by" = Option<String>, Query, description = "day, week, month; default day"),
    ),
    responses(
        (status = 200, description = "Paid revenue per bucket; empty range gives an empty series", body = ApiResponse<RevenueSeries>),
        (status = 400, description = "Invalid range"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn revenue(
    State(state): State<AppState>,
    _user: AuthEmployee,
    Query(query): Query<RevenueQuery>,
) -> AppResult<Json<ApiResponse<RevenueSeries>>> {
    let resp = report_service::revenue(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reports/sales",
    params(
        ("start" = String, Query, description = "Range start (RFC 3339)"),
        ("end" = String, Query, description = "Range end (RFC 3339)"),
    ),
    responses(
        (status = 200, description = "Per-product sales over paid orders", body = ApiResponse<SalesReport>),
        (status = 400, description = "Invalid range"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn sales(
    State(state): State<AppState>,
    _user: AuthEmployee,
    Query(query): Query<SalesQuery>,
) -> AppResult<Json<ApiResponse<SalesReport>>> {
    let resp = report_service::sales(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reports/inventory",
    responses(
        (status = 200, description = "Low-stock ingredients and total stock valuation", body = ApiResponse<InventoryReport>),
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn inventory(
    State(state): State<AppState>,
    _user: AuthEmployee,
) -> AppResult<Json<ApiResponse<InventoryReport>>> {
    let resp = report_service::inventory_report(&state).await?;
    Ok(Json(resp))
}
