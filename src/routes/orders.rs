use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{
        AddItemRequest, AdvanceStatusRequest, CancelOrderRequest, OpenOrderRequest, OrderList,
        OrderWithItems,
    },
    error::AppResult,
    middleware::auth::AuthEmployee,
    models::Order,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(open_order))
        .route("/", get(list_orders))
        .route("/{id}", get(get_order))
        .route("/{id}/items", post(add_item))
        .route("/{id}/items/{item_id}", delete(remove_item))
        .route("/{id}/status", patch(advance_status))
        .route("/{id}/cancel", patch(cancel_order))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = OpenOrderRequest,
    responses(
        (status = 201, description = "Open an order", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Invalid order"),
        (status = 409, description = "Table is already occupied"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn open_order(
    State(state): State<AppState>,
    user: AuthEmployee,
    Json(payload): Json<OpenOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::open_order(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status"),
    ),
    responses(
        (status = 200, description = "List orders", body = ApiResponse<OrderList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    _user: AuthEmployee,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Get order with items", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    _user: AuthEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_order(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/items",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = AddItemRequest,
    responses(
        (status = 200, description = "Add a line item; totals are recomputed", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Invalid item"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order is terminal"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn add_item(
    State(state): State<AppState>,
    user: AuthEmployee,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddItemRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::add_item(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}/items/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Order ID"),
        ("item_id" = Uuid, Path, description = "Order item ID"),
    ),
    responses(
        (status = 200, description = "Remove a line item; totals are recomputed", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Order is terminal"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    user: AuthEmployee,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::remove_item(&state, &user, id, item_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = AdvanceStatusRequest,
    responses(
        (status = 200, description = "Advance the order one lifecycle step", body = ApiResponse<Order>),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Invalid transition"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn advance_status(
    State(state): State<AppState>,
    user: AuthEmployee,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdvanceStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::advance_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = CancelOrderRequest,
    responses(
        (status = 200, description = "Cancel a non-terminal order", body = ApiResponse<Order>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Order is terminal"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    user: AuthEmployee,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelOrderRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::cancel_order(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
