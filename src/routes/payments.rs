use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::payments::{CapturePaymentRequest, PaymentWithOrder},
    error::AppResult,
    middleware::auth::AuthEmployee,
    models::Payment,
    response::ApiResponse,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", get(get_payment))
}

pub fn order_payment_router() -> Router<AppState> {
    Router::new()
        .route("/{id}/payment", post(capture_payment))
        .route("/{id}/payment", get(get_order_payment))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/payment",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = CapturePaymentRequest,
    responses(
        (status = 200, description = "Capture payment: records the payment, marks the order paid and deducts ingredient stock", body = ApiResponse<PaymentWithOrder>),
        (status = 400, description = "Amount mismatch or insufficient tender"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Already paid, invalid transition or insufficient stock"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn capture_payment(
    State(state): State<AppState>,
    user: AuthEmployee,
    Path(id): Path<Uuid>,
    Json(payload): Json<CapturePaymentRequest>,
) -> AppResult<Json<ApiResponse<PaymentWithOrder>>> {
    let resp = payment_service::capture(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}/payment",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Payment settling the order", body = ApiResponse<Payment>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn get_order_payment(
    State(state): State<AppState>,
    _user: AuthEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::get_order_payment(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/payments/{id}",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Get payment", body = ApiResponse<Payment>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn get_payment(
    State(state): State<AppState>,
    _user: AuthEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::get_payment(&state, id).await?;
    Ok(Json(resp))
}
