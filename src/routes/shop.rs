use axum::{
    Json, Router,
    extract::State,
    routing::{get, patch},
};

use crate::{
    dto::shop::UpdateShopRequest,
    error::AppResult,
    middleware::auth::AuthEmployee,
    models::Shop,
    response::ApiResponse,
    services::shop_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_shop))
        .route("/", patch(update_shop))
}

#[utoipa::path(
    get,
    path = "/api/shop",
    responses(
        (status = 200, description = "Shop settings", body = ApiResponse<Shop>),
    ),
    security(("bearer_auth" = [])),
    tag = "Shop"
)]
pub async fn get_shop(
    State(state): State<AppState>,
    _user: AuthEmployee,
) -> AppResult<Json<ApiResponse<Shop>>> {
    let resp = shop_service::get_shop(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/shop",
    request_body = UpdateShopRequest,
    responses(
        (status = 200, description = "Update shop settings (admin only)", body = ApiResponse<Shop>),
        (status = 400, description = "Invalid rates"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Shop"
)]
pub async fn update_shop(
    State(state): State<AppState>,
    user: AuthEmployee,
    Json(payload): Json<UpdateShopRequest>,
) -> AppResult<Json<ApiResponse<Shop>>> {
    let resp = shop_service::update_shop(&state, &user, payload).await?;
    Ok(Json(resp))
}
