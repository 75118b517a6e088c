use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::ingredients::{CreateIngredientRequest, IngredientList, UpdateIngredientRequest},
    error::AppResult,
    middleware::auth::AuthEmployee,
    models::Ingredient,
    response::ApiResponse,
    routes::params::IngredientQuery,
    services::ingredient_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_ingredients))
        .route("/", post(create_ingredient))
        .route("/low-stock", get(list_low_stock))
        .route("/{id}", get(get_ingredient))
        .route("/{id}", patch(update_ingredient))
}

#[utoipa::path(
    get,
    path = "/api/ingredients",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Search by name"),
    ),
    responses(
        (status = 200, description = "List ingredients", body = ApiResponse<IngredientList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn list_ingredients(
    State(state): State<AppState>,
    _user: AuthEmployee,
    Query(query): Query<IngredientQuery>,
) -> AppResult<Json<ApiResponse<IngredientList>>> {
    let resp = ingredient_service::list_ingredients(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/ingredients/low-stock",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "Ingredients at or below their minimum stock level", body = ApiResponse<IngredientList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn list_low_stock(
    State(state): State<AppState>,
    _user: AuthEmployee,
    Query(query): Query<IngredientQuery>,
) -> AppResult<Json<ApiResponse<IngredientList>>> {
    let resp = ingredient_service::list_low_stock(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/ingredients/{id}",
    params(("id" = Uuid, Path, description = "Ingredient ID")),
    responses(
        (status = 200, description = "Get ingredient", body = ApiResponse<Ingredient>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn get_ingredient(
    State(state): State<AppState>,
    _user: AuthEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Ingredient>>> {
    let resp = ingredient_service::get_ingredient(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/ingredients",
    request_body = CreateIngredientRequest,
    responses(
        (status = 201, description = "Create ingredient (manager)", body = ApiResponse<Ingredient>),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Name already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn create_ingredient(
    State(state): State<AppState>,
    user: AuthEmployee,
    Json(payload): Json<CreateIngredientRequest>,
) -> AppResult<Json<ApiResponse<Ingredient>>> {
    let resp = ingredient_service::create_ingredient(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/ingredients/{id}",
    params(("id" = Uuid, Path, description = "Ingredient ID")),
    request_body = UpdateIngredientRequest,
    responses(
        (status = 200, description = "Update ingredient metadata (manager); stock moves only through the ledger", body = ApiResponse<Ingredient>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn update_ingredient(
    State(state): State<AppState>,
    user: AuthEmployee,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateIngredientRequest>,
) -> AppResult<Json<ApiResponse<Ingredient>>> {
    let resp = ingredient_service::update_ingredient(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
