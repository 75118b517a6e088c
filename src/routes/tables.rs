use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::tables::{
        AreaList, CreateAreaRequest, CreateReservationRequest, CreateTableRequest,
        ReservationList, TableList, UpdateTableRequest,
    },
    error::AppResult,
    middleware::auth::AuthEmployee,
    models::{Area, DiningTable, Reservation},
    response::ApiResponse,
    routes::params::{ReservationQuery, TableQuery},
    services::table_service,
    state::AppState,
};

pub fn areas_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_areas))
        .route("/", post(create_area))
}

pub fn tables_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tables))
        .route("/", post(create_table))
        .route("/{id}", patch(update_table))
}

pub fn reservations_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reservations))
        .route("/", post(create_reservation))
        .route("/{id}/seat", patch(seat_reservation))
        .route("/{id}/cancel", patch(cancel_reservation))
}

#[utoipa::path(
    get,
    path = "/api/areas",
    responses(
        (status = 200, description = "List areas", body = ApiResponse<AreaList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Floor"
)]
pub async fn list_areas(
    State(state): State<AppState>,
    _user: AuthEmployee,
) -> AppResult<Json<ApiResponse<AreaList>>> {
    let resp = table_service::list_areas(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/areas",
    request_body = CreateAreaRequest,
    responses(
        (status = 201, description = "Create area (manager)", body = ApiResponse<Area>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Floor"
)]
pub async fn create_area(
    State(state): State<AppState>,
    user: AuthEmployee,
    Json(payload): Json<CreateAreaRequest>,
) -> AppResult<Json<ApiResponse<Area>>> {
    let resp = table_service::create_area(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/tables",
    params(("area_id" = Option<Uuid>, Query, description = "Filter by area")),
    responses(
        (status = 200, description = "List tables", body = ApiResponse<TableList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Floor"
)]
pub async fn list_tables(
    State(state): State<AppState>,
    _user: AuthEmployee,
    Query(query): Query<TableQuery>,
) -> AppResult<Json<ApiResponse<TableList>>> {
    let resp = table_service::list_tables(&state, query.area_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/tables",
    request_body = CreateTableRequest,
    responses(
        (status = 201, description = "Create table (manager)", body = ApiResponse<DiningTable>),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Table name already exists in area"),
    ),
    security(("bearer_auth" = [])),
    tag = "Floor"
)]
pub async fn create_table(
    State(state): State<AppState>,
    user: AuthEmployee,
    Json(payload): Json<CreateTableRequest>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let resp = table_service::create_table(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/tables/{id}",
    params(("id" = Uuid, Path, description = "Table ID")),
    request_body = UpdateTableRequest,
    responses(
        (status = 200, description = "Update table (manager)", body = ApiResponse<DiningTable>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Floor"
)]
pub async fn update_table(
    State(state): State<AppState>,
    user: AuthEmployee,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTableRequest>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let resp = table_service::update_table(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reservations",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("table_id" = Option<Uuid>, Query, description = "Filter by table"),
        ("status" = Option<String>, Query, description = "booked, seated, cancelled"),
    ),
    responses(
        (status = 200, description = "List reservations", body = ApiResponse<ReservationList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Floor"
)]
pub async fn list_reservations(
    State(state): State<AppState>,
    _user: AuthEmployee,
    Query(query): Query<ReservationQuery>,
) -> AppResult<Json<ApiResponse<ReservationList>>> {
    let resp = table_service::list_reservations(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/reservations",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Create reservation", body = ApiResponse<Reservation>),
        (status = 400, description = "Invalid reservation"),
        (status = 409, description = "Table already reserved for this time"),
    ),
    security(("bearer_auth" = [])),
    tag = "Floor"
)]
pub async fn create_reservation(
    State(state): State<AppState>,
    user: AuthEmployee,
    Json(payload): Json<CreateReservationRequest>,
) -> AppResult<Json<ApiResponse<Reservation>>> {
    let resp = table_service::create_reservation(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/reservations/{id}/seat",
    params(("id" = Uuid, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Seat the party and occupy the table", body = ApiResponse<Reservation>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Reservation is not active"),
    ),
    security(("bearer_auth" = [])),
    tag = "Floor"
)]
pub async fn seat_reservation(
    State(state): State<AppState>,
    user: AuthEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Reservation>>> {
    let resp = table_service::seat_reservation(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/reservations/{id}/cancel",
    params(("id" = Uuid, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Cancel the reservation", body = ApiResponse<Reservation>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Reservation is not active"),
    ),
    security(("bearer_auth" = [])),
    tag = "Floor"
)]
pub async fn cancel_reservation(
    State(state): State<AppState>,
    user: AuthEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Reservation>>> {
    let resp = table_service::cancel_reservation(&state, &user, id).await?;
    Ok(Json(resp))
}
