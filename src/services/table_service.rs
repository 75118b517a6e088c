use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::tables::{
        AreaList, CreateAreaRequest, CreateReservationRequest, CreateTableRequest,
        ReservationList, TableList, UpdateTableRequest,
    },
    entity::{
        areas::{ActiveModel as AreaActive, Column as AreaCol, Entity as Areas, Model as AreaModel},
        dining_tables::{
            ActiveModel as TableActive, Column as TableCol, Entity as DiningTables,
            Model as TableModel,
        },
        reservations::{
            ActiveModel as ReservationActive, Column as ReservationCol, Entity as Reservations,
            Model as ReservationModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthEmployee, ensure_manager},
    models::{Area, DiningTable, Reservation, ReservationStatus, TableStatus},
    response::{ApiResponse, Meta},
    routes::params::ReservationQuery,
    state::AppState,
};

pub async fn list_areas(state: &AppState) -> AppResult<ApiResponse<AreaList>> {
    let items = Areas::find()
        .order_by_asc(AreaCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(area_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Areas",
        AreaList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_area(
    state: &AppState,
    user: &AuthEmployee,
    payload: CreateAreaRequest,
) -> AppResult<ApiResponse<Area>> {
    ensure_manager(user)?;
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".into()));
    }

    let exists = Areas::find()
        .filter(AreaCol::Name.eq(payload.name.clone()))
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::Conflict("area name already exists".into()));
    }

    let area = AreaActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Area created",
        area_from_entity(area),
        Some(Meta::empty()),
    ))
}

pub async fn list_tables(
    state: &AppState,
    area_id: Option<Uuid>,
) -> AppResult<ApiResponse<TableList>> {
    let mut condition = Condition::all();
    if let Some(area_id) = area_id {
        condition = condition.add(TableCol::AreaId.eq(area_id));
    }

    let items = DiningTables::find()
        .filter(condition)
        .order_by_asc(TableCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(table_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Tables",
        TableList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_table(
    state: &AppState,
    user: &AuthEmployee,
    payload: CreateTableRequest,
) -> AppResult<ApiResponse<DiningTable>> {
    ensure_manager(user)?;
    if payload.seats <= 0 {
        return Err(AppError::Validation("seats must be greater than 0".into()));
    }

    let area = Areas::find_by_id(payload.area_id).one(&state.orm).await?;
    if area.is_none() {
        return Err(AppError::Validation("area not found".into()));
    }

    let exists = DiningTables::find()
        .filter(
            Condition::all()
                .add(TableCol::AreaId.eq(payload.area_id))
                .add(TableCol::Name.eq(payload.name.clone())),
        )
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::Conflict(
            "table name already exists in this area".into(),
        ));
    }

    let table = TableActive {
        id: Set(Uuid::new_v4()),
        area_id: Set(payload.area_id),
        name: Set(payload.name),
        seats: Set(payload.seats),
        status: Set(TableStatus::Available.as_str().to_string()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.employee_id),
        "table_create",
        Some("dining_tables"),
        Some(serde_json::json!({ "table_id": table.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Table created",
        table_from_entity(table)?,
        Some(Meta::empty()),
    ))
}

pub async fn update_table(
    state: &AppState,
    user: &AuthEmployee,
    id: Uuid,
    payload: UpdateTableRequest,
) -> AppResult<ApiResponse<DiningTable>> {
    ensure_manager(user)?;
    if payload.seats.is_some_and(|s| s <= 0) {
        return Err(AppError::Validation("seats must be greater than 0".into()));
    }

    let existing = DiningTables::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(t) => t,
        None => return Err(AppError::NotFound),
    };

    let mut active: TableActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(seats) = payload.seats {
        active.seats = Set(seats);
    }
    if let Some(status) = payload.status {
        active.status = Set(status.as_str().to_string());
    }
    let table = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Table updated",
        table_from_entity(table)?,
        Some(Meta::empty()),
    ))
}

/// Book a table for a time window. Overlapping booked reservations for the
/// same table are rejected, which is what keeps double-booking out of the
/// floor plan.
pub async fn create_reservation(
    state: &AppState,
    user: &AuthEmployee,
    payload: CreateReservationRequest,
) -> AppResult<ApiResponse<Reservation>> {
    if payload.ends_at <= payload.starts_at {
        return Err(AppError::Validation(
            "ends_at must be after starts_at".into(),
        ));
    }
    if payload.party_size <= 0 {
        return Err(AppError::Validation(
            "party_size must be greater than 0".into(),
        ));
    }
    if payload.customer_name.trim().is_empty() {
        return Err(AppError::Validation("customer_name must not be empty".into()));
    }

    let txn = state.orm.begin().await?;

    let table = DiningTables::find_by_id(payload.table_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::Validation("table not found".into()))?;

    let overlapping = Reservations::find()
        .filter(
            Condition::all()
                .add(ReservationCol::TableId.eq(payload.table_id))
                .add(ReservationCol::Status.eq(ReservationStatus::Booked.as_str()))
                .add(ReservationCol::StartsAt.lt(payload.ends_at))
                .add(ReservationCol::EndsAt.gt(payload.starts_at)),
        )
        .count(&txn)
        .await?;
    if overlapping > 0 {
        return Err(AppError::Conflict(
            "table is already reserved for this time".into(),
        ));
    }

    let reservation = ReservationActive {
        id: Set(Uuid::new_v4()),
        table_id: Set(payload.table_id),
        customer_name: Set(payload.customer_name),
        customer_phone: Set(payload.customer_phone),
        party_size: Set(payload.party_size),
        starts_at: Set(payload.starts_at.into()),
        ends_at: Set(payload.ends_at.into()),
        status: Set(ReservationStatus::Booked.as_str().to_string()),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    if table.status == TableStatus::Available.as_str() {
        let mut active: TableActive = table.into();
        active.status = Set(TableStatus::Reserved.as_str().to_string());
        active.update(&txn).await?;
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.employee_id),
        "reservation_create",
        Some("reservations"),
        Some(serde_json::json!({ "reservation_id": reservation.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Reservation created",
        reservation_from_entity(reservation)?,
        Some(Meta::empty()),
    ))
}

pub async fn seat_reservation(
    state: &AppState,
    user: &AuthEmployee,
    id: Uuid,
) -> AppResult<ApiResponse<Reservation>> {
    let txn = state.orm.begin().await?;

    let reservation = Reservations::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if reservation.status != ReservationStatus::Booked.as_str() {
        return Err(AppError::Conflict("reservation is not active".into()));
    }

    let table_id = reservation.table_id;
    let mut active: ReservationActive = reservation.into();
    active.status = Set(ReservationStatus::Seated.as_str().to_string());
    let reservation = active.update(&txn).await?;

    if let Some(table) = DiningTables::find_by_id(table_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
    {
        let mut table_active: TableActive = table.into();
        table_active.status = Set(TableStatus::Occupied.as_str().to_string());
        table_active.update(&txn).await?;
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.employee_id),
        "reservation_seat",
        Some("reservations"),
        Some(serde_json::json!({ "reservation_id": reservation.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Reservation seated",
        reservation_from_entity(reservation)?,
        Some(Meta::empty()),
    ))
}

pub async fn cancel_reservation(
    state: &AppState,
    user: &AuthEmployee,
    id: Uuid,
) -> AppResult<ApiResponse<Reservation>> {
    let txn = state.orm.begin().await?;

    let reservation = Reservations::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if reservation.status != ReservationStatus::Booked.as_str() {
        return Err(AppError::Conflict("reservation is not active".into()));
    }

    let table_id = reservation.table_id;
    let mut active: ReservationActive = reservation.into();
    active.status = Set(ReservationStatus::Cancelled.as_str().to_string());
    let reservation = active.update(&txn).await?;

    if let Some(table) = DiningTables::find_by_id(table_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
    {
        if table.status == TableStatus::Reserved.as_str() {
            let mut table_active: TableActive = table.into();
            table_active.status = Set(TableStatus::Available.as_str().to_string());
            table_active.update(&txn).await?;
        }
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.employee_id),
        "reservation_cancel",
        Some("reservations"),
        Some(serde_json::json!({ "reservation_id": reservation.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Reservation cancelled",
        reservation_from_entity(reservation)?,
        Some(Meta::empty()),
    ))
}

pub async fn list_reservations(
    state: &AppState,
    query: ReservationQuery,
) -> AppResult<ApiResponse<ReservationList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(table_id) = query.table_id {
        condition = condition.add(ReservationCol::TableId.eq(table_id));
    }
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(ReservationCol::Status.eq(status.clone()));
    }

    let finder = Reservations::find()
        .filter(condition)
        .order_by_asc(ReservationCol::StartsAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(reservation_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Reservations",
        ReservationList { items },
        Some(meta),
    ))
}

fn area_from_entity(model: AreaModel) -> Area {
    Area {
        id: model.id,
        name: model.name,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn table_from_entity(model: TableModel) -> AppResult<DiningTable> {
    let status = TableStatus::parse(&model.status).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("unknown table status {}", model.status))
    })?;
    Ok(DiningTable {
        id: model.id,
        area_id: model.area_id,
        name: model.name,
        seats: model.seats,
        status,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

fn reservation_from_entity(model: ReservationModel) -> AppResult<Reservation> {
    let status = match model.status.as_str() {
        "booked" => ReservationStatus::Booked,
        "seated" => ReservationStatus::Seated,
        "cancelled" => ReservationStatus::Cancelled,
        other => {
            return Err(AppError::Internal(anyhow::anyhow!(
                "unknown reservation status {other}"
            )));
        }
    };
    Ok(Reservation {
        id: model.id,
        table_id: model.table_id,
        customer_name: model.customer_name,
        customer_phone: model.customer_phone,
        party_size: model.party_size,
        starts_at: model.starts_at.with_timezone(&Utc),
        ends_at: model.ends_at.with_timezone(&Utc),
        status,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
