use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::ingredients::{CreateIngredientRequest, IngredientList, UpdateIngredientRequest},
    entity::ingredients::{
        ActiveModel as IngredientActive, Column as IngredientCol, Entity as Ingredients,
        Model as IngredientModel,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthEmployee, ensure_manager},
    models::{Ingredient, TransactionType},
    response::{ApiResponse, Meta},
    routes::params::IngredientQuery,
    services::inventory_service,
    state::AppState,
};

pub async fn list_ingredients(
    state: &AppState,
    query: IngredientQuery,
) -> AppResult<ApiResponse<IngredientList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(Expr::col(IngredientCol::Name).ilike(pattern));
    }

    let finder = Ingredients::find()
        .filter(condition)
        .order_by_asc(IngredientCol::Name);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ingredient_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ingredients",
        IngredientList { items },
        Some(meta),
    ))
}

pub async fn get_ingredient(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Ingredient>> {
    let result = Ingredients::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(ingredient_from_entity);
    let result = match result {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Ingredient", result, None))
}

pub async fn create_ingredient(
    state: &AppState,
    user: &AuthEmployee,
    payload: CreateIngredientRequest,
) -> AppResult<ApiResponse<Ingredient>> {
    ensure_manager(user)?;
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".into()));
    }
    if payload.min_stock_level.is_some_and(|v| v < 0) || payload.unit_cost.is_some_and(|v| v < 0) {
        return Err(AppError::Validation(
            "min_stock_level and unit_cost must not be negative".into(),
        ));
    }

    let exists = Ingredients::find()
        .filter(IngredientCol::Name.eq(payload.name.clone()))
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::Conflict("ingredient name already exists".into()));
    }

    let txn = state.orm.begin().await?;

    let ingredient = IngredientActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        unit: Set(payload.unit),
        current_stock: Set(0),
        min_stock_level: Set(payload.min_stock_level.unwrap_or(0)),
        unit_cost: Set(payload.unit_cost.unwrap_or(0)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    // Opening balance goes through the ledger so current_stock stays a pure
    // fold of the transaction history.
    let ingredient = match payload.opening_stock {
        Some(opening) if opening > 0 => {
            let (_, updated) = inventory_service::apply(
                &txn,
                ingredient.id,
                TransactionType::In,
                opening,
                None,
                Some("opening stock".into()),
                Some(user.employee_id),
            )
            .await?;
            updated
        }
        _ => ingredient,
    };

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.employee_id),
        "ingredient_create",
        Some("ingredients"),
        Some(serde_json::json!({ "ingredient_id": ingredient.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Ingredient created",
        ingredient_from_entity(ingredient),
        Some(Meta::empty()),
    ))
}

/// Stock itself is not editable here; it only moves through the ledger.
pub async fn update_ingredient(
    state: &AppState,
    user: &AuthEmployee,
    id: Uuid,
    payload: UpdateIngredientRequest,
) -> AppResult<ApiResponse<Ingredient>> {
    ensure_manager(user)?;
    if payload.min_stock_level.is_some_and(|v| v < 0) || payload.unit_cost.is_some_and(|v| v < 0) {
        return Err(AppError::Validation(
            "min_stock_level and unit_cost must not be negative".into(),
        ));
    }

    let existing = Ingredients::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };

    let mut active: IngredientActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(unit) = payload.unit {
        active.unit = Set(unit);
    }
    if let Some(min_stock_level) = payload.min_stock_level {
        active.min_stock_level = Set(min_stock_level);
    }
    if let Some(unit_cost) = payload.unit_cost {
        active.unit_cost = Set(unit_cost);
    }
    active.updated_at = Set(Utc::now().into());

    let ingredient = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.employee_id),
        "ingredient_update",
        Some("ingredients"),
        Some(serde_json::json!({ "ingredient_id": ingredient.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Ingredient updated",
        ingredient_from_entity(ingredient),
        Some(Meta::empty()),
    ))
}

pub async fn list_low_stock(
    state: &AppState,
    query: IngredientQuery,
) -> AppResult<ApiResponse<IngredientList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let finder = Ingredients::find()
        .filter(Expr::col(IngredientCol::CurrentStock).lte(Expr::col(IngredientCol::MinStockLevel)))
        .order_by_asc(IngredientCol::CurrentStock);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ingredient_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Low stock",
        IngredientList { items },
        Some(meta),
    ))
}

pub(crate) fn ingredient_from_entity(model: IngredientModel) -> Ingredient {
    Ingredient {
        id: model.id,
        name: model.name,
        unit: model.unit,
        current_stock: model.current_stock,
        min_stock_level: model.min_stock_level,
        unit_cost: model.unit_cost,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
