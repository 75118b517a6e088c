use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::inventory::{StockMovementRequest, StockMovementResponse, TransactionList},
    entity::{
        ingredients::{
            ActiveModel as IngredientActive, Entity as Ingredients, Model as IngredientModel,
        },
        inventory_transactions::{
            ActiveModel as LedgerActive, Column as LedgerCol, Entity as InventoryTransactions,
            Model as LedgerModel,
        },
        order_items::Model as OrderItemModel,
        recipe_items::{Column as RecipeCol, Entity as RecipeItems},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthEmployee, ensure_manager},
    models::{InventoryTransaction, TransactionType},
    response::{ApiResponse, Meta},
    routes::params::LedgerQuery,
    services::ingredient_service::ingredient_from_entity,
    state::AppState,
};

/// Append one ledger row and fold it into the ingredient's cached
/// `current_stock`. The ingredient row is locked for update first, so
/// concurrent movements against the same ingredient serialize; a subtraction
/// that would go negative fails before anything is written.
///
/// Callers must run this inside a transaction; on error the enclosing
/// transaction is expected to roll back.
pub async fn apply<C: ConnectionTrait>(
    conn: &C,
    ingredient_id: Uuid,
    transaction_type: TransactionType,
    quantity: i64,
    reference_order_id: Option<Uuid>,
    note: Option<String>,
    created_by: Option<Uuid>,
) -> AppResult<(LedgerModel, IngredientModel)> {
    if quantity <= 0 {
        return Err(AppError::Validation(
            "quantity must be greater than 0".into(),
        ));
    }

    let ingredient = Ingredients::find_by_id(ingredient_id)
        .lock(LockType::Update)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;

    let new_stock = if transaction_type.is_subtracting() {
        let remaining = ingredient.current_stock - quantity;
        if remaining < 0 {
            return Err(AppError::InsufficientStock {
                ingredient: ingredient.name.clone(),
                available: ingredient.current_stock,
                requested: quantity,
            });
        }
        remaining
    } else {
        ingredient.current_stock + quantity
    };

    let row = LedgerActive {
        id: Set(Uuid::new_v4()),
        ingredient_id: Set(ingredient_id),
        transaction_type: Set(transaction_type.as_str().to_string()),
        quantity: Set(quantity),
        reference_order_id: Set(reference_order_id),
        note: Set(note),
        created_by: Set(created_by),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;

    let mut active: IngredientActive = ingredient.into();
    active.current_stock = Set(new_stock);
    active.updated_at = Set(Utc::now().into());
    let ingredient = active.update(conn).await?;

    Ok((row, ingredient))
}

/// Deduct every ingredient consumed by the order's items.
///
/// Recipe requirements are folded into one total per ingredient, so each
/// ingredient gets at most one `auto_deduct` row per order, and the map is
/// walked in ingredient-id order to keep lock acquisition stable across
/// concurrent captures. Any shortage surfaces as `InsufficientStock` and the
/// enclosing transaction rolls back every deduction already applied.
pub async fn auto_deduct<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    items: &[OrderItemModel],
    created_by: Option<Uuid>,
) -> AppResult<()> {
    if items.is_empty() {
        return Ok(());
    }

    let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    let recipe_rows = RecipeItems::find()
        .filter(RecipeCol::ProductId.is_in(product_ids))
        .all(conn)
        .await?;

    let mut required: BTreeMap<Uuid, i64> = BTreeMap::new();
    for item in items {
        for line in recipe_rows
            .iter()
            .filter(|r| r.product_id == item.product_id)
        {
            *required.entry(line.ingredient_id).or_insert(0) +=
                line.quantity * item.quantity as i64;
        }
    }

    for (ingredient_id, quantity) in required {
        apply(
            conn,
            ingredient_id,
            TransactionType::AutoDeduct,
            quantity,
            Some(order_id),
            None,
            created_by,
        )
        .await?;
    }

    Ok(())
}

pub async fn record_movement(
    state: &AppState,
    user: &AuthEmployee,
    payload: StockMovementRequest,
) -> AppResult<ApiResponse<StockMovementResponse>> {
    ensure_manager(user)?;
    if payload.transaction_type == TransactionType::AutoDeduct {
        return Err(AppError::Validation(
            "auto_deduct movements are recorded by payment capture".into(),
        ));
    }

    let txn = state.orm.begin().await?;
    let (row, ingredient) = apply(
        &txn,
        payload.ingredient_id,
        payload.transaction_type,
        payload.quantity,
        None,
        payload.note.clone(),
        Some(user.employee_id),
    )
    .await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.employee_id),
        "stock_movement",
        Some("inventory_transactions"),
        Some(serde_json::json!({
            "ingredient_id": payload.ingredient_id,
            "transaction_type": payload.transaction_type.as_str(),
            "quantity": payload.quantity,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Stock movement recorded",
        StockMovementResponse {
            transaction: transaction_from_entity(row)?,
            ingredient: ingredient_from_entity(ingredient),
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_transactions(
    state: &AppState,
    _user: &AuthEmployee,
    query: LedgerQuery,
) -> AppResult<ApiResponse<TransactionList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(ingredient_id) = query.ingredient_id {
        condition = condition.add(LedgerCol::IngredientId.eq(ingredient_id));
    }
    if let Some(tx_type) = query.transaction_type.as_ref().filter(|s| !s.is_empty()) {
        if TransactionType::parse(tx_type).is_none() {
            return Err(AppError::Validation("unknown transaction type".into()));
        }
        condition = condition.add(LedgerCol::TransactionType.eq(tx_type.clone()));
    }

    let finder = InventoryTransactions::find()
        .filter(condition)
        .order_by_desc(LedgerCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(transaction_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Transactions",
        TransactionList { items },
        Some(meta),
    ))
}

pub(crate) fn transaction_from_entity(model: LedgerModel) -> AppResult<InventoryTransaction> {
    let transaction_type = TransactionType::parse(&model.transaction_type).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "unknown transaction type {}",
            model.transaction_type
        ))
    })?;
    Ok(InventoryTransaction {
        id: model.id,
        ingredient_id: model.ingredient_id,
        transaction_type,
        quantity: model.quantity,
        reference_order_id: model.reference_order_id,
        note: model.note,
        created_by: model.created_by,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
