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
    domain::{status, totals},
    dto::orders::{
        AddItemRequest, AdvanceStatusRequest, CancelOrderRequest, OpenOrderRequest, OrderList,
        OrderWithItems,
    },
    entity::{
        dining_tables::{
            ActiveModel as TableActive, Entity as DiningTables, Model as TableModel,
        },
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::Entity as Products,
        shops::Entity as Shops,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthEmployee,
    models::{Order, OrderItem, OrderStatus, OrderType, TableStatus},
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    state::AppState,
};

pub async fn open_order(
    state: &AppState,
    user: &AuthEmployee,
    payload: OpenOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let discount_amount = payload.discount_amount.unwrap_or(0);
    let delivery_fee = payload.delivery_fee.unwrap_or(0);
    if discount_amount < 0 || delivery_fee < 0 {
        return Err(AppError::Validation(
            "discount_amount and delivery_fee must not be negative".into(),
        ));
    }
    if delivery_fee > 0 && payload.order_type != OrderType::Delivery {
        return Err(AppError::Validation(
            "delivery_fee only applies to delivery orders".into(),
        ));
    }
    if payload.order_type == OrderType::DineIn && payload.table_id.is_none() {
        return Err(AppError::Validation(
            "dine-in orders require a table_id".into(),
        ));
    }

    let txn = state.orm.begin().await?;

    let shop = Shops::find()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("shop is not configured")))?;

    if let Some(table_id) = payload.table_id {
        occupy_table(&txn, table_id).await?;
    }

    let derived = totals::recompute(
        &[],
        payload.order_type,
        shop.vat_rate_bps,
        shop.service_fee_rate_bps,
        discount_amount,
        delivery_fee,
    );

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        shop_id: Set(shop.id),
        table_id: Set(payload.table_id),
        employee_id: Set(user.employee_id),
        order_type: Set(payload.order_type.as_str().to_string()),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        subtotal: Set(derived.subtotal),
        discount_amount: Set(discount_amount),
        vat_amount: Set(derived.vat_amount),
        service_fee: Set(derived.service_fee),
        delivery_fee: Set(delivery_fee),
        total_amount: Set(derived.total_amount),
        note: Set(payload.note),
        cancelled_by: Set(None),
        cancelled_at: Set(None),
        cancelled_reason: Set(None),
        paid_at: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.employee_id),
        "order_open",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order opened",
        OrderWithItems {
            order: order_from_entity(order)?,
            items: Vec::new(),
        },
        Some(Meta::empty()),
    ))
}

pub async fn add_item(
    state: &AppState,
    user: &AuthEmployee,
    order_id: Uuid,
    payload: AddItemRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    if payload.quantity <= 0 {
        return Err(AppError::Validation(
            "quantity must be greater than 0".into(),
        ));
    }

    let txn = state.orm.begin().await?;

    let order = lock_order(&txn, order_id).await?;
    ensure_open(&order)?;

    let product = Products::find_by_id(payload.product_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::Validation("product not found".into()))?;
    if !product.is_active {
        return Err(AppError::Validation("product is not active".into()));
    }

    let quantity = payload.quantity;
    let subtotal = product.price * quantity as i64;
    OrderItemActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        product_id: Set(product.id),
        name: Set(product.name.clone()),
        quantity: Set(quantity),
        unit_price: Set(product.price),
        subtotal: Set(subtotal),
        status: Set("pending".to_string()),
        note: Set(payload.note),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let (order, items) = recompute_totals(&txn, order).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.employee_id),
        "order_item_add",
        Some("orders"),
        Some(serde_json::json!({
            "order_id": order.id,
            "product_id": product.id,
            "quantity": quantity,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Item added",
        with_items(order, items)?,
        Some(Meta::empty()),
    ))
}

pub async fn remove_item(
    state: &AppState,
    user: &AuthEmployee,
    order_id: Uuid,
    item_id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let txn = state.orm.begin().await?;

    let order = lock_order(&txn, order_id).await?;
    ensure_open(&order)?;

    let item = OrderItems::find_by_id(item_id)
        .filter(OrderItemCol::OrderId.eq(order.id))
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let removed_product_id = item.product_id;
    OrderItems::delete_by_id(item.id).exec(&txn).await?;

    let (order, items) = recompute_totals(&txn, order).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.employee_id),
        "order_item_remove",
        Some("orders"),
        Some(serde_json::json!({
            "order_id": order.id,
            "product_id": removed_product_id,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Item removed",
        with_items(order, items)?,
        Some(Meta::empty()),
    ))
}

/// Move an order one step along its lifecycle. `paid` is deliberately not
/// reachable here: capture is the only path that marks an order paid.
pub async fn advance_status(
    state: &AppState,
    user: &AuthEmployee,
    order_id: Uuid,
    payload: AdvanceStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    let target = OrderStatus::parse(&payload.status)
        .ok_or_else(|| AppError::Validation("unknown order status".into()))?;
    if target == OrderStatus::Paid {
        return Err(AppError::Validation(
            "orders are marked paid through payment capture".into(),
        ));
    }
    if target == OrderStatus::Cancelled {
        return Err(AppError::Validation(
            "use the cancel endpoint to cancel an order".into(),
        ));
    }

    let txn = state.orm.begin().await?;

    let order = lock_order(&txn, order_id).await?;
    let current = parse_status(&order)?;
    status::validate_advance(current, target)?;

    let mut active: OrderActive = order.into();
    active.status = Set(target.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.employee_id),
        "order_status",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order)?,
        Some(Meta::empty()),
    ))
}

pub async fn cancel_order(
    state: &AppState,
    user: &AuthEmployee,
    order_id: Uuid,
    payload: CancelOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    if payload.reason.trim().is_empty() {
        return Err(AppError::Validation("reason must not be empty".into()));
    }

    let txn = state.orm.begin().await?;

    let order = lock_order(&txn, order_id).await?;
    let current = parse_status(&order)?;
    status::validate_cancel(current)?;

    let table_id = order.table_id;
    let now = Utc::now();
    let mut active: OrderActive = order.into();
    active.status = Set(OrderStatus::Cancelled.as_str().to_string());
    active.cancelled_by = Set(Some(user.employee_id));
    active.cancelled_at = Set(Some(now.into()));
    active.cancelled_reason = Set(Some(payload.reason.clone()));
    active.updated_at = Set(now.into());
    let order = active.update(&txn).await?;

    if let Some(table_id) = table_id {
        release_table(&txn, table_id).await?;
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.employee_id),
        "order_cancel",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "reason": payload.reason })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order cancelled",
        order_from_entity(order)?,
        Some(Meta::empty()),
    ))
}

pub async fn get_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "OK",
        with_items(order, items)?,
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        if OrderStatus::parse(status).is_none() {
            return Err(AppError::Validation("unknown order status".into()));
        }
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let finder = Orders::find()
        .filter(condition)
        .order_by_desc(OrderCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

/// Recompute the derived money columns from the current line items. Pure
/// arithmetic lives in `domain::totals`; this reads the lines, writes the
/// four derived columns and returns the refreshed model plus items.
pub(crate) async fn recompute_totals<C: ConnectionTrait>(
    conn: &C,
    order: OrderModel,
) -> AppResult<(OrderModel, Vec<OrderItemModel>)> {
    let shop = Shops::find_by_id(order.shop_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("shop is not configured")))?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(conn)
        .await?;

    let line_subtotals: Vec<i64> = items.iter().map(|i| i.subtotal).collect();
    let order_type = parse_order_type(&order)?;
    let derived = totals::recompute(
        &line_subtotals,
        order_type,
        shop.vat_rate_bps,
        shop.service_fee_rate_bps,
        order.discount_amount,
        order.delivery_fee,
    );

    let mut active: OrderActive = order.into();
    active.subtotal = Set(derived.subtotal);
    active.vat_amount = Set(derived.vat_amount);
    active.service_fee = Set(derived.service_fee);
    active.total_amount = Set(derived.total_amount);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(conn).await?;

    Ok((order, items))
}

pub(crate) async fn lock_order<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> AppResult<OrderModel> {
    Orders::find_by_id(order_id)
        .lock(LockType::Update)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

fn ensure_open(order: &OrderModel) -> AppResult<()> {
    let current = parse_status(order)?;
    if current.is_terminal() {
        return Err(AppError::Conflict("order is no longer open".into()));
    }
    Ok(())
}

async fn occupy_table<C: ConnectionTrait>(conn: &C, table_id: Uuid) -> AppResult<TableModel> {
    let table = DiningTables::find_by_id(table_id)
        .lock(LockType::Update)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::Validation("table not found".into()))?;

    if table.status == TableStatus::Occupied.as_str() {
        return Err(AppError::Conflict("table is already occupied".into()));
    }

    let mut active: TableActive = table.into();
    active.status = Set(TableStatus::Occupied.as_str().to_string());
    Ok(active.update(conn).await?)
}

pub(crate) async fn release_table<C: ConnectionTrait>(
    conn: &C,
    table_id: Uuid,
) -> AppResult<()> {
    let table = DiningTables::find_by_id(table_id)
        .lock(LockType::Update)
        .one(conn)
        .await?;
    if let Some(table) = table {
        let mut active: TableActive = table.into();
        active.status = Set(TableStatus::Available.as_str().to_string());
        active.update(conn).await?;
    }
    Ok(())
}

fn with_items(order: OrderModel, items: Vec<OrderItemModel>) -> AppResult<OrderWithItems> {
    Ok(OrderWithItems {
        order: order_from_entity(order)?,
        items: items.into_iter().map(order_item_from_entity).collect(),
    })
}

pub(crate) fn parse_status(order: &OrderModel) -> AppResult<OrderStatus> {
    OrderStatus::parse(&order.status)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("unknown order status {}", order.status)))
}

fn parse_order_type(order: &OrderModel) -> AppResult<OrderType> {
    OrderType::parse(&order.order_type).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("unknown order type {}", order.order_type))
    })
}

pub(crate) fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    let status = OrderStatus::parse(&model.status)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("unknown order status {}", model.status)))?;
    let order_type = OrderType::parse(&model.order_type).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("unknown order type {}", model.order_type))
    })?;
    Ok(Order {
        id: model.id,
        shop_id: model.shop_id,
        table_id: model.table_id,
        employee_id: model.employee_id,
        order_type,
        status,
        subtotal: model.subtotal,
        discount_amount: model.discount_amount,
        vat_amount: model.vat_amount,
        service_fee: model.service_fee,
        delivery_fee: model.delivery_fee,
        total_amount: model.total_amount,
        note: model.note,
        cancelled_by: model.cancelled_by,
        cancelled_at: model.cancelled_at.map(|dt| dt.with_timezone(&Utc)),
        cancelled_reason: model.cancelled_reason,
        paid_at: model.paid_at.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

pub(crate) fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        name: model.name,
        quantity: model.quantity,
        unit_price: model.unit_price,
        subtotal: model.subtotal,
        status: model.status,
        note: model.note,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
