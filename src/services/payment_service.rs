use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    domain::status,
    dto::payments::{CapturePaymentRequest, PaymentWithOrder},
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::ActiveModel as OrderActive,
        payments::{
            ActiveModel as PaymentActive, Column as PaymentCol, Entity as Payments,
            Model as PaymentModel,
        },
        shops::{ActiveModel as ShopActive, Entity as Shops},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthEmployee,
    models::{OrderStatus, Payment, PaymentMethod},
    response::{ApiResponse, Meta},
    services::{
        inventory_service,
        order_service::{lock_order, order_from_entity, parse_status, release_table},
    },
    state::AppState,
};

/// Settle an order. One transaction covers the payment row, the `paid`
/// transition, the inventory auto-deduction and the receipt sequence, so
/// either all of them commit or none do.
pub async fn capture(
    state: &AppState,
    user: &AuthEmployee,
    order_id: Uuid,
    payload: CapturePaymentRequest,
) -> AppResult<ApiResponse<PaymentWithOrder>> {
    if payload.amount <= 0 {
        return Err(AppError::Validation(
            "amount must be greater than 0".into(),
        ));
    }

    let txn = state.orm.begin().await?;

    let order = lock_order(&txn, order_id).await?;
    let current = parse_status(&order)?;
    if current == OrderStatus::Paid {
        return Err(AppError::OrderAlreadyPaid);
    }
    // Only a served order has a path into paid; anything else is an
    // invalid transition, including cancelled.
    status::validate_advance(current, OrderStatus::Paid)?;

    if payload.amount != order.total_amount {
        return Err(AppError::AmountMismatch {
            amount: payload.amount,
            total: order.total_amount,
        });
    }

    let (received_amount, change_amount) = match payload.method {
        PaymentMethod::Cash => {
            let received = payload.received_amount.ok_or_else(|| {
                AppError::Validation("received_amount is required for cash payments".into())
            })?;
            if received < payload.amount {
                return Err(AppError::InsufficientTender {
                    received,
                    amount: payload.amount,
                });
            }
            (received, received - payload.amount)
        }
        _ => (payload.amount, 0),
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&txn)
        .await?;

    inventory_service::auto_deduct(&txn, order.id, &items, Some(user.employee_id)).await?;

    // Receipt numbers are allocated under the shop row lock, so they stay
    // sequential per shop even across concurrent captures.
    let shop = Shops::find_by_id(order.shop_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("shop is not configured")))?;
    let seq = shop.next_receipt_seq;
    let receipt_number = format!("RCP-{seq:06}");
    let mut shop_active: ShopActive = shop.into();
    shop_active.next_receipt_seq = Set(seq + 1);
    shop_active.updated_at = Set(Utc::now().into());
    let shop = shop_active.update(&txn).await?;

    let now = Utc::now();
    let payment = PaymentActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        shop_id: Set(shop.id),
        method: Set(payload.method.as_str().to_string()),
        amount: Set(payload.amount),
        received_amount: Set(received_amount),
        change_amount: Set(change_amount),
        receipt_number: Set(receipt_number),
        created_by: Set(user.employee_id),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let table_id = order.table_id;
    let mut active: OrderActive = order.into();
    active.status = Set(OrderStatus::Paid.as_str().to_string());
    active.paid_at = Set(Some(now.into()));
    active.updated_at = Set(now.into());
    let order = active.update(&txn).await?;

    if let Some(table_id) = table_id {
        release_table(&txn, table_id).await?;
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.employee_id),
        "payment_capture",
        Some("payments"),
        Some(serde_json::json!({
            "order_id": order.id,
            "payment_id": payment.id,
            "receipt_number": payment.receipt_number,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Payment captured",
        PaymentWithOrder {
            payment: payment_from_entity(payment)?,
            order: order_from_entity(order)?,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_payment(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Payment>> {
    let payment = Payments::find_by_id(id).one(&state.orm).await?;
    let payment = match payment {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success(
        "Payment",
        payment_from_entity(payment)?,
        Some(Meta::empty()),
    ))
}

pub async fn get_order_payment(
    state: &AppState,
    order_id: Uuid,
) -> AppResult<ApiResponse<Payment>> {
    let payment = Payments::find()
        .filter(PaymentCol::OrderId.eq(order_id))
        .one(&state.orm)
        .await?;
    let payment = match payment {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success(
        "Payment",
        payment_from_entity(payment)?,
        Some(Meta::empty()),
    ))
}

fn payment_from_entity(model: PaymentModel) -> AppResult<Payment> {
    let method = match model.method.as_str() {
        "cash" => PaymentMethod::Cash,
        "card" => PaymentMethod::Card,
        "transfer" => PaymentMethod::Transfer,
        other => {
            return Err(AppError::Internal(anyhow::anyhow!(
                "unknown payment method {other}"
            )));
        }
    };
    Ok(Payment {
        id: model.id,
        order_id: model.order_id,
        shop_id: model.shop_id,
        method,
        amount: model.amount,
        received_amount: model.received_amount,
        change_amount: model.change_amount,
        receipt_number: model.receipt_number,
        created_by: model.created_by,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
