use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use crate::{
    audit::log_audit,
    dto::shop::UpdateShopRequest,
    entity::shops::{ActiveModel as ShopActive, Entity as Shops, Model as ShopModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthEmployee, ensure_admin},
    models::Shop,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn get_shop(state: &AppState) -> AppResult<ApiResponse<Shop>> {
    let shop = find_shop(state).await?;
    Ok(ApiResponse::success(
        "Shop",
        shop_from_entity(shop),
        Some(Meta::empty()),
    ))
}

pub async fn update_shop(
    state: &AppState,
    user: &AuthEmployee,
    payload: UpdateShopRequest,
) -> AppResult<ApiResponse<Shop>> {
    ensure_admin(user)?;

    if payload.vat_rate_bps.is_some_and(|v| v < 0)
        || payload.service_fee_rate_bps.is_some_and(|v| v < 0)
    {
        return Err(AppError::Validation("rates must not be negative".into()));
    }

    let shop = find_shop(state).await?;

    let mut active: ShopActive = shop.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(currency) = payload.currency {
        active.currency = Set(currency);
    }
    if let Some(vat_rate_bps) = payload.vat_rate_bps {
        active.vat_rate_bps = Set(vat_rate_bps);
    }
    if let Some(service_fee_rate_bps) = payload.service_fee_rate_bps {
        active.service_fee_rate_bps = Set(service_fee_rate_bps);
    }
    active.updated_at = Set(Utc::now().into());

    let shop = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.employee_id),
        "shop_update",
        Some("shops"),
        Some(serde_json::json!({ "shop_id": shop.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Shop updated",
        shop_from_entity(shop),
        Some(Meta::empty()),
    ))
}

async fn find_shop(state: &AppState) -> AppResult<ShopModel> {
    Shops::find()
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("shop is not configured")))
}

fn shop_from_entity(model: ShopModel) -> Shop {
    Shop {
        id: model.id,
        name: model.name,
        currency: model.currency,
        vat_rate_bps: model.vat_rate_bps,
        service_fee_rate_bps: model.service_fee_rate_bps,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
