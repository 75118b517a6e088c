use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateShopRequest {
    pub name: Option<String>,
    pub currency: Option<String>,
    pub vat_rate_bps: Option<i32>,
    pub service_fee_rate_bps: Option<i32>,
}
