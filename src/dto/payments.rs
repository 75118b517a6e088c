use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Order, Payment, PaymentMethod};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CapturePaymentRequest {
    pub method: PaymentMethod,
    /// Must equal the order's `total_amount` at capture time.
    pub amount: i64,
    /// Cash only: what the customer handed over.
    pub received_amount: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentWithOrder {
    pub payment: Payment,
    pub order: Order,
}
