use crate::models::OrderType;

/// Derived money columns of an order. All values in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: i64,
    pub vat_amount: i64,
    pub service_fee: i64,
    pub total_amount: i64,
}

/// Recompute an order's derived totals from its line subtotals and the shop
/// rates. Pure and idempotent: same inputs, same outputs, no side effects.
///
/// VAT applies to the item subtotal; the service fee applies to dine-in
/// orders only. Rates are basis points, so 85_000 at 800 bps is exactly
/// 6_800 with integer arithmetic.
pub fn recompute(
    line_subtotals: &[i64],
    order_type: OrderType,
    vat_rate_bps: i32,
    service_fee_rate_bps: i32,
    discount_amount: i64,
    delivery_fee: i64,
) -> OrderTotals {
    let subtotal: i64 = line_subtotals.iter().sum();
    let vat_amount = apply_rate(subtotal, vat_rate_bps);
    let service_fee = if order_type == OrderType::DineIn {
        apply_rate(subtotal, service_fee_rate_bps)
    } else {
        0
    };
    let total_amount = subtotal - discount_amount + vat_amount + service_fee + delivery_fee;

    OrderTotals {
        subtotal,
        vat_amount,
        service_fee,
        total_amount,
    }
}

fn apply_rate(amount: i64, rate_bps: i32) -> i64 {
    amount * rate_bps as i64 / 10_000
}
