use axum_cafepos_api::domain::{status, totals};
use axum_cafepos_api::error::AppError;
use axum_cafepos_api::models::{OrderStatus, OrderType};

#[test]
fn lifecycle_follows_the_chain() {
    assert_eq!(
        status::successor(OrderStatus::Pending),
        Some(OrderStatus::Preparing)
    );
    assert_eq!(
        status::successor(OrderStatus::Preparing),
        Some(OrderStatus::Ready)
    );
    assert_eq!(
        status::successor(OrderStatus::Ready),
        Some(OrderStatus::Served)
    );
    assert_eq!(
        status::successor(OrderStatus::Served),
        Some(OrderStatus::Paid)
    );
    assert_eq!(status::successor(OrderStatus::Paid), None);
    assert_eq!(status::successor(OrderStatus::Cancelled), None);
}

#[test]
fn advancing_one_step_is_allowed() {
    assert!(status::validate_advance(OrderStatus::Pending, OrderStatus::Preparing).is_ok());
    assert!(status::validate_advance(OrderStatus::Served, OrderStatus::Paid).is_ok());
}

#[test]
fn skipping_a_step_is_rejected() {
    let err = status::validate_advance(OrderStatus::Pending, OrderStatus::Ready).unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));
}

#[test]
fn moving_backward_is_rejected() {
    let err = status::validate_advance(OrderStatus::Served, OrderStatus::Preparing).unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));
}

#[test]
fn terminal_states_allow_nothing() {
    for terminal in [OrderStatus::Paid, OrderStatus::Cancelled] {
        for target in [
            OrderStatus::Pending,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Served,
            OrderStatus::Paid,
        ] {
            assert!(status::validate_advance(terminal, target).is_err());
        }
        assert!(status::validate_cancel(terminal).is_err());
    }
}

#[test]
fn cancel_is_allowed_from_any_open_status() {
    for open in [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Served,
    ] {
        assert!(status::validate_cancel(open).is_ok());
    }
}

#[test]
fn dine_in_totals_match_the_receipt() {
    // 2 x 25,000 + 1 x 35,000 at 8% VAT and 5% service fee.
    let derived = totals::recompute(&[50_000, 35_000], OrderType::DineIn, 800, 500, 0, 0);
    assert_eq!(derived.subtotal, 85_000);
    assert_eq!(derived.vat_amount, 6_800);
    assert_eq!(derived.service_fee, 4_250);
    assert_eq!(derived.total_amount, 96_050);
}

#[test]
fn recompute_is_idempotent() {
    let first = totals::recompute(&[50_000, 35_000], OrderType::DineIn, 800, 500, 5_000, 0);
    let second = totals::recompute(&[50_000, 35_000], OrderType::DineIn, 800, 500, 5_000, 0);
    assert_eq!(first, second);
}

#[test]
fn service_fee_applies_to_dine_in_only() {
    let takeaway = totals::recompute(&[50_000], OrderType::Takeaway, 800, 500, 0, 0);
    assert_eq!(takeaway.service_fee, 0);
    assert_eq!(takeaway.total_amount, 54_000);

    let delivery = totals::recompute(&[50_000], OrderType::Delivery, 800, 500, 0, 15_000);
    assert_eq!(delivery.service_fee, 0);
    assert_eq!(delivery.total_amount, 69_000);
}

#[test]
fn discount_reduces_the_total() {
    let derived = totals::recompute(&[100_000], OrderType::Takeaway, 0, 0, 20_000, 0);
    assert_eq!(derived.total_amount, 80_000);
}

#[test]
fn empty_order_totals_are_zero() {
    let derived = totals::recompute(&[], OrderType::DineIn, 800, 500, 0, 0);
    assert_eq!(derived.subtotal, 0);
    assert_eq!(derived.vat_amount, 0);
    assert_eq!(derived.service_fee, 0);
    assert_eq!(derived.total_amount, 0);
}
