use crate::error::AppError;
use crate::models::OrderStatus;

/// Forward transition table. Each status has at most one direct successor;
/// `cancelled` is never a successor and is only reachable through `cancel`.
const CHAIN: [(OrderStatus, OrderStatus); 4] = [
    (OrderStatus::Pending, OrderStatus::Preparing),
    (OrderStatus::Preparing, OrderStatus::Ready),
    (OrderStatus::Ready, OrderStatus::Served),
    (OrderStatus::Served, OrderStatus::Paid),
];

pub fn successor(current: OrderStatus) -> Option<OrderStatus> {
    CHAIN
        .iter()
        .find(|(from, _)| *from == current)
        .map(|(_, to)| *to)
}

/// Validate a forward move. Only the direct successor is allowed, which makes
/// the lifecycle monotonic: an order can never re-enter an earlier status and
/// can enter `paid` at most once.
pub fn validate_advance(current: OrderStatus, target: OrderStatus) -> Result<(), AppError> {
    if successor(current) == Some(target) {
        return Ok(());
    }
    Err(AppError::InvalidTransition {
        from: current.as_str().to_string(),
        to: target.as_str().to_string(),
    })
}

/// Cancellation is allowed from any non-terminal status.
pub fn validate_cancel(current: OrderStatus) -> Result<(), AppError> {
    if current.is_terminal() {
        return Err(AppError::InvalidTransition {
            from: current.as_str().to_string(),
            to: OrderStatus::Cancelled.as_str().to_string(),
        });
    }
    Ok(())
}
