use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod categories;
pub mod doc;
pub mod health;
pub mod ingredients;
pub mod inventory;
pub mod orders;
pub mod params;
pub mod payments;
pub mod products;
pub mod reports;
pub mod shop;
pub mod tables;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/shop", shop::router())
        .nest("/categories", categories::router())
        .nest("/products", products::router())
        .nest("/ingredients", ingredients::router())
        .nest("/inventory", inventory::router())
        .nest("/areas", tables::areas_router())
        .nest("/tables", tables::tables_router())
        .nest("/reservations", tables::reservations_router())
        .nest("/orders", orders::router().merge(payments::order_payment_router()))
        .nest("/payments", payments::router())
        .nest("/reports", reports::router())
}
