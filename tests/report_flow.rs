use chrono::{Duration, Utc};

use axum_cafepos_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        inventory::StockMovementRequest,
        orders::{AddItemRequest, AdvanceStatusRequest, OpenOrderRequest},
        payments::CapturePaymentRequest,
        products::{RecipeLine, SetRecipeRequest},
        reports::{RevenueGroupBy, RevenueQuery, SalesQuery},
    },
    entity::{
        categories::ActiveModel as CategoryActive, employees::ActiveModel as EmployeeActive,
        ingredients::ActiveModel as IngredientActive, products::ActiveModel as ProductActive,
    },
    middleware::auth::AuthEmployee,
    models::{OrderType, PaymentMethod, TransactionType},
    services::{
        ingredient_service, inventory_service, order_service, payment_service, product_service,
        report_service,
    },
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

// Reporting is a pure read over the ledgers: an empty range yields empty
// aggregates, and a paid order shows up in revenue, sales and valuation.
#[tokio::test]
async fn reports_reflect_paid_orders() -> anyhow::Result<()> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let admin = AuthEmployee {
        employee_id: create_employee(&state, "admin", "admin@example.com").await?,
        role: "admin".into(),
    };

    // An empty range is a zeroed series, not an error.
    let empty = report_service::revenue(
        &state,
        RevenueQuery {
            start: Utc::now() - Duration::days(400),
            end: Utc::now() - Duration::days(399),
            group_by: Some(RevenueGroupBy::Day),
        },
    )
    .await?;
    assert!(empty.data.unwrap().points.is_empty());

    // One takeaway order: 2 espresso at 25,000, 8% VAT, no service fee.
    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set("Coffee".into()),
        position: Set(1),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    let espresso = ProductActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(category.id),
        name: Set("Espresso".into()),
        description: Set(None),
        price: Set(25_000),
        is_active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let beans = IngredientActive {
        id: Set(Uuid::new_v4()),
        name: Set("Arabica beans".into()),
        unit: Set("g".into()),
        current_stock: Set(0),
        min_stock_level: Set(500),
        unit_cost: Set(35),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    inventory_service::record_movement(
        &state,
        &admin,
        StockMovementRequest {
            ingredient_id: beans.id,
            transaction_type: TransactionType::In,
            quantity: 400,
            note: Some("opening stock".into()),
        },
    )
    .await?;
    product_service::set_recipe(
        &state,
        &admin,
        espresso.id,
        SetRecipeRequest {
            items: vec![RecipeLine {
                ingredient_id: beans.id,
                quantity: 18,
            }],
        },
    )
    .await?;

    let order = order_service::open_order(
        &state,
        &admin,
        OpenOrderRequest {
            order_type: OrderType::Takeaway,
            table_id: None,
            note: None,
            discount_amount: None,
            delivery_fee: None,
        },
    )
    .await?
    .data
    .unwrap()
    .order;
    order_service::add_item(
        &state,
        &admin,
        order.id,
        AddItemRequest {
            product_id: espresso.id,
            quantity: 2,
            note: None,
        },
    )
    .await?;
    for status in ["preparing", "ready", "served"] {
        order_service::advance_status(
            &state,
            &admin,
            order.id,
            AdvanceStatusRequest {
                status: status.into(),
            },
        )
        .await?;
    }
    payment_service::capture(
        &state,
        &admin,
        order.id,
        CapturePaymentRequest {
            method: PaymentMethod::Card,
            amount: 54_000,
            received_amount: None,
        },
    )
    .await?;

    let start = Utc::now() - Duration::days(1);
    let end = Utc::now() + Duration::days(1);

    let revenue = report_service::revenue(
        &state,
        RevenueQuery {
            start,
            end,
            group_by: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(revenue.points.len(), 1);
    assert_eq!(revenue.points[0].order_count, 1);
    assert_eq!(revenue.points[0].total, 54_000);

    let sales = report_service::sales(&state, SalesQuery { start, end })
        .await?
        .data
        .unwrap();
    assert_eq!(sales.items.len(), 1);
    assert_eq!(sales.items[0].name, "Espresso");
    assert_eq!(sales.items[0].quantity, 2);
    assert_eq!(sales.items[0].subtotal, 50_000);

    // 400 - 36 = 364 g left, below the 500 g minimum; valuation is stock x cost.
    let inventory = report_service::inventory_report(&state).await?.data.unwrap();
    assert_eq!(inventory.low_stock.len(), 1);
    assert_eq!(inventory.low_stock[0].current_stock, 364);
    assert_eq!(inventory.total_valuation, 364 * 35);

    let low = ingredient_service::list_low_stock(
        &state,
        axum_cafepos_api::routes::params::IngredientQuery {
            pagination: axum_cafepos_api::routes::params::Pagination {
                page: Some(1),
                per_page: Some(20),
            },
            q: None,
        },
    )
    .await?;
    assert!(
        low.data
            .unwrap()
            .items
            .iter()
            .any(|i| i.id == beans.id),
        "expected beans to appear in the low-stock list"
    );

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;
    let pool = create_pool(database_url).await?;

    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE payments, order_items, orders, inventory_transactions, recipe_items, \
         products, categories, reservations, dining_tables, areas, ingredients, audit_logs, \
         employees RESTART IDENTITY CASCADE",
    ))
    .await?;
    orm.execute(Statement::from_string(
        backend,
        "UPDATE shops SET vat_rate_bps = 800, service_fee_rate_bps = 500, next_receipt_seq = 1",
    ))
    .await?;

    Ok(AppState { pool, orm })
}

async fn create_employee(state: &AppState, role: &str, email: &str) -> anyhow::Result<Uuid> {
    let employee = EmployeeActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        full_name: Set("Test Employee".into()),
        role: Set(role.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(employee.id)
}
