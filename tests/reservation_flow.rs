use chrono::{Duration, Utc};

use axum_cafepos_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::tables::{CreateAreaRequest, CreateReservationRequest, CreateTableRequest},
    entity::{dining_tables::Entity as DiningTables, employees::ActiveModel as EmployeeActive},
    error::AppError,
    middleware::auth::AuthEmployee,
    models::ReservationStatus,
    services::table_service,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set, Statement};
use uuid::Uuid;

// Double-booking a table for an overlapping window must be rejected; seating
// and cancelling drive the table status.
#[tokio::test]
async fn reservation_conflicts_and_seating() -> anyhow::Result<()> {
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

    let manager = AuthEmployee {
        employee_id: create_employee(&state, "manager", "manager@example.com").await?,
        role: "manager".into(),
    };

    let area = table_service::create_area(
        &state,
        &manager,
        CreateAreaRequest {
            name: "Terrace".into(),
        },
    )
    .await?
    .data
    .unwrap();
    let table = table_service::create_table(
        &state,
        &manager,
        CreateTableRequest {
            area_id: area.id,
            name: "T1".into(),
            seats: 4,
        },
    )
    .await?
    .data
    .unwrap();

    let tonight = Utc::now() + Duration::hours(4);

    let booked = table_service::create_reservation(
        &state,
        &manager,
        CreateReservationRequest {
            table_id: table.id,
            customer_name: "Nguyen".into(),
            customer_phone: None,
            party_size: 2,
            starts_at: tonight,
            ends_at: tonight + Duration::hours(2),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(booked.status, ReservationStatus::Booked);
    assert_eq!(table_status(&state, table.id).await?, "reserved");

    // Overlapping window on the same table is a conflict.
    let clash = table_service::create_reservation(
        &state,
        &manager,
        CreateReservationRequest {
            table_id: table.id,
            customer_name: "Tran".into(),
            customer_phone: None,
            party_size: 4,
            starts_at: tonight + Duration::hours(1),
            ends_at: tonight + Duration::hours(3),
        },
    )
    .await;
    assert!(matches!(clash, Err(AppError::Conflict(_))));

    // A later slot on the same table is fine.
    let later = table_service::create_reservation(
        &state,
        &manager,
        CreateReservationRequest {
            table_id: table.id,
            customer_name: "Tran".into(),
            customer_phone: None,
            party_size: 4,
            starts_at: tonight + Duration::hours(3),
            ends_at: tonight + Duration::hours(5),
        },
    )
    .await?
    .data
    .unwrap();

    // Seating occupies the table.
    let seated = table_service::seat_reservation(&state, &manager, booked.id)
        .await?
        .data
        .unwrap();
    assert_eq!(seated.status, ReservationStatus::Seated);
    assert_eq!(table_status(&state, table.id).await?, "occupied");

    // Seating twice is rejected.
    let reseat = table_service::seat_reservation(&state, &manager, booked.id).await;
    assert!(matches!(reseat, Err(AppError::Conflict(_))));

    // Cancelling the later booked reservation works and leaves the occupied
    // table alone.
    let cancelled = table_service::cancel_reservation(&state, &manager, later.id)
        .await?
        .data
        .unwrap();
    assert_eq!(cancelled.status, ReservationStatus::Cancelled);
    assert_eq!(table_status(&state, table.id).await?, "occupied");

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

async fn table_status(state: &AppState, id: Uuid) -> anyhow::Result<String> {
    let table = DiningTables::find_by_id(id)
        .one(&state.orm)
        .await?
        .expect("table exists");
    Ok(table.status)
}
