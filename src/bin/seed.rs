use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum_cafepos_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let pool = create_pool(&config.database_url).await?;

    let admin_id = ensure_employee(&pool, "admin@example.com", "admin123!", "Admin", "admin").await?;
    let barista_id =
        ensure_employee(&pool, "barista@example.com", "barista123!", "Barista", "staff").await?;

    seed_catalog(&pool).await?;
    seed_floor(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, Barista ID: {barista_id}");
    Ok(())
}

async fn ensure_employee(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    full_name: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO employees (id, email, password_hash, full_name, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(full_name)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    let employee_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM employees WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured employee {email} (role={role})");
    Ok(employee_id)
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let categories = vec![("Coffee", 1), ("Tea", 2), ("Pastry", 3)];
    for (name, position) in &categories {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, position)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(position)
        .execute(pool)
        .await?;
    }

    // (name, unit, opening stock, min level, unit cost)
    let ingredients = vec![
        ("Arabica beans", "g", 20_000_i64, 2_000_i64, 35_i64),
        ("Whole milk", "ml", 50_000, 5_000, 8),
        ("Green tea leaves", "g", 5_000, 500, 40),
        ("Croissant dough", "pcs", 60, 10, 9_000),
    ];
    for (name, unit, stock, min_level, unit_cost) in &ingredients {
        let id = Uuid::new_v4();
        let inserted = sqlx::query(
            r#"
            INSERT INTO ingredients (id, name, unit, current_stock, min_stock_level, unit_cost)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(unit)
        .bind(stock)
        .bind(min_level)
        .bind(unit_cost)
        .execute(pool)
        .await?;

        // Keep current_stock equal to the fold of the ledger.
        if inserted.rows_affected() > 0 {
            sqlx::query(
                r#"
                INSERT INTO inventory_transactions (id, ingredient_id, transaction_type, quantity, note)
                VALUES ($1, $2, 'in', $3, 'opening stock')
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(id)
            .bind(stock)
            .execute(pool)
            .await?;
        }
    }

    let products = vec![
        ("Espresso", "Coffee", "Double shot", 25_000_i64),
        ("Cafe Latte", "Coffee", "Espresso with steamed milk", 35_000),
        ("Green Tea", "Tea", "Loose leaf, hot", 30_000),
        ("Butter Croissant", "Pastry", "Baked in house", 28_000),
    ];
    for (name, category, description, price) in &products {
        sqlx::query(
            r#"
            INSERT INTO products (id, category_id, name, description, price)
            SELECT $1, c.id, $2, $3, $4 FROM categories c WHERE c.name = $5
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(category)
        .execute(pool)
        .await?;
    }

    // (product, ingredient, quantity per unit)
    let recipes = vec![
        ("Espresso", "Arabica beans", 18_i64),
        ("Cafe Latte", "Arabica beans", 18),
        ("Cafe Latte", "Whole milk", 180),
        ("Green Tea", "Green tea leaves", 5),
        ("Butter Croissant", "Croissant dough", 1),
    ];
    for (product, ingredient, quantity) in &recipes {
        sqlx::query(
            r#"
            INSERT INTO recipe_items (id, product_id, ingredient_id, quantity)
            SELECT $1, p.id, i.id, $2
            FROM products p, ingredients i
            WHERE p.name = $3 AND i.name = $4
            ON CONFLICT (product_id, ingredient_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(quantity)
        .bind(product)
        .bind(ingredient)
        .execute(pool)
        .await?;
    }

    println!("Seeded catalog");
    Ok(())
}

async fn seed_floor(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO areas (id, name)
        VALUES ($1, 'Main Floor')
        ON CONFLICT (name) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .execute(pool)
    .await?;

    for (name, seats) in [("T1", 2), ("T2", 2), ("T3", 4), ("T4", 6)] {
        sqlx::query(
            r#"
            INSERT INTO dining_tables (id, area_id, name, seats)
            SELECT $1, a.id, $2, $3 FROM areas a WHERE a.name = 'Main Floor'
            ON CONFLICT (area_id, name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(seats)
        .execute(pool)
        .await?;
    }

    println!("Seeded floor plan");
    Ok(())
}
