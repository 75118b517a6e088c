use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthEmployee, ROLE_ADMIN, ROLE_MANAGER, ROLE_STAFF, ensure_admin},
    models::Employee,
    response::{ApiResponse, Meta},
};

#[derive(FromRow)]
struct EmployeeAuthRow {
    id: Uuid,
    password_hash: String,
    role: String,
}

/// Only admins can create accounts; there is no self-service signup for a
/// staff terminal.
pub async fn register_employee(
    pool: &DbPool,
    actor: &AuthEmployee,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<Employee>> {
    ensure_admin(actor)?;

    let RegisterRequest {
        email,
        password,
        full_name,
        role,
    } = payload;

    if ![ROLE_ADMIN, ROLE_MANAGER, ROLE_STAFF].contains(&role.as_str()) {
        return Err(AppError::Validation("unknown role".into()));
    }
    if password.len() < 8 {
        return Err(AppError::Validation(
            "password must be at least 8 characters".into(),
        ));
    }

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM employees WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(pool)
        .await?;

    if exist.is_some() {
        return Err(AppError::Conflict("email is already taken".to_string()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let id = Uuid::new_v4();

    let employee: Employee = sqlx::query_as(
        r#"
        INSERT INTO employees (id, email, password_hash, full_name, role)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, email, full_name, role, created_at
        "#,
    )
    .bind(id)
    .bind(email.as_str())
    .bind(password_hash)
    .bind(full_name.as_str())
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(actor.employee_id),
        "employee_register",
        Some("employees"),
        Some(serde_json::json!({ "employee_id": employee.id, "role": employee.role })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }
    Ok(ApiResponse::success("Employee created", employee, None))
}

pub async fn login_employee(
    pool: &DbPool,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let row: Option<EmployeeAuthRow> =
        sqlx::query_as("SELECT id, password_hash, role FROM employees WHERE email = $1")
            .bind(email.as_str())
            .fetch_optional(pool)
            .await?;

    let row = match row {
        Some(r) => r,
        None => return Err(AppError::Validation("Invalid email or password".into())),
    };

    let parsed_hash = PasswordHash::new(&row.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::Validation("Invalid email or password".into()));
    }

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: row.id.to_string(),
        role: row.role.clone(),
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    let resp = LoginResponse {
        token: format!("Bearer {}", token),
    };

    if let Err(err) = log_audit(
        pool,
        Some(row.id),
        "employee_login",
        Some("employees"),
        Some(serde_json::json!({ "employee_id": row.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

pub async fn current_employee(
    pool: &DbPool,
    user: &AuthEmployee,
) -> AppResult<ApiResponse<Employee>> {
    let employee: Option<Employee> = sqlx::query_as(
        "SELECT id, email, full_name, role, created_at FROM employees WHERE id = $1",
    )
    .bind(user.employee_id)
    .fetch_optional(pool)
    .await?;

    let employee = match employee {
        Some(e) => e,
        None => return Err(AppError::NotFound),
    };

    Ok(ApiResponse::success("OK", employee, Some(Meta::empty())))
}
