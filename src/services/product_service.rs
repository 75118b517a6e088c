use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashSet;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::products::{
        CreateProductRequest, ProductList, RecipeList, SetRecipeRequest, UpdateProductRequest,
    },
    entity::{
        categories::Entity as Categories,
        ingredients::{Column as IngredientCol, Entity as Ingredients},
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        products::{
            ActiveModel as ProductActive, Column as ProductCol, Entity as Products,
            Model as ProductModel,
        },
        recipe_items::{
            ActiveModel as RecipeActive, Column as RecipeCol, Entity as RecipeItems,
            Model as RecipeModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthEmployee, ensure_manager},
    models::{Product, RecipeItem},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(ProductCol::Name).ilike(pattern.clone()))
                .add(Expr::col(ProductCol::Description).ilike(pattern)),
        );
    }

    if let Some(category_id) = query.category_id {
        condition = condition.add(ProductCol::CategoryId.eq(category_id));
    }

    if let Some(is_active) = query.is_active {
        condition = condition.add(ProductCol::IsActive.eq(is_active));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(ProductCol::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(ProductCol::Price.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => ProductCol::CreatedAt,
        ProductSortBy::Price => ProductCol::Price,
        ProductSortBy::Name => ProductCol::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let result = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(product_from_entity);
    let result = match result {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Product", result, None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthEmployee,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_manager(user)?;
    if payload.price < 0 {
        return Err(AppError::Validation("price must not be negative".into()));
    }

    let category = Categories::find_by_id(payload.category_id)
        .one(&state.orm)
        .await?;
    if category.is_none() {
        return Err(AppError::Validation("category not found".into()));
    }

    let active = ProductActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(payload.category_id),
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price),
        is_active: Set(true),
        created_at: NotSet,
    };
    let product = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.employee_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthEmployee,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_manager(user)?;
    if payload.price.is_some_and(|p| p < 0) {
        return Err(AppError::Validation("price must not be negative".into()));
    }

    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    if let Some(category_id) = payload.category_id {
        let category = Categories::find_by_id(category_id).one(&state.orm).await?;
        if category.is_none() {
            return Err(AppError::Validation("category not found".into()));
        }
    }

    let mut active: ProductActive = existing.into();
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(category_id);
    }
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }

    let product = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.employee_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

/// Products that were ever sold keep their order history; they can only be
/// deactivated, not deleted.
pub async fn delete_product(
    state: &AppState,
    user: &AuthEmployee,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_manager(user)?;

    let sold = OrderItems::find()
        .filter(OrderItemCol::ProductId.eq(id))
        .count(&state.orm)
        .await?;
    if sold > 0 {
        return Err(AppError::Conflict(
            "product has order history; deactivate it instead".into(),
        ));
    }

    let result = Products::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.employee_id),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn get_recipe(state: &AppState, id: Uuid) -> AppResult<ApiResponse<RecipeList>> {
    let product = Products::find_by_id(id).one(&state.orm).await?;
    if product.is_none() {
        return Err(AppError::NotFound);
    }

    let items = RecipeItems::find()
        .filter(RecipeCol::ProductId.eq(id))
        .order_by_asc(RecipeCol::IngredientId)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(recipe_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Recipe",
        RecipeList { items },
        Some(Meta::empty()),
    ))
}

/// Replace the product's recipe wholesale. The previous lines are dropped
/// and the new set inserted in one transaction.
pub async fn set_recipe(
    state: &AppState,
    user: &AuthEmployee,
    id: Uuid,
    payload: SetRecipeRequest,
) -> AppResult<ApiResponse<RecipeList>> {
    ensure_manager(user)?;

    let product = Products::find_by_id(id).one(&state.orm).await?;
    if product.is_none() {
        return Err(AppError::NotFound);
    }

    let mut seen: HashSet<Uuid> = HashSet::new();
    for line in &payload.items {
        if line.quantity <= 0 {
            return Err(AppError::Validation(
                "recipe quantity must be greater than 0".into(),
            ));
        }
        if !seen.insert(line.ingredient_id) {
            return Err(AppError::Validation(
                "duplicate ingredient in recipe".into(),
            ));
        }
    }

    let ingredient_ids: Vec<Uuid> = payload.items.iter().map(|l| l.ingredient_id).collect();
    if !ingredient_ids.is_empty() {
        let known = Ingredients::find()
            .filter(IngredientCol::Id.is_in(ingredient_ids.clone()))
            .count(&state.orm)
            .await?;
        if known as usize != ingredient_ids.len() {
            return Err(AppError::Validation("unknown ingredient in recipe".into()));
        }
    }

    let txn = state.orm.begin().await?;

    RecipeItems::delete_many()
        .filter(RecipeCol::ProductId.eq(id))
        .exec(&txn)
        .await?;

    let mut items = Vec::with_capacity(payload.items.len());
    for line in &payload.items {
        let row = RecipeActive {
            id: Set(Uuid::new_v4()),
            product_id: Set(id),
            ingredient_id: Set(line.ingredient_id),
            quantity: Set(line.quantity),
        }
        .insert(&txn)
        .await?;
        items.push(recipe_from_entity(row));
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.employee_id),
        "recipe_update",
        Some("recipe_items"),
        Some(serde_json::json!({ "product_id": id, "lines": items.len() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Recipe updated",
        RecipeList { items },
        Some(Meta::empty()),
    ))
}

fn recipe_from_entity(model: RecipeModel) -> RecipeItem {
    RecipeItem {
        id: model.id,
        product_id: model.product_id,
        ingredient_id: model.ingredient_id,
        quantity: model.quantity,
    }
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        category_id: model.category_id,
        name: model.name,
        description: model.description,
        price: model.price,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
