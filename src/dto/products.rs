use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Product, RecipeItem};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}

/// One line of a recipe replacement request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecipeLine {
    pub ingredient_id: Uuid,
    /// Consumption per ordered unit, in the ingredient's stock unit.
    pub quantity: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetRecipeRequest {
    pub items: Vec<RecipeLine>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecipeList {
    pub items: Vec<RecipeItem>,
}
