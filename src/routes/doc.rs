use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
        ingredients::{CreateIngredientRequest, IngredientList, UpdateIngredientRequest},
        inventory::{StockMovementRequest, StockMovementResponse, TransactionList},
        orders::{
            AddItemRequest, AdvanceStatusRequest, CancelOrderRequest, OpenOrderRequest,
            OrderList, OrderWithItems,
        },
        payments::{CapturePaymentRequest, PaymentWithOrder},
        products::{
            CreateProductRequest, ProductList, RecipeLine, RecipeList, SetRecipeRequest,
            UpdateProductRequest,
        },
        reports::{
            InventoryReport, LowStockIngredient, ProductSales, RevenuePoint, RevenueSeries,
            SalesReport,
        },
        shop::UpdateShopRequest,
        tables::{
            AreaList, CreateAreaRequest, CreateReservationRequest, CreateTableRequest,
            ReservationList, TableList, UpdateTableRequest,
        },
    },
    models::{
        Area, Category, DiningTable, Employee, Ingredient, InventoryTransaction, Order,
        OrderItem, OrderStatus, OrderType, Payment, PaymentMethod, Product, RecipeItem,
        Reservation, ReservationStatus, Shop, TableStatus, TransactionType,
    },
    response::{ApiResponse, Meta},
    routes::{
        auth, categories, health, ingredients, inventory, orders, params, payments, products,
        reports, shop, tables,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        shop::get_shop,
        shop::update_shop,
        categories::list_categories,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::get_recipe,
        products::set_recipe,
        ingredients::list_ingredients,
        ingredients::list_low_stock,
        ingredients::get_ingredient,
        ingredients::create_ingredient,
        ingredients::update_ingredient,
        inventory::record_movement,
        inventory::list_transactions,
        tables::list_areas,
        tables::create_area,
        tables::list_tables,
        tables::create_table,
        tables::update_table,
        tables::list_reservations,
        tables::create_reservation,
        tables::seat_reservation,
        tables::cancel_reservation,
        orders::open_order,
        orders::list_orders,
        orders::get_order,
        orders::add_item,
        orders::remove_item,
        orders::advance_status,
        orders::cancel_order,
        payments::capture_payment,
        payments::get_order_payment,
        payments::get_payment,
        reports::revenue,
        reports::sales,
        reports::inventory
    ),
    components(
        schemas(
            Shop,
            Employee,
            Category,
            Product,
            RecipeItem,
            Ingredient,
            InventoryTransaction,
            Area,
            DiningTable,
            Reservation,
            Order,
            OrderItem,
            Payment,
            OrderStatus,
            OrderType,
            PaymentMethod,
            TransactionType,
            TableStatus,
            ReservationStatus,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateShopRequest,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CategoryList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            RecipeLine,
            SetRecipeRequest,
            RecipeList,
            CreateIngredientRequest,
            UpdateIngredientRequest,
            IngredientList,
            StockMovementRequest,
            StockMovementResponse,
            TransactionList,
            CreateAreaRequest,
            AreaList,
            CreateTableRequest,
            UpdateTableRequest,
            TableList,
            CreateReservationRequest,
            ReservationList,
            OpenOrderRequest,
            AddItemRequest,
            AdvanceStatusRequest,
            CancelOrderRequest,
            OrderWithItems,
            OrderList,
            CapturePaymentRequest,
            PaymentWithOrder,
            RevenuePoint,
            RevenueSeries,
            ProductSales,
            SalesReport,
            LowStockIngredient,
            InventoryReport,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            params::IngredientQuery,
            params::LedgerQuery,
            params::ReservationQuery,
            Meta,
            ApiResponse<Shop>,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<PaymentWithOrder>,
            ApiResponse<IngredientList>,
            ApiResponse<TransactionList>,
            ApiResponse<RevenueSeries>,
            ApiResponse<InventoryReport>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Employee authentication"),
        (name = "Shop", description = "Shop settings"),
        (name = "Catalog", description = "Categories, products and recipes"),
        (name = "Inventory", description = "Ingredients and the stock ledger"),
        (name = "Floor", description = "Areas, tables and reservations"),
        (name = "Orders", description = "Order lifecycle"),
        (name = "Payments", description = "Payment capture and receipts"),
        (name = "Reports", description = "Revenue, sales and inventory reports"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
