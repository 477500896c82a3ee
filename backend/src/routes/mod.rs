//! Route definitions for the Tienda POS backend

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (login/refresh public, rest protected)
        .nest("/auth", auth_routes())
        // Protected routes - catalog
        .nest("/categories", category_routes())
        .nest("/products", product_routes())
        // Protected routes - parties
        .nest("/customers", customer_routes())
        .nest("/suppliers", supplier_routes())
        // Protected routes - workflows
        .nest("/sales", sale_routes())
        .nest("/purchases", purchase_routes())
        .nest("/inventory", inventory_routes())
        // Protected routes - reporting
        .nest("/reports", report_routes())
}

/// Authentication routes
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        .merge(
            Router::new()
                .route("/me", get(handlers::me))
                .route("/users", post(handlers::create_user))
                .route_layer(middleware::from_fn(auth_middleware)),
        )
}

/// Category routes (protected)
fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/:category_id",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::deactivate_category),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Product routes (protected)
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route("/inactive", get(handlers::list_inactive_products))
        .route("/search", get(handlers::search_products))
        .route("/low-stock", get(handlers::low_stock_products))
        .route("/code/:code", get(handlers::get_product_by_code))
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::deactivate_product),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Customer routes (protected)
fn customer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_customers).post(handlers::create_customer),
        )
        .route("/document/:document_number", get(handlers::get_customer_by_document))
        .route(
            "/:customer_id",
            get(handlers::get_customer)
                .put(handlers::update_customer)
                .delete(handlers::deactivate_customer),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Supplier routes (protected)
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_suppliers).post(handlers::create_supplier),
        )
        .route(
            "/:supplier_id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::deactivate_supplier),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Sale routes (protected)
fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::register_sale))
        .route("/today", get(handlers::sales_of_day))
        .route("/statistics", get(handlers::sales_statistics))
        .route("/:sale_id", get(handlers::get_sale))
        .route("/:sale_id/annul", post(handlers::annul_sale))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Purchase routes (protected)
fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_purchases).post(handlers::register_purchase),
        )
        .route("/statistics", get(handlers::purchase_statistics))
        .route("/:purchase_id", get(handlers::get_purchase))
        .route("/:purchase_id/receive", post(handlers::receive_purchase))
        .route("/:purchase_id/cancel", post(handlers::cancel_purchase))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Inventory routes (protected)
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/adjust", post(handlers::adjust_inventory))
        .route("/movements", get(handlers::movement_history))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Reporting routes (protected)
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::dashboard_metrics))
        .route("/valuation", get(handlers::inventory_valuation))
        .route("/rotation", get(handlers::product_rotation))
        .route_layer(middleware::from_fn(auth_middleware))
}
