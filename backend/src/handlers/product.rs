//! HTTP handlers for product catalog endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use shared::models::Product;

use crate::error::AppResult;
use crate::services::product::{CreateProductInput, ProductWithCategory, UpdateProductInput};
use crate::services::ProductService;
use crate::AppState;

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

/// List active products
pub async fn list_products(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProductWithCategory>>> {
    let service = ProductService::new(state.db);
    let products = service.list_active().await?;
    Ok(Json(products))
}

/// List deactivated products
pub async fn list_inactive_products(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProductWithCategory>>> {
    let service = ProductService::new(state.db);
    let products = service.list_inactive().await?;
    Ok(Json(products))
}

/// Search products by code or name
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<ProductWithCategory>>> {
    let service = ProductService::new(state.db);
    let products = service.search(&query.q).await?;
    Ok(Json(products))
}

/// Products at or below their minimum stock threshold
pub async fn low_stock_products(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProductWithCategory>>> {
    let service = ProductService::new(state.db);
    let products = service.low_stock().await?;
    Ok(Json(products))
}

/// Get a product by ID
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.get(product_id).await?;
    Ok(Json(product))
}

/// Get a product by code
pub async fn get_product_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.get_by_code(&code).await?;
    Ok(Json(product))
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.create(input).await?;
    Ok(Json(product))
}

/// Update a product
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.update(product_id, input).await?;
    Ok(Json(product))
}

/// Deactivate a product
pub async fn deactivate_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = ProductService::new(state.db);
    service.deactivate(product_id).await?;
    Ok(Json(()))
}
