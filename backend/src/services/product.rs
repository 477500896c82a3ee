//! Product catalog service
//!
//! Stock is never written here: sales, purchase receipts, and manual
//! adjustments own stock mutation. This service manages the catalog itself.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::models::Product;
use shared::validation::{validate_price_coherence, validate_product_code, validate_search_term};

use crate::error::{AppError, AppResult};

/// Product service for catalog management
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Input for creating a product
///
/// One canonical name per attribute; unknown fields are rejected rather than
/// aliased.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateProductInput {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    #[serde(default)]
    pub initial_stock: i32,
    #[serde(default)]
    pub minimum_stock: i32,
    pub unit: String,
}

/// Input for updating a product
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProductInput {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub purchase_price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub minimum_stock: Option<i32>,
    pub unit: Option<String>,
}

/// Product row with its category name, for listings
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductWithCategory {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub category_name: String,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub current_stock: i32,
    pub minimum_stock: i32,
    pub unit: String,
    pub is_active: bool,
}

/// Full product row as stored
type ProductRow = (
    Uuid,
    String,
    String,
    Option<String>,
    Uuid,
    Decimal,
    Decimal,
    i32,
    i32,
    String,
    bool,
    DateTime<Utc>,
    DateTime<Utc>,
);

const PRODUCT_COLUMNS: &str = "id, code, name, description, category_id, purchase_price, \
     sale_price, current_stock, minimum_stock, unit, is_active, created_at, updated_at";

fn product_from_row(row: ProductRow) -> Product {
    Product {
        id: row.0,
        code: row.1,
        name: row.2,
        description: row.3,
        category_id: row.4,
        purchase_price: row.5,
        sale_price: row.6,
        current_stock: row.7,
        minimum_stock: row.8,
        unit: row.9,
        is_active: row.10,
        created_at: row.11,
        updated_at: row.12,
    }
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List active products with their category
    pub async fn list_active(&self) -> AppResult<Vec<ProductWithCategory>> {
        let products = sqlx::query_as::<_, ProductWithCategory>(
            r#"
            SELECT p.id, p.code, p.name, p.description, p.category_id,
                   c.name AS category_name, p.purchase_price, p.sale_price,
                   p.current_stock, p.minimum_stock, p.unit, p.is_active
            FROM products p
            INNER JOIN categories c ON c.id = p.category_id
            WHERE p.is_active = TRUE
            ORDER BY p.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }

    /// List deactivated products with their category
    pub async fn list_inactive(&self) -> AppResult<Vec<ProductWithCategory>> {
        let products = sqlx::query_as::<_, ProductWithCategory>(
            r#"
            SELECT p.id, p.code, p.name, p.description, p.category_id,
                   c.name AS category_name, p.purchase_price, p.sale_price,
                   p.current_stock, p.minimum_stock, p.unit, p.is_active
            FROM products p
            INNER JOIN categories c ON c.id = p.category_id
            WHERE p.is_active = FALSE
            ORDER BY p.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }

    /// Get a product by ID
    pub async fn get(&self, product_id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound {
            entity: "Product".to_string(),
            id: product_id.to_string(),
        })?;

        Ok(product_from_row(row))
    }

    /// Get a product by its code
    pub async fn get_by_code(&self, code: &str) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE code = $1",
            PRODUCT_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound {
            entity: "Product".to_string(),
            id: code.to_string(),
        })?;

        Ok(product_from_row(row))
    }

    /// Search active products by code or name
    pub async fn search(&self, term: &str) -> AppResult<Vec<ProductWithCategory>> {
        validate_search_term(term).map_err(|e| AppError::Validation {
            field: "q".to_string(),
            message: e.to_string(),
            message_es: "El término de búsqueda debe tener al menos 2 caracteres".to_string(),
        })?;

        let pattern = format!("%{}%", term.trim());

        let products = sqlx::query_as::<_, ProductWithCategory>(
            r#"
            SELECT p.id, p.code, p.name, p.description, p.category_id,
                   c.name AS category_name, p.purchase_price, p.sale_price,
                   p.current_stock, p.minimum_stock, p.unit, p.is_active
            FROM products p
            INNER JOIN categories c ON c.id = p.category_id
            WHERE p.is_active = TRUE AND (p.code ILIKE $1 OR p.name ILIKE $1)
            ORDER BY p.name
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }

    /// Create a product
    pub async fn create(&self, input: CreateProductInput) -> AppResult<Product> {
        validate_product_code(&input.code).map_err(|e| AppError::Validation {
            field: "code".to_string(),
            message: e.to_string(),
            message_es: "Código de producto inválido".to_string(),
        })?;

        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name cannot be empty".to_string(),
                message_es: "El nombre no puede estar vacío".to_string(),
            });
        }

        validate_price_coherence(input.purchase_price, input.sale_price).map_err(|e| {
            AppError::Validation {
                field: "sale_price".to_string(),
                message: e.to_string(),
                message_es: "El precio de venta no puede ser menor al precio de compra"
                    .to_string(),
            }
        })?;

        if input.initial_stock < 0 || input.minimum_stock < 0 {
            return Err(AppError::Validation {
                field: "initial_stock".to_string(),
                message: "Stock cannot be negative".to_string(),
                message_es: "El stock no puede ser negativo".to_string(),
            });
        }

        // Code must be unique
        let code_taken =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE code = $1)")
                .bind(&input.code)
                .fetch_one(&self.db)
                .await?;

        if code_taken {
            return Err(AppError::DuplicateEntry("code".to_string()));
        }

        // Category must exist
        let category_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)",
        )
        .bind(input.category_id)
        .fetch_one(&self.db)
        .await?;

        if !category_exists {
            return Err(AppError::Validation {
                field: "category_id".to_string(),
                message: "Category does not exist".to_string(),
                message_es: "La categoría especificada no existe".to_string(),
            });
        }

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products
                (code, name, description, category_id, purchase_price, sale_price,
                 current_stock, minimum_stock, unit)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(&input.code)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.category_id)
        .bind(input.purchase_price)
        .bind(input.sale_price)
        .bind(input.initial_stock)
        .bind(input.minimum_stock)
        .bind(&input.unit)
        .fetch_one(&self.db)
        .await?;

        let product = product_from_row(row);
        tracing::info!("Product created: {} ({})", product.name, product.code);
        Ok(product)
    }

    /// Update a product
    pub async fn update(&self, product_id: Uuid, input: UpdateProductInput) -> AppResult<Product> {
        let existing = self.get(product_id).await?;

        // If the code changes it must stay unique
        if let Some(ref code) = input.code {
            validate_product_code(code).map_err(|e| AppError::Validation {
                field: "code".to_string(),
                message: e.to_string(),
                message_es: "Código de producto inválido".to_string(),
            })?;

            if *code != existing.code {
                let code_taken = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM products WHERE code = $1)",
                )
                .bind(code)
                .fetch_one(&self.db)
                .await?;

                if code_taken {
                    return Err(AppError::DuplicateEntry("code".to_string()));
                }
            }
        }

        let purchase_price = input.purchase_price.unwrap_or(existing.purchase_price);
        let sale_price = input.sale_price.unwrap_or(existing.sale_price);

        validate_price_coherence(purchase_price, sale_price).map_err(|e| {
            AppError::Validation {
                field: "sale_price".to_string(),
                message: e.to_string(),
                message_es: "El precio de venta no puede ser menor al precio de compra"
                    .to_string(),
            }
        })?;

        if let Some(minimum) = input.minimum_stock {
            if minimum < 0 {
                return Err(AppError::Validation {
                    field: "minimum_stock".to_string(),
                    message: "Minimum stock cannot be negative".to_string(),
                    message_es: "El stock mínimo no puede ser negativo".to_string(),
                });
            }
        }

        // Category must exist when changed
        if let Some(category_id) = input.category_id {
            let category_exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)",
            )
            .bind(category_id)
            .fetch_one(&self.db)
            .await?;

            if !category_exists {
                return Err(AppError::Validation {
                    field: "category_id".to_string(),
                    message: "Category does not exist".to_string(),
                    message_es: "La categoría especificada no existe".to_string(),
                });
            }
        }

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products
            SET code = $1, name = $2, description = $3, category_id = $4,
                purchase_price = $5, sale_price = $6, minimum_stock = $7, unit = $8,
                updated_at = NOW()
            WHERE id = $9
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(input.code.unwrap_or(existing.code))
        .bind(input.name.unwrap_or(existing.name))
        .bind(input.description.or(existing.description))
        .bind(input.category_id.unwrap_or(existing.category_id))
        .bind(purchase_price)
        .bind(sale_price)
        .bind(input.minimum_stock.unwrap_or(existing.minimum_stock))
        .bind(input.unit.unwrap_or(existing.unit))
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        Ok(product_from_row(row))
    }

    /// Deactivate a product (soft delete)
    pub async fn deactivate(&self, product_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE products SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(product_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound {
                entity: "Product".to_string(),
                id: product_id.to_string(),
            });
        }

        tracing::info!("Product deactivated: {}", product_id);
        Ok(())
    }

    /// Active products at or below their minimum stock threshold
    pub async fn low_stock(&self) -> AppResult<Vec<ProductWithCategory>> {
        let products = sqlx::query_as::<_, ProductWithCategory>(
            r#"
            SELECT p.id, p.code, p.name, p.description, p.category_id,
                   c.name AS category_name, p.purchase_price, p.sale_price,
                   p.current_stock, p.minimum_stock, p.unit, p.is_active
            FROM products p
            INNER JOIN categories c ON c.id = p.category_id
            WHERE p.is_active = TRUE AND p.current_stock <= p.minimum_stock
            ORDER BY p.current_stock, p.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }
}
