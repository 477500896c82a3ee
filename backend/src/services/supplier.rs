//! Supplier service

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use shared::models::Supplier;

use crate::error::{AppError, AppResult};

/// Supplier service
#[derive(Clone)]
pub struct SupplierService {
    db: PgPool,
}

/// Input for creating a supplier
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSupplierInput {
    /// RUC (11 digits)
    #[validate(length(min = 11, max = 11, message = "RUC must have 11 characters"))]
    pub tax_id: String,
    #[validate(length(min = 1, message = "Business name cannot be empty"))]
    pub business_name: String,
    pub contact_name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Input for updating a supplier
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSupplierInput {
    pub business_name: Option<String>,
    pub contact_name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

type SupplierRow = (
    Uuid,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    bool,
    DateTime<Utc>,
);

const SUPPLIER_COLUMNS: &str =
    "id, tax_id, business_name, contact_name, email, phone, address, is_active, created_at";

fn supplier_from_row(row: SupplierRow) -> Supplier {
    Supplier {
        id: row.0,
        tax_id: row.1,
        business_name: row.2,
        contact_name: row.3,
        email: row.4,
        phone: row.5,
        address: row.6,
        is_active: row.7,
        created_at: row.8,
    }
}

impl SupplierService {
    /// Create a new SupplierService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List active suppliers
    pub async fn list_active(&self) -> AppResult<Vec<Supplier>> {
        let rows = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {} FROM suppliers WHERE is_active = TRUE ORDER BY business_name",
            SUPPLIER_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(supplier_from_row).collect())
    }

    /// Get a supplier by ID
    pub async fn get(&self, supplier_id: Uuid) -> AppResult<Supplier> {
        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {} FROM suppliers WHERE id = $1",
            SUPPLIER_COLUMNS
        ))
        .bind(supplier_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound {
            entity: "Supplier".to_string(),
            id: supplier_id.to_string(),
        })?;

        Ok(supplier_from_row(row))
    }

    /// Create a supplier
    pub async fn create(&self, input: CreateSupplierInput) -> AppResult<Supplier> {
        input.validate()?;

        let tax_id_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM suppliers WHERE tax_id = $1)",
        )
        .bind(&input.tax_id)
        .fetch_one(&self.db)
        .await?;

        if tax_id_taken {
            return Err(AppError::DuplicateEntry("tax_id".to_string()));
        }

        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            r#"
            INSERT INTO suppliers (tax_id, business_name, contact_name, email, phone, address)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            SUPPLIER_COLUMNS
        ))
        .bind(&input.tax_id)
        .bind(&input.business_name)
        .bind(&input.contact_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .fetch_one(&self.db)
        .await?;

        let supplier = supplier_from_row(row);
        tracing::info!("Supplier created: {}", supplier.business_name);
        Ok(supplier)
    }

    /// Update a supplier
    pub async fn update(
        &self,
        supplier_id: Uuid,
        input: UpdateSupplierInput,
    ) -> AppResult<Supplier> {
        input.validate()?;

        let existing = self.get(supplier_id).await?;

        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            r#"
            UPDATE suppliers
            SET business_name = $1, contact_name = $2, email = $3, phone = $4, address = $5
            WHERE id = $6
            RETURNING {}
            "#,
            SUPPLIER_COLUMNS
        ))
        .bind(input.business_name.unwrap_or(existing.business_name))
        .bind(input.contact_name.or(existing.contact_name))
        .bind(input.email.or(existing.email))
        .bind(input.phone.or(existing.phone))
        .bind(input.address.or(existing.address))
        .bind(supplier_id)
        .fetch_one(&self.db)
        .await?;

        Ok(supplier_from_row(row))
    }

    /// Deactivate a supplier (soft delete)
    pub async fn deactivate(&self, supplier_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("UPDATE suppliers SET is_active = FALSE WHERE id = $1")
            .bind(supplier_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound {
                entity: "Supplier".to_string(),
                id: supplier_id.to_string(),
            });
        }

        Ok(())
    }
}
