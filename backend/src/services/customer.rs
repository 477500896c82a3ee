//! Customer service

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use shared::models::Customer;

use crate::error::{AppError, AppResult};

/// Customer service
#[derive(Clone)]
pub struct CustomerService {
    db: PgPool,
}

/// Input for creating a customer
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerInput {
    /// DNI (8 digits) or RUC (11 digits)
    #[validate(length(min = 8, max = 11, message = "Document number must have 8 to 11 characters"))]
    pub document_number: String,
    #[validate(length(min = 1, message = "First name cannot be empty"))]
    pub first_name: String,
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Input for updating a customer
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCustomerInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

type CustomerRow = (
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

const CUSTOMER_COLUMNS: &str =
    "id, document_number, first_name, last_name, email, phone, address, is_active, created_at";

fn customer_from_row(row: CustomerRow) -> Customer {
    Customer {
        id: row.0,
        document_number: row.1,
        first_name: row.2,
        last_name: row.3,
        email: row.4,
        phone: row.5,
        address: row.6,
        is_active: row.7,
        created_at: row.8,
    }
}

impl CustomerService {
    /// Create a new CustomerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List active customers
    pub async fn list_active(&self) -> AppResult<Vec<Customer>> {
        let rows = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {} FROM customers WHERE is_active = TRUE ORDER BY first_name, last_name",
            CUSTOMER_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(customer_from_row).collect())
    }

    /// Get a customer by ID
    pub async fn get(&self, customer_id: Uuid) -> AppResult<Customer> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {} FROM customers WHERE id = $1",
            CUSTOMER_COLUMNS
        ))
        .bind(customer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound {
            entity: "Customer".to_string(),
            id: customer_id.to_string(),
        })?;

        Ok(customer_from_row(row))
    }

    /// Find a customer by document number
    pub async fn find_by_document(&self, document_number: &str) -> AppResult<Customer> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {} FROM customers WHERE document_number = $1",
            CUSTOMER_COLUMNS
        ))
        .bind(document_number)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound {
            entity: "Customer".to_string(),
            id: document_number.to_string(),
        })?;

        Ok(customer_from_row(row))
    }

    /// Create a customer
    pub async fn create(&self, input: CreateCustomerInput) -> AppResult<Customer> {
        input.validate()?;

        let document_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM customers WHERE document_number = $1)",
        )
        .bind(&input.document_number)
        .fetch_one(&self.db)
        .await?;

        if document_taken {
            return Err(AppError::DuplicateEntry("document_number".to_string()));
        }

        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            r#"
            INSERT INTO customers (document_number, first_name, last_name, email, phone, address)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            CUSTOMER_COLUMNS
        ))
        .bind(&input.document_number)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .fetch_one(&self.db)
        .await?;

        let customer = customer_from_row(row);
        tracing::info!("Customer created: {}", customer.full_name());
        Ok(customer)
    }

    /// Update a customer
    pub async fn update(
        &self,
        customer_id: Uuid,
        input: UpdateCustomerInput,
    ) -> AppResult<Customer> {
        input.validate()?;

        let existing = self.get(customer_id).await?;

        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            r#"
            UPDATE customers
            SET first_name = $1, last_name = $2, email = $3, phone = $4, address = $5
            WHERE id = $6
            RETURNING {}
            "#,
            CUSTOMER_COLUMNS
        ))
        .bind(input.first_name.unwrap_or(existing.first_name))
        .bind(input.last_name.or(existing.last_name))
        .bind(input.email.or(existing.email))
        .bind(input.phone.or(existing.phone))
        .bind(input.address.or(existing.address))
        .bind(customer_id)
        .fetch_one(&self.db)
        .await?;

        Ok(customer_from_row(row))
    }

    /// Deactivate a customer (soft delete)
    pub async fn deactivate(&self, customer_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("UPDATE customers SET is_active = FALSE WHERE id = $1")
            .bind(customer_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound {
                entity: "Customer".to_string(),
                id: customer_id.to_string(),
            });
        }

        Ok(())
    }
}
