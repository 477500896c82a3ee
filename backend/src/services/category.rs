//! Product category service

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::Category;

use crate::error::{AppError, AppResult};

/// Category service
#[derive(Clone)]
pub struct CategoryService {
    db: PgPool,
}

/// Input for creating a category
#[derive(Debug, Deserialize)]
pub struct CreateCategoryInput {
    pub name: String,
    pub description: Option<String>,
}

/// Input for updating a category
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

type CategoryRow = (Uuid, String, Option<String>, bool, DateTime<Utc>);

fn category_from_row(row: CategoryRow) -> Category {
    Category {
        id: row.0,
        name: row.1,
        description: row.2,
        is_active: row.3,
        created_at: row.4,
    }
}

impl CategoryService {
    /// Create a new CategoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List active categories
    pub async fn list_active(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, description, is_active, created_at
            FROM categories
            WHERE is_active = TRUE
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(category_from_row).collect())
    }

    /// Get a category by ID
    pub async fn get(&self, category_id: Uuid) -> AppResult<Category> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description, is_active, created_at FROM categories WHERE id = $1",
        )
        .bind(category_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound {
            entity: "Category".to_string(),
            id: category_id.to_string(),
        })?;

        Ok(category_from_row(row))
    }

    /// Create a category
    pub async fn create(&self, input: CreateCategoryInput) -> AppResult<Category> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name cannot be empty".to_string(),
                message_es: "El nombre no puede estar vacío".to_string(),
            });
        }

        let name_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE LOWER(name) = LOWER($1))",
        )
        .bind(&input.name)
        .fetch_one(&self.db)
        .await?;

        if name_taken {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, is_active, created_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        let category = category_from_row(row);
        tracing::info!("Category created: {}", category.name);
        Ok(category)
    }

    /// Update a category
    pub async fn update(
        &self,
        category_id: Uuid,
        input: UpdateCategoryInput,
    ) -> AppResult<Category> {
        let existing = self.get(category_id).await?;

        if let Some(ref name) = input.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation {
                    field: "name".to_string(),
                    message: "Name cannot be empty".to_string(),
                    message_es: "El nombre no puede estar vacío".to_string(),
                });
            }
        }

        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            UPDATE categories
            SET name = $1, description = $2
            WHERE id = $3
            RETURNING id, name, description, is_active, created_at
            "#,
        )
        .bind(input.name.unwrap_or(existing.name))
        .bind(input.description.or(existing.description))
        .bind(category_id)
        .fetch_one(&self.db)
        .await?;

        Ok(category_from_row(row))
    }

    /// Deactivate a category (soft delete)
    pub async fn deactivate(&self, category_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("UPDATE categories SET is_active = FALSE WHERE id = $1")
            .bind(category_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound {
                entity: "Category".to_string(),
                id: category_id.to_string(),
            });
        }

        Ok(())
    }
}
