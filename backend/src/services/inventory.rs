//! Inventory service: the stock ledger and the movement log
//!
//! Product stock is only ever changed through a signed delta, and every delta
//! is mirrored by an append-only movement record written in the same
//! transaction. The helpers here are also used by the sale and purchase
//! workflows so that all stock writes go through one place.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::models::Movement;
use shared::types::{MovementCause, MovementDirection};

use crate::error::{AppError, AppResult};

/// Inventory service for stock adjustments and movement history
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Input for a manual stock adjustment
#[derive(Debug, Deserialize)]
pub struct AdjustInventoryInput {
    pub product_id: Uuid,
    pub new_stock: i32,
    pub reason: String,
    pub notes: Option<String>,
}

/// Filter for movement history queries
///
/// The filters are applied in priority order: date range, then direction,
/// then product; with no filter the most recent movements are returned.
#[derive(Debug, Default, Deserialize)]
pub struct MovementFilter {
    pub product_id: Option<Uuid>,
    pub direction: Option<MovementDirection>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<i64>,
}

/// Movement row with product and user display fields
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MovementWithDetails {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_code: String,
    pub product_name: String,
    pub direction: String,
    pub quantity: i32,
    pub cause: String,
    pub reason: Option<String>,
    pub reference_id: Option<Uuid>,
    pub stock_before: i32,
    pub stock_after: i32,
    pub user_id: Uuid,
    pub user_name: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A movement to be appended inside an open transaction
pub(crate) struct NewMovement<'a> {
    pub product_id: Uuid,
    pub direction: MovementDirection,
    pub quantity: i32,
    pub cause: MovementCause,
    pub reason: Option<&'a str>,
    pub reference_id: Option<Uuid>,
    pub stock_before: i32,
    pub stock_after: i32,
    pub user_id: Uuid,
    pub notes: Option<&'a str>,
}

/// Apply a signed stock delta inside an open transaction
///
/// The conditional update refuses to drive stock negative, which closes the
/// window between the caller's availability check and the write. Returns
/// `(stock_before, stock_after)`, or `None` when the guard rejected the delta
/// or the product does not exist (callers validate existence up front).
pub(crate) async fn adjust_stock(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    delta: i32,
) -> AppResult<Option<(i32, i32)>> {
    let stock_after = sqlx::query_scalar::<_, i32>(
        r#"
        UPDATE products
        SET current_stock = current_stock + $1, updated_at = NOW()
        WHERE id = $2 AND current_stock + $1 >= 0
        RETURNING current_stock
        "#,
    )
    .bind(delta)
    .bind(product_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(stock_after.map(|after| (after - delta, after)))
}

/// Append a movement record inside an open transaction
///
/// Pure insert: no business logic, succeeds or aborts with the enclosing
/// transaction.
pub(crate) async fn record_movement(
    tx: &mut Transaction<'_, Postgres>,
    movement: NewMovement<'_>,
) -> AppResult<Movement> {
    let (id, created_at) = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
        r#"
        INSERT INTO inventory_movements
            (product_id, direction, quantity, cause, reason, reference_id,
             stock_before, stock_after, user_id, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id, created_at
        "#,
    )
    .bind(movement.product_id)
    .bind(movement.direction.as_str())
    .bind(movement.quantity)
    .bind(movement.cause.as_str())
    .bind(movement.reason)
    .bind(movement.reference_id)
    .bind(movement.stock_before)
    .bind(movement.stock_after)
    .bind(movement.user_id)
    .bind(movement.notes)
    .fetch_one(&mut **tx)
    .await?;

    Ok(Movement {
        id,
        product_id: movement.product_id,
        direction: movement.direction,
        quantity: movement.quantity,
        cause: movement.cause,
        reason: movement.reason.map(String::from),
        reference_id: movement.reference_id,
        stock_before: movement.stock_before,
        stock_after: movement.stock_after,
        user_id: movement.user_id,
        notes: movement.notes.map(String::from),
        created_at,
    })
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Manually adjust a product's stock to an absolute value
    ///
    /// Computes the equivalent signed delta and records an `adjustment`
    /// movement with both snapshots; stock write and movement append share
    /// one transaction.
    pub async fn adjust_inventory(
        &self,
        user_id: Uuid,
        input: AdjustInventoryInput,
    ) -> AppResult<Movement> {
        let product = sqlx::query_as::<_, (String, i32)>(
            "SELECT name, current_stock FROM products WHERE id = $1",
        )
        .bind(input.product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound {
            entity: "Product".to_string(),
            id: input.product_id.to_string(),
        })?;

        if input.new_stock < 0 {
            return Err(AppError::Validation {
                field: "new_stock".to_string(),
                message: "Stock cannot be negative".to_string(),
                message_es: "El stock no puede ser negativo".to_string(),
            });
        }

        let (name, stock_before) = product;
        let delta = input.new_stock - stock_before;

        let mut tx = self.db.begin().await?;

        sqlx::query("UPDATE products SET current_stock = $1, updated_at = NOW() WHERE id = $2")
            .bind(input.new_stock)
            .bind(input.product_id)
            .execute(&mut *tx)
            .await?;

        let movement = record_movement(
            &mut tx,
            NewMovement {
                product_id: input.product_id,
                direction: MovementDirection::Adjustment,
                quantity: delta.abs(),
                cause: MovementCause::Manual,
                reason: Some(&input.reason),
                reference_id: None,
                stock_before,
                stock_after: input.new_stock,
                user_id,
                notes: input.notes.as_deref(),
            },
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Inventory adjusted: product '{}', stock {} -> {} ({})",
            name,
            stock_before,
            input.new_stock,
            input.reason
        );

        Ok(movement)
    }

    /// Movement history, filtered like the register screens expect
    pub async fn movement_history(
        &self,
        filter: MovementFilter,
    ) -> AppResult<Vec<MovementWithDetails>> {
        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
            return self.movements_by_date_range(start, end).await;
        }
        if let Some(direction) = filter.direction {
            return self.movements_by_direction(direction).await;
        }
        if let Some(product_id) = filter.product_id {
            return self.movements_by_product(product_id).await;
        }
        self.recent_movements(filter.limit.unwrap_or(50)).await
    }

    /// Movements of a single product, newest first
    pub async fn movements_by_product(
        &self,
        product_id: Uuid,
    ) -> AppResult<Vec<MovementWithDetails>> {
        let movements = sqlx::query_as::<_, MovementWithDetails>(
            r#"
            SELECT m.id, m.product_id, p.code AS product_code, p.name AS product_name,
                   m.direction, m.quantity, m.cause, m.reason, m.reference_id,
                   m.stock_before, m.stock_after, m.user_id,
                   u.full_name AS user_name, m.notes, m.created_at
            FROM inventory_movements m
            INNER JOIN products p ON p.id = m.product_id
            INNER JOIN users u ON u.id = m.user_id
            WHERE m.product_id = $1
            ORDER BY m.created_at DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }

    /// Movements of one direction (`in`, `out`, `adjustment`), newest first
    pub async fn movements_by_direction(
        &self,
        direction: MovementDirection,
    ) -> AppResult<Vec<MovementWithDetails>> {
        let movements = sqlx::query_as::<_, MovementWithDetails>(
            r#"
            SELECT m.id, m.product_id, p.code AS product_code, p.name AS product_name,
                   m.direction, m.quantity, m.cause, m.reason, m.reference_id,
                   m.stock_before, m.stock_after, m.user_id,
                   u.full_name AS user_name, m.notes, m.created_at
            FROM inventory_movements m
            INNER JOIN products p ON p.id = m.product_id
            INNER JOIN users u ON u.id = m.user_id
            WHERE m.direction = $1
            ORDER BY m.created_at DESC
            "#,
        )
        .bind(direction.as_str())
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }

    /// Movements whose timestamp falls inside a date range, newest first
    pub async fn movements_by_date_range(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<Vec<MovementWithDetails>> {
        let movements = sqlx::query_as::<_, MovementWithDetails>(
            r#"
            SELECT m.id, m.product_id, p.code AS product_code, p.name AS product_name,
                   m.direction, m.quantity, m.cause, m.reason, m.reference_id,
                   m.stock_before, m.stock_after, m.user_id,
                   u.full_name AS user_name, m.notes, m.created_at
            FROM inventory_movements m
            INNER JOIN products p ON p.id = m.product_id
            INNER JOIN users u ON u.id = m.user_id
            WHERE m.created_at::date BETWEEN $1 AND $2
            ORDER BY m.created_at DESC
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }

    /// The N most recent movements
    pub async fn recent_movements(&self, limit: i64) -> AppResult<Vec<MovementWithDetails>> {
        let movements = sqlx::query_as::<_, MovementWithDetails>(
            r#"
            SELECT m.id, m.product_id, p.code AS product_code, p.name AS product_name,
                   m.direction, m.quantity, m.cause, m.reason, m.reference_id,
                   m.stock_before, m.stock_after, m.user_id,
                   u.full_name AS user_name, m.notes, m.created_at
            FROM inventory_movements m
            INNER JOIN products p ON p.id = m.product_id
            INNER JOIN users u ON u.id = m.user_id
            ORDER BY m.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit.clamp(1, 500))
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }
}
