//! Purchase workflows: registration, receipt, cancellation, and queries
//!
//! Registering a purchase only creates the header and lines in `pendiente`;
//! inventory is untouched until the goods are explicitly received. Receipt
//! increments stock and logs one `in` movement per line in a single
//! transaction. Only pending purchases can be received or cancelled.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::draft::{order_totals, DraftLine};
use shared::models::{Purchase, PurchaseSummary};
use shared::numbering::{next_order_number, PURCHASE_PREFIX, PURCHASE_SEQUENCE_WIDTH};
use shared::types::{MovementCause, MovementDirection, PurchaseStatus};
use shared::validation::validate_order_lines;

use crate::error::{AppError, AppResult};
use crate::services::inventory::{adjust_stock, record_movement, NewMovement};

/// Purchase service for supplier orders and goods receipt
#[derive(Clone)]
pub struct PurchaseService {
    db: PgPool,
}

/// One line of a purchase submission
#[derive(Debug, Deserialize)]
pub struct PurchaseLineInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Input for registering a purchase
#[derive(Debug, Deserialize)]
pub struct RegisterPurchaseInput {
    pub supplier_id: Uuid,
    pub lines: Vec<PurchaseLineInput>,
    pub purchase_date: Option<NaiveDate>,
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,
    pub notes: Option<String>,
}

/// IGV default rate
fn default_tax_rate() -> Decimal {
    Decimal::new(18, 2)
}

/// Input for receiving a purchase
#[derive(Debug, Default, Deserialize)]
pub struct ReceivePurchaseInput {
    pub received_date: Option<NaiveDate>,
}

/// Purchase row with supplier and user display fields
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PurchaseListRow {
    pub id: Uuid,
    pub number: String,
    pub supplier_name: String,
    pub registered_by: String,
    pub purchase_date: NaiveDate,
    pub status: String,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub received_date: Option<NaiveDate>,
}

/// Purchase line with product display fields
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PurchaseLineDetail {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_code: String,
    pub product_name: String,
    pub unit: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// A purchase with all its lines
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseWithLines {
    #[serde(flatten)]
    pub purchase: Purchase,
    pub lines: Vec<PurchaseLineDetail>,
}

/// Purchase statistics over a period
#[derive(Debug, Clone, Serialize)]
pub struct PurchasePeriodStats {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_purchases: i64,
    pub received: i64,
    pub pending: i64,
    pub cancelled: i64,
    pub total_spent: Decimal,
    pub average_per_purchase: Decimal,
}

/// Full purchase row as stored
type PurchaseRow = (
    Uuid,
    String,
    Uuid,
    Uuid,
    NaiveDate,
    String,
    Decimal,
    Decimal,
    Decimal,
    Option<NaiveDate>,
    Option<String>,
    DateTime<Utc>,
);

fn purchase_from_row(row: PurchaseRow) -> AppResult<Purchase> {
    let status = PurchaseStatus::from_str(&row.5).ok_or_else(|| {
        AppError::Internal(format!("unexpected purchase status '{}' in database", row.5))
    })?;

    Ok(Purchase {
        id: row.0,
        number: row.1,
        supplier_id: row.2,
        user_id: row.3,
        purchase_date: row.4,
        status,
        subtotal: row.6,
        tax: row.7,
        total: row.8,
        received_date: row.9,
        notes: row.10,
        created_at: row.11,
    })
}

/// Generate the next purchase number within a year (`COM-YYYY-NNN`)
async fn next_purchase_number(
    tx: &mut Transaction<'_, Postgres>,
    year: i32,
) -> AppResult<String> {
    // Longest number first, then lexicographic, so COM-2024-1000 outranks
    // COM-2024-999 once the pad width overflows
    let last = sqlx::query_scalar::<_, String>(
        "SELECT number FROM purchases WHERE number LIKE $1 ORDER BY LENGTH(number) DESC, number DESC LIMIT 1",
    )
    .bind(format!("{}-{}-%", PURCHASE_PREFIX, year))
    .fetch_optional(&mut **tx)
    .await?;

    Ok(next_order_number(
        PURCHASE_PREFIX,
        year,
        PURCHASE_SEQUENCE_WIDTH,
        last.as_deref(),
    ))
}

impl PurchaseService {
    /// Create a new PurchaseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Register a purchase in `pendiente`; stock is not touched here
    pub async fn register_purchase(
        &self,
        user_id: Uuid,
        input: RegisterPurchaseInput,
    ) -> AppResult<PurchaseSummary> {
        // Validate supplier
        let supplier_name = sqlx::query_scalar::<_, String>(
            "SELECT business_name FROM suppliers WHERE id = $1",
        )
        .bind(input.supplier_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound {
            entity: "Supplier".to_string(),
            id: input.supplier_id.to_string(),
        })?;

        if input.tax_rate < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "tax_rate".to_string(),
                message: "Tax rate cannot be negative".to_string(),
                message_es: "El impuesto no puede ser negativo".to_string(),
            });
        }

        // Validate lines; purchases carry no discounts
        let lines: Vec<DraftLine> = input
            .lines
            .iter()
            .map(|l| DraftLine {
                product_id: l.product_id,
                quantity: l.quantity,
                unit_price: l.unit_price,
                discount: Decimal::ZERO,
            })
            .collect();

        validate_order_lines(&lines).map_err(|e| AppError::Validation {
            field: "lines".to_string(),
            message: e.to_string(),
            message_es: format!("Detalle de compra inválido: {}", e),
        })?;

        // Every product must exist before the header is written
        for line in &lines {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)",
            )
            .bind(line.product_id)
            .fetch_one(&self.db)
            .await?;

            if !exists {
                return Err(AppError::NotFound {
                    entity: "Product".to_string(),
                    id: line.product_id.to_string(),
                });
            }
        }

        let totals = order_totals(&lines, Decimal::ZERO, input.tax_rate);
        let stored = totals.rounded();

        let purchase_date = input.purchase_date.unwrap_or_else(|| Utc::now().date_naive());

        let mut tx = self.db.begin().await?;

        let number = next_purchase_number(&mut tx, purchase_date.year()).await?;

        let purchase_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO purchases
                (number, supplier_id, user_id, purchase_date, status, subtotal, tax, total, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&number)
        .bind(input.supplier_id)
        .bind(user_id)
        .bind(purchase_date)
        .bind(PurchaseStatus::Pendiente.as_str())
        .bind(stored.subtotal)
        .bind(stored.tax)
        .bind(stored.total)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        for line in &lines {
            sqlx::query(
                r#"
                INSERT INTO purchase_lines (purchase_id, product_id, quantity, unit_price, subtotal)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(purchase_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.subtotal().round_dp(2))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            "Purchase registered: {}, supplier: {}, total: {}",
            number,
            supplier_name,
            stored.total
        );

        Ok(PurchaseSummary {
            purchase_id,
            number,
            supplier: supplier_name,
            purchase_date,
            subtotal: stored.subtotal,
            tax: stored.tax,
            total: stored.total,
            line_count: lines.len(),
            status: PurchaseStatus::Pendiente,
        })
    }

    /// Receive a pending purchase: increment stock and log one `in`
    /// movement per line, then mark the header `recibida`
    pub async fn receive_purchase(
        &self,
        purchase_id: Uuid,
        user_id: Uuid,
        input: ReceivePurchaseInput,
    ) -> AppResult<Purchase> {
        let purchase = self.fetch_purchase(purchase_id).await?;

        if purchase.status != PurchaseStatus::Pendiente {
            return Err(AppError::InvalidState {
                entity: "Purchase".to_string(),
                current_state: purchase.status.as_str().to_string(),
                operation: "receive purchase".to_string(),
            });
        }

        let received_date = input.received_date.unwrap_or_else(|| Utc::now().date_naive());

        let lines = sqlx::query_as::<_, (Uuid, i32)>(
            "SELECT product_id, quantity FROM purchase_lines WHERE purchase_id = $1 ORDER BY id",
        )
        .bind(purchase_id)
        .fetch_all(&self.db)
        .await?;

        let movement_note = format!("Receipt of purchase {}", purchase.number);

        let mut tx = self.db.begin().await?;

        for (product_id, quantity) in &lines {
            let (stock_before, stock_after) = adjust_stock(&mut tx, *product_id, *quantity)
                .await?
                .ok_or_else(|| {
                    AppError::Internal(format!("stock update failed for product {}", product_id))
                })?;

            record_movement(
                &mut tx,
                NewMovement {
                    product_id: *product_id,
                    direction: MovementDirection::In,
                    quantity: *quantity,
                    cause: MovementCause::Purchase,
                    reason: None,
                    reference_id: Some(purchase_id),
                    stock_before,
                    stock_after,
                    user_id,
                    notes: Some(&movement_note),
                },
            )
            .await?;
        }

        sqlx::query("UPDATE purchases SET status = $1, received_date = $2 WHERE id = $3")
            .bind(PurchaseStatus::Recibida.as_str())
            .bind(received_date)
            .bind(purchase_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Purchase received: {}, {} products updated",
            purchase.number,
            lines.len()
        );

        Ok(Purchase {
            status: PurchaseStatus::Recibida,
            received_date: Some(received_date),
            ..purchase
        })
    }

    /// Cancel a pending purchase; no stock was applied, none is reverted
    pub async fn cancel_purchase(&self, purchase_id: Uuid) -> AppResult<Purchase> {
        let purchase = self.fetch_purchase(purchase_id).await?;

        if purchase.status != PurchaseStatus::Pendiente {
            return Err(AppError::InvalidState {
                entity: "Purchase".to_string(),
                current_state: purchase.status.as_str().to_string(),
                operation: "cancel purchase".to_string(),
            });
        }

        sqlx::query("UPDATE purchases SET status = $1 WHERE id = $2")
            .bind(PurchaseStatus::Cancelada.as_str())
            .bind(purchase_id)
            .execute(&self.db)
            .await?;

        tracing::info!("Purchase cancelled: {}", purchase.number);

        Ok(Purchase {
            status: PurchaseStatus::Cancelada,
            ..purchase
        })
    }

    /// Get a purchase with its lines
    pub async fn get_purchase(&self, purchase_id: Uuid) -> AppResult<PurchaseWithLines> {
        let purchase = self.fetch_purchase(purchase_id).await?;

        let lines = sqlx::query_as::<_, PurchaseLineDetail>(
            r#"
            SELECT pl.id, pl.product_id, p.code AS product_code, p.name AS product_name,
                   p.unit, pl.quantity, pl.unit_price, pl.subtotal
            FROM purchase_lines pl
            INNER JOIN products p ON p.id = pl.product_id
            WHERE pl.purchase_id = $1
            ORDER BY pl.id
            "#,
        )
        .bind(purchase_id)
        .fetch_all(&self.db)
        .await?;

        Ok(PurchaseWithLines { purchase, lines })
    }

    /// List purchases, optionally filtered by state
    pub async fn list_purchases(
        &self,
        status: Option<PurchaseStatus>,
    ) -> AppResult<Vec<PurchaseListRow>> {
        let base = r#"
            SELECT pu.id, pu.number, s.business_name AS supplier_name,
                   u.full_name AS registered_by,
                   pu.purchase_date, pu.status, pu.subtotal, pu.tax, pu.total, pu.received_date
            FROM purchases pu
            INNER JOIN suppliers s ON s.id = pu.supplier_id
            INNER JOIN users u ON u.id = pu.user_id
            "#;

        let purchases = match status {
            Some(status) => {
                sqlx::query_as::<_, PurchaseListRow>(&format!(
                    "{} WHERE pu.status = $1 ORDER BY pu.purchase_date DESC, pu.created_at DESC",
                    base
                ))
                .bind(status.as_str())
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, PurchaseListRow>(&format!(
                    "{} ORDER BY pu.purchase_date DESC, pu.created_at DESC",
                    base
                ))
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(purchases)
    }

    /// Purchase statistics over a period; spend counts received purchases only
    pub async fn period_statistics(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<PurchasePeriodStats> {
        let (total, received, pending, cancelled, total_spent, average) =
            sqlx::query_as::<_, (i64, i64, i64, i64, Decimal, Decimal)>(
                r#"
                SELECT COUNT(*),
                       COUNT(*) FILTER (WHERE status = 'recibida'),
                       COUNT(*) FILTER (WHERE status = 'pendiente'),
                       COUNT(*) FILTER (WHERE status = 'cancelada'),
                       COALESCE(SUM(total) FILTER (WHERE status = 'recibida'), 0),
                       COALESCE(AVG(total) FILTER (WHERE status = 'recibida'), 0)
                FROM purchases
                WHERE purchase_date BETWEEN $1 AND $2
                "#,
            )
            .bind(start_date)
            .bind(end_date)
            .fetch_one(&self.db)
            .await?;

        Ok(PurchasePeriodStats {
            start_date,
            end_date,
            total_purchases: total,
            received,
            pending,
            cancelled,
            total_spent,
            average_per_purchase: average.round_dp(2),
        })
    }

    async fn fetch_purchase(&self, purchase_id: Uuid) -> AppResult<Purchase> {
        let row = sqlx::query_as::<_, PurchaseRow>(
            r#"
            SELECT id, number, supplier_id, user_id, purchase_date, status,
                   subtotal, tax, total, received_date, notes, created_at
            FROM purchases
            WHERE id = $1
            "#,
        )
        .bind(purchase_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound {
            entity: "Purchase".to_string(),
            id: purchase_id.to_string(),
        })?;

        purchase_from_row(row)
    }
}
