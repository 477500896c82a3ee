//! Sale workflows: registration, annulment, and sales queries
//!
//! Registration validates the customer, the lines, and stock availability,
//! computes totals with exact decimal arithmetic, then persists header, lines,
//! stock decrements, and movement records as one transaction. Annulment is the
//! compensating operation: it returns stock and flips the header state.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::draft::{order_totals, DraftLine};
use shared::models::{Sale, SaleSummary};
use shared::numbering::{next_order_number, SALE_SEQUENCE_WIDTH};
use shared::types::{DocumentType, MovementCause, MovementDirection, PaymentMethod, SaleStatus};
use shared::validation::validate_order_lines;

use crate::error::{AppError, AppResult};
use crate::services::inventory::{adjust_stock, record_movement, NewMovement};

/// Sale service for the register and annulment workflows
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
}

/// One line of a sale submission
#[derive(Debug, Deserialize)]
pub struct SaleLineInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    #[serde(default)]
    pub discount: Decimal,
}

/// Input for registering a sale
#[derive(Debug, Deserialize)]
pub struct RegisterSaleInput {
    pub customer_id: Uuid,
    pub lines: Vec<SaleLineInput>,
    pub document_type: DocumentType,
    pub payment_method: PaymentMethod,
    pub sale_date: Option<NaiveDate>,
    #[serde(default)]
    pub global_discount: Decimal,
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,
    pub notes: Option<String>,
}

/// IGV default rate
fn default_tax_rate() -> Decimal {
    Decimal::new(18, 2)
}

/// Sale row with customer and seller display fields
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SaleListRow {
    pub id: Uuid,
    pub number: String,
    pub document_number: String,
    pub customer_name: String,
    pub seller_name: String,
    pub sale_date: NaiveDate,
    pub document_type: String,
    pub status: String,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub payment_method: String,
}

/// Sale line with product display fields
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SaleLineDetail {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_code: String,
    pub product_name: String,
    pub unit: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub subtotal: Decimal,
}

/// A sale with all its lines
#[derive(Debug, Clone, Serialize)]
pub struct SaleWithLines {
    #[serde(flatten)]
    pub sale: Sale,
    pub lines: Vec<SaleLineDetail>,
}

/// Sales statistics over a period (completed sales only)
#[derive(Debug, Clone, Serialize)]
pub struct SalesPeriodStats {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_sales: i64,
    pub total_revenue: Decimal,
    pub total_discounts: Decimal,
    pub average_ticket: Decimal,
    pub min_ticket: Decimal,
    pub max_ticket: Decimal,
    pub by_payment_method: Vec<PaymentMethodBreakdown>,
}

/// Per-payment-method slice of the period statistics
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PaymentMethodBreakdown {
    pub payment_method: String,
    pub count: i64,
    pub amount: Decimal,
}

/// Full sale row as stored
type SaleRow = (
    Uuid,
    String,
    Uuid,
    Uuid,
    NaiveDate,
    String,
    String,
    Decimal,
    Decimal,
    Decimal,
    Decimal,
    String,
    Option<String>,
    DateTime<Utc>,
);

fn sale_from_row(row: SaleRow) -> AppResult<Sale> {
    Ok(Sale {
        id: row.0,
        number: row.1,
        customer_id: row.2,
        user_id: row.3,
        sale_date: row.4,
        document_type: parse_stored(&row.5, DocumentType::from_str, "document_type")?,
        status: parse_stored(&row.6, SaleStatus::from_str, "sale status")?,
        subtotal: row.7,
        discount: row.8,
        tax: row.9,
        total: row.10,
        payment_method: parse_stored(&row.11, PaymentMethod::from_str, "payment_method")?,
        notes: row.12,
        created_at: row.13,
    })
}

/// Parse a stored enum value; writes only go through the typed enums, so a
/// miss means the row was tampered with outside the application
fn parse_stored<T>(value: &str, parse: fn(&str) -> Option<T>, what: &str) -> AppResult<T> {
    parse(value).ok_or_else(|| AppError::Internal(format!("unexpected {} '{}' in database", what, value)))
}

/// Generate the next sale number for a document type within a year
///
/// Scans the highest number already issued for the prefix+year and
/// increments; the first sale of a year gets sequence 0001.
async fn next_sale_number(
    tx: &mut Transaction<'_, Postgres>,
    document_type: DocumentType,
    year: i32,
) -> AppResult<String> {
    // Longest number first, then lexicographic: plain string ordering would
    // rank BOL-2024-9999 above BOL-2024-10000 once the pad width overflows
    let prefix = document_type.number_prefix();
    let last = sqlx::query_scalar::<_, String>(
        "SELECT number FROM sales WHERE number LIKE $1 ORDER BY LENGTH(number) DESC, number DESC LIMIT 1",
    )
    .bind(format!("{}-{}-%", prefix, year))
    .fetch_optional(&mut **tx)
    .await?;

    Ok(next_order_number(prefix, year, SALE_SEQUENCE_WIDTH, last.as_deref()))
}

impl SaleService {
    /// Create a new SaleService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Register a sale, decrementing stock and logging one `out` movement
    /// per line, all inside a single transaction
    pub async fn register_sale(
        &self,
        user_id: Uuid,
        input: RegisterSaleInput,
    ) -> AppResult<SaleSummary> {
        // Validate customer
        let customer = sqlx::query_as::<_, (String, Option<String>)>(
            "SELECT first_name, last_name FROM customers WHERE id = $1",
        )
        .bind(input.customer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound {
            entity: "Customer".to_string(),
            id: input.customer_id.to_string(),
        })?;

        let customer_name = match &customer.1 {
            Some(last) => format!("{} {}", customer.0, last),
            None => customer.0.clone(),
        };

        if input.global_discount < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "global_discount".to_string(),
                message: "Global discount cannot be negative".to_string(),
                message_es: "El descuento global no puede ser negativo".to_string(),
            });
        }

        if input.tax_rate < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "tax_rate".to_string(),
                message: "Tax rate cannot be negative".to_string(),
                message_es: "El impuesto no puede ser negativo".to_string(),
            });
        }

        // Validate lines
        let lines: Vec<DraftLine> = input
            .lines
            .iter()
            .map(|l| DraftLine {
                product_id: l.product_id,
                quantity: l.quantity,
                unit_price: l.unit_price,
                discount: l.discount,
            })
            .collect();

        validate_order_lines(&lines).map_err(|e| AppError::Validation {
            field: "lines".to_string(),
            message: e.to_string(),
            message_es: format!("Detalle de venta inválido: {}", e),
        })?;

        // Validate products and stock availability; keep names for errors
        let mut product_names = Vec::with_capacity(lines.len());
        for line in &lines {
            let (name, available) = sqlx::query_as::<_, (String, i32)>(
                "SELECT name, current_stock FROM products WHERE id = $1",
            )
            .bind(line.product_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound {
                entity: "Product".to_string(),
                id: line.product_id.to_string(),
            })?;

            if available < line.quantity {
                return Err(AppError::InsufficientStock {
                    product: name,
                    available,
                    requested: line.quantity,
                });
            }

            product_names.push(name);
        }

        // Totals stay exact until stored
        let totals = order_totals(&lines, input.global_discount, input.tax_rate);
        if totals.subtotal - totals.discount < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "global_discount".to_string(),
                message: "Global discount cannot exceed the subtotal".to_string(),
                message_es: "El descuento global no puede superar el subtotal".to_string(),
            });
        }
        let stored = totals.rounded();

        let sale_date = input.sale_date.unwrap_or_else(|| Utc::now().date_naive());

        // Header + lines + stock + movements, all or nothing
        let mut tx = self.db.begin().await?;

        let number = next_sale_number(&mut tx, input.document_type, sale_date.year()).await?;

        let sale_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO sales
                (number, customer_id, user_id, sale_date, document_type, status,
                 subtotal, discount, tax, total, payment_method, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
        )
        .bind(&number)
        .bind(input.customer_id)
        .bind(user_id)
        .bind(sale_date)
        .bind(input.document_type.as_str())
        .bind(SaleStatus::Completada.as_str())
        .bind(stored.subtotal)
        .bind(stored.discount)
        .bind(stored.tax)
        .bind(stored.total)
        .bind(input.payment_method.as_str())
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        let movement_note = format!("Sale {}", number);

        for (line, name) in lines.iter().zip(&product_names) {
            sqlx::query(
                r#"
                INSERT INTO sale_lines (sale_id, product_id, quantity, unit_price, discount, subtotal)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(sale_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.discount)
            .bind(line.subtotal().round_dp(2))
            .execute(&mut *tx)
            .await?;

            // Conditional decrement: zero rows affected means a concurrent
            // sale consumed the stock after our availability check
            let snapshots = adjust_stock(&mut tx, line.product_id, -line.quantity).await?;
            let (stock_before, stock_after) = match snapshots {
                Some(s) => s,
                None => {
                    let available = sqlx::query_scalar::<_, i32>(
                        "SELECT current_stock FROM products WHERE id = $1",
                    )
                    .bind(line.product_id)
                    .fetch_one(&mut *tx)
                    .await?;

                    return Err(AppError::InsufficientStock {
                        product: name.clone(),
                        available,
                        requested: line.quantity,
                    });
                }
            };

            record_movement(
                &mut tx,
                NewMovement {
                    product_id: line.product_id,
                    direction: MovementDirection::Out,
                    quantity: line.quantity,
                    cause: MovementCause::Sale,
                    reason: None,
                    reference_id: Some(sale_id),
                    stock_before,
                    stock_after,
                    user_id,
                    notes: Some(&movement_note),
                },
            )
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            "Sale registered: {}, customer: {}, total: {}",
            number,
            customer_name,
            stored.total
        );

        Ok(SaleSummary {
            sale_id,
            number,
            customer: customer_name,
            sale_date,
            document_type: input.document_type,
            subtotal: stored.subtotal,
            discount: stored.discount,
            tax: stored.tax,
            total: stored.total,
            payment_method: input.payment_method,
            line_count: lines.len(),
            status: SaleStatus::Completada,
        })
    }

    /// Annul a sale, returning stock with one `in` movement per line
    ///
    /// One-way transition: an annulled sale stays annulled.
    pub async fn annul_sale(&self, sale_id: Uuid, user_id: Uuid) -> AppResult<Sale> {
        let sale = self.fetch_sale(sale_id).await?;

        if sale.status == SaleStatus::Anulada {
            return Err(AppError::InvalidState {
                entity: "Sale".to_string(),
                current_state: sale.status.as_str().to_string(),
                operation: "annul sale".to_string(),
            });
        }

        let lines = sqlx::query_as::<_, (Uuid, i32)>(
            "SELECT product_id, quantity FROM sale_lines WHERE sale_id = $1 ORDER BY id",
        )
        .bind(sale_id)
        .fetch_all(&self.db)
        .await?;

        let movement_note = format!("Annulment of sale {}", sale.number);

        let mut tx = self.db.begin().await?;

        for (product_id, quantity) in &lines {
            let (stock_before, stock_after) = adjust_stock(&mut tx, *product_id, *quantity)
                .await?
                .ok_or_else(|| {
                    AppError::Internal(format!("stock restore failed for product {}", product_id))
                })?;

            record_movement(
                &mut tx,
                NewMovement {
                    product_id: *product_id,
                    direction: MovementDirection::In,
                    quantity: *quantity,
                    cause: MovementCause::Annulment,
                    reason: None,
                    reference_id: Some(sale_id),
                    stock_before,
                    stock_after,
                    user_id,
                    notes: Some(&movement_note),
                },
            )
            .await?;
        }

        sqlx::query("UPDATE sales SET status = $1 WHERE id = $2")
            .bind(SaleStatus::Anulada.as_str())
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Sale annulled: {}, stock returned for {} lines",
            sale.number,
            lines.len()
        );

        Ok(Sale {
            status: SaleStatus::Anulada,
            ..sale
        })
    }

    /// Get a sale with its lines
    pub async fn get_sale(&self, sale_id: Uuid) -> AppResult<SaleWithLines> {
        let sale = self.fetch_sale(sale_id).await?;

        let lines = sqlx::query_as::<_, SaleLineDetail>(
            r#"
            SELECT sl.id, sl.product_id, p.code AS product_code, p.name AS product_name,
                   p.unit, sl.quantity, sl.unit_price, sl.discount, sl.subtotal
            FROM sale_lines sl
            INNER JOIN products p ON p.id = sl.product_id
            WHERE sl.sale_id = $1
            ORDER BY sl.id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.db)
        .await?;

        Ok(SaleWithLines { sale, lines })
    }

    /// List sales, optionally filtered by state
    pub async fn list_sales(&self, status: Option<SaleStatus>) -> AppResult<Vec<SaleListRow>> {
        let base = r#"
            SELECT s.id, s.number, c.document_number,
                   TRIM(CONCAT(c.first_name, ' ', COALESCE(c.last_name, ''))) AS customer_name,
                   u.full_name AS seller_name,
                   s.sale_date, s.document_type, s.status,
                   s.subtotal, s.discount, s.tax, s.total, s.payment_method
            FROM sales s
            INNER JOIN customers c ON c.id = s.customer_id
            INNER JOIN users u ON u.id = s.user_id
            "#;

        let sales = match status {
            Some(status) => {
                sqlx::query_as::<_, SaleListRow>(&format!(
                    "{} WHERE s.status = $1 ORDER BY s.sale_date DESC, s.created_at DESC",
                    base
                ))
                .bind(status.as_str())
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, SaleListRow>(&format!(
                    "{} ORDER BY s.sale_date DESC, s.created_at DESC",
                    base
                ))
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(sales)
    }

    /// Completed sales of a single day (today if unspecified)
    pub async fn sales_of_day(&self, date: Option<NaiveDate>) -> AppResult<Vec<SaleListRow>> {
        let date = date.unwrap_or_else(|| Utc::now().date_naive());

        let sales = sqlx::query_as::<_, SaleListRow>(
            r#"
            SELECT s.id, s.number, c.document_number,
                   TRIM(CONCAT(c.first_name, ' ', COALESCE(c.last_name, ''))) AS customer_name,
                   u.full_name AS seller_name,
                   s.sale_date, s.document_type, s.status,
                   s.subtotal, s.discount, s.tax, s.total, s.payment_method
            FROM sales s
            INNER JOIN customers c ON c.id = s.customer_id
            INNER JOIN users u ON u.id = s.user_id
            WHERE s.sale_date = $1 AND s.status = 'completada'
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(date)
        .fetch_all(&self.db)
        .await?;

        Ok(sales)
    }

    /// Sales statistics over a period, completed sales only
    pub async fn period_statistics(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<SalesPeriodStats> {
        let (total_sales, total_revenue, total_discounts, average, min, max) =
            sqlx::query_as::<_, (i64, Decimal, Decimal, Decimal, Decimal, Decimal)>(
                r#"
                SELECT COUNT(*),
                       COALESCE(SUM(total), 0),
                       COALESCE(SUM(discount), 0),
                       COALESCE(AVG(total), 0),
                       COALESCE(MIN(total), 0),
                       COALESCE(MAX(total), 0)
                FROM sales
                WHERE sale_date BETWEEN $1 AND $2 AND status = 'completada'
                "#,
            )
            .bind(start_date)
            .bind(end_date)
            .fetch_one(&self.db)
            .await?;

        let by_payment_method = sqlx::query_as::<_, PaymentMethodBreakdown>(
            r#"
            SELECT payment_method, COUNT(*) AS count, COALESCE(SUM(total), 0) AS amount
            FROM sales
            WHERE sale_date BETWEEN $1 AND $2 AND status = 'completada'
            GROUP BY payment_method
            ORDER BY amount DESC
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.db)
        .await?;

        Ok(SalesPeriodStats {
            start_date,
            end_date,
            total_sales,
            total_revenue,
            total_discounts,
            average_ticket: average.round_dp(2),
            min_ticket: min,
            max_ticket: max,
            by_payment_method,
        })
    }

    async fn fetch_sale(&self, sale_id: Uuid) -> AppResult<Sale> {
        let row = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, number, customer_id, user_id, sale_date, document_type, status,
                   subtotal, discount, tax, total, payment_method, notes, created_at
            FROM sales
            WHERE id = $1
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound {
            entity: "Sale".to_string(),
            id: sale_id.to_string(),
        })?;

        sale_from_row(row)
    }
}
