//! Reporting service for dashboard metrics and inventory analytics

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::models::InventoryValuation;

use crate::error::AppResult;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Dashboard metrics shown on the home screen
#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub total_products: i64,
    pub low_stock_products: i64,
    pub sales_today: i64,
    pub revenue_today: Decimal,
    pub pending_purchases: i64,
    pub movements_today: i64,
}

/// Product rotation over a period
#[derive(Debug, Serialize)]
pub struct ProductRotation {
    pub product_id: Uuid,
    pub code: String,
    pub name: String,
    pub current_stock: i32,
    pub quantity_sold: i64,
    pub sales_count: i64,
    pub rotation_rate: Decimal,
    pub days_of_inventory: Decimal,
}

/// Row for the rotation query
#[derive(Debug, FromRow)]
struct RotationRow {
    product_id: Uuid,
    code: String,
    name: String,
    current_stock: i32,
    quantity_sold: i64,
    sales_count: i64,
}

impl ReportingService {
    /// Create a new ReportingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Dashboard metrics: catalog size, low stock, today's activity
    pub async fn dashboard_metrics(&self) -> AppResult<DashboardMetrics> {
        let total_products = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE is_active = TRUE",
        )
        .fetch_one(&self.db)
        .await?;

        let low_stock_products = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE is_active = TRUE AND current_stock <= minimum_stock",
        )
        .fetch_one(&self.db)
        .await?;

        let (sales_today, revenue_today) = sqlx::query_as::<_, (i64, Decimal)>(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total), 0)
            FROM sales
            WHERE sale_date = CURRENT_DATE AND status = 'completada'
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let pending_purchases = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM purchases WHERE status = 'pendiente'",
        )
        .fetch_one(&self.db)
        .await?;

        let movements_today = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM inventory_movements WHERE created_at::date = CURRENT_DATE",
        )
        .fetch_one(&self.db)
        .await?;

        Ok(DashboardMetrics {
            total_products,
            low_stock_products,
            sales_today,
            revenue_today,
            pending_purchases,
            movements_today,
        })
    }

    /// Valuation of the active catalog at purchase and sale prices
    pub async fn inventory_valuation(&self) -> AppResult<InventoryValuation> {
        let (total_products, total_units, purchase_value, sale_value) =
            sqlx::query_as::<_, (i64, i64, Decimal, Decimal)>(
                r#"
                SELECT COUNT(*),
                       COALESCE(SUM(current_stock), 0)::BIGINT,
                       COALESCE(SUM(current_stock * purchase_price), 0),
                       COALESCE(SUM(current_stock * sale_price), 0)
                FROM products
                WHERE is_active = TRUE
                "#,
            )
            .fetch_one(&self.db)
            .await?;

        Ok(InventoryValuation {
            total_products,
            total_units,
            purchase_value: purchase_value.round_dp(2),
            sale_value: sale_value.round_dp(2),
            potential_margin: (sale_value - purchase_value).round_dp(2),
        })
    }

    /// Product rotation over the last `days` days, fastest movers first
    ///
    /// Rotation rate is units sold over current stock; days of inventory is
    /// the period divided by that rate.
    pub async fn product_rotation(&self, days: i32) -> AppResult<Vec<ProductRotation>> {
        let rows = sqlx::query_as::<_, RotationRow>(
            r#"
            SELECT p.id AS product_id, p.code, p.name, p.current_stock,
                   COALESCE(SUM(m.quantity), 0)::BIGINT AS quantity_sold,
                   COUNT(m.id) AS sales_count
            FROM inventory_movements m
            INNER JOIN products p ON p.id = m.product_id
            WHERE m.direction = 'out'
              AND m.created_at >= NOW() - make_interval(days => $1)
            GROUP BY p.id, p.code, p.name, p.current_stock
            "#,
        )
        .bind(days)
        .fetch_all(&self.db)
        .await?;

        let mut rotation: Vec<ProductRotation> = rows
            .into_iter()
            .map(|r| {
                let rate = if r.current_stock > 0 {
                    Decimal::from(r.quantity_sold) / Decimal::from(r.current_stock)
                } else {
                    Decimal::ZERO
                };
                let days_of_inventory = if rate > Decimal::ZERO {
                    (Decimal::from(days) / rate).round_dp(2)
                } else {
                    Decimal::ZERO
                };

                ProductRotation {
                    product_id: r.product_id,
                    code: r.code,
                    name: r.name,
                    current_stock: r.current_stock,
                    quantity_sold: r.quantity_sold,
                    sales_count: r.sales_count,
                    rotation_rate: rate.round_dp(2),
                    days_of_inventory,
                }
            })
            .collect();

        rotation.sort_by(|a, b| b.rotation_rate.cmp(&a.rotation_rate));

        Ok(rotation)
    }
}
